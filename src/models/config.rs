use crate::models::config_validator::validate_config;
use crate::models::error::{LogViewError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_database_file")]
    pub database_file: String,
    #[serde(default = "default_slot_name")]
    pub slot_name: String,
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_stream_capacity")]
    pub stream_capacity: usize,
}

fn default_database_file() -> String {
    "logview.db".to_string()
}
fn default_slot_name() -> String {
    "logs".to_string()
}
fn default_address() -> String {
    "127.0.0.1".to_string()
}
const fn default_port() -> u16 { 8000 }
const fn default_stream_capacity() -> usize { 100 }

impl Default for Config {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            slot_name: default_slot_name(),
            address: default_address(),
            port: default_port(),
            stream_capacity: default_stream_capacity(),
        }
    }
}

pub fn setup_config(config_file: String) -> Result<Config> {
    let config_path = PathBuf::from(config_file);
    info!("Loading config from: {}", config_path.display());

    let config_str = fs::read_to_string(&config_path).map_err(|cause| {
        LogViewError::ConfigRead {
            path: config_path.clone(),
            cause,
        }
    })?;

    let config: Config = serde_json::from_str(&config_str).map_err(|cause| {
        LogViewError::ConfigParse {
            path: config_path,
            cause,
        }
    })?;

    validate_config(&config)?;

    Ok(config)
}
