use crate::models::config::Config;
use crate::models::error::{LogViewError, Result};
use log::{info, warn};
use std::net::IpAddr;
use std::path::Path;

/// Validates the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    info!("Validating configuration...");

    validate_slot_name(&config.slot_name)?;
    validate_listener(config)?;
    validate_stream_capacity(config.stream_capacity)?;
    validate_database_path(&config.database_file)?;

    info!("Configuration validation passed");
    Ok(())
}

fn validate_slot_name(slot_name: &str) -> Result<()> {
    if slot_name.trim().is_empty() {
        return Err(LogViewError::InvalidConfig(
            "slot_name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_listener(config: &Config) -> Result<()> {
    if config.address.parse::<IpAddr>().is_err() {
        return Err(LogViewError::InvalidConfig(format!(
            "address '{}' is not a valid IP address",
            config.address
        )));
    }

    if config.port == 0 {
        return Err(LogViewError::InvalidConfig(
            "port must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_stream_capacity(capacity: usize) -> Result<()> {
    if capacity == 0 {
        return Err(LogViewError::InvalidConfig(
            "stream_capacity must be greater than 0".to_string(),
        ));
    }

    if capacity > 10_000 {
        warn!(
            "stream_capacity ({}) is very large; slow subscribers will hold that many records",
            capacity
        );
    }

    Ok(())
}

/// Validate the database file location
fn validate_database_path(db_file: &str) -> Result<()> {
    if db_file.is_empty() {
        return Err(LogViewError::InvalidConfig(
            "database_file cannot be empty. Provide a valid path or use ':memory:' for an in-memory database.".to_string(),
        ));
    }

    if db_file == ":memory:" || db_file.starts_with("file:") {
        return Ok(());
    }

    let db_path = Path::new(db_file);
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(LogViewError::InvalidConfig(format!(
                "Database directory does not exist: {}",
                parent.display()
            )));
        }
    }

    if db_path.is_dir() {
        return Err(LogViewError::InvalidConfig(format!(
            "database_file points to a directory: {}",
            db_file
        )));
    }

    Ok(())
}
