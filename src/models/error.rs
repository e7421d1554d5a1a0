use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Rejected log record construction input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Log message must not be empty")]
    EmptyMessage,

    #[error("Unknown log level '{0}', expected one of: debug, info, warning, error")]
    UnknownLevel(String),
}

/// Failure of the durable history slot
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create database connection pool for '{path}': {cause}")]
    Pool { path: String, cause: r2d2::Error },

    #[error("Failed to get database connection from pool: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("Failed to write history slot '{slot}': {cause}")]
    Write { slot: String, cause: rusqlite::Error },

    #[error("Database query failed for '{operation}': {cause}")]
    Query {
        operation: String,
        cause: rusqlite::Error,
    },

    #[error("Failed to serialize history for slot '{slot}': {cause}")]
    Serialize {
        slot: String,
        cause: serde_json::Error,
    },

    #[error("Storage rejected write to slot '{0}'")]
    Rejected(String),
}

/// Inbound payload from the live connection could not be turned into a record
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Malformed inbound payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid inbound record: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Error, Debug)]
pub enum LogViewError {
    #[error("Failed to read config file '{path}': {cause}")]
    ConfigRead { path: PathBuf, cause: io::Error },

    #[error("Failed to parse config file '{path}': {cause}")]
    ConfigParse {
        path: PathBuf,
        cause: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, LogViewError>;
