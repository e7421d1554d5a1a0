pub mod api;
pub mod config;
pub mod config_validator;
pub mod error;
pub mod filter_spec;
pub mod log_record;
