//! Core error types for LightBnB RS

use thiserror::Error;

use crate::config::ConfigError;

/// Core error type for all LightBnB operations
#[derive(Error, Debug)]
pub enum LbError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl LbError {
    pub fn error_code(&self) -> &'static str {
        match self {
            LbError::Database(_) => "database_error",
            LbError::Config(_) => "configuration_error",
        }
    }
}

/// Standard Result type for LightBnB operations
pub type LbResult<T> = Result<T, LbError>;
