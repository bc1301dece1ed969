// Configuration error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Configuration error code constants
///
/// Error code range: 4001-4002
pub struct ConfigErrorCodes {}

impl ConfigErrorCodes {
    /// Config file could not be read
    pub const READ: i32 = 4001;

    /// Config file is not valid JSON for `AppConfig`
    pub const PARSE: i32 = 4002;
}

/// Errors raised by strict configuration loading
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Read { path: String, reason: String },
    Parse { path: String, reason: String },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::Read { .. } => ConfigErrorCodes::READ,
            ConfigError::Parse { .. } => ConfigErrorCodes::PARSE,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::Read { path, reason } => {
                format!("Failed to read config file {}: {}", path, reason)
            }
            ConfigError::Parse { path, reason } => {
                format!("Failed to parse config file {}: {}", path, reason)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConfigError {}
