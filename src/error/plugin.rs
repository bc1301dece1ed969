// Plugin error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Plugin error code constants
///
/// Error code range: 3001-3003
pub struct PluginErrorCodes {}

impl PluginErrorCodes {
    /// Invalid or missing initialisation parameters
    pub const CONFIGURATION: i32 = 3001;

    /// Input spectrum does not match the configured frequency table
    pub const SHAPE_MISMATCH: i32 = 3002;

    /// Parameter or program does not exist
    pub const UNSUPPORTED_PARAMETER: i32 = 3003;
}

/// Log a plugin error with structured context
///
/// Logs the error code, the failing component and the message so host-side
/// failures can be traced back to the call that produced them.
pub fn log_plugin_error(err: &PluginError, context: &str) {
    error!(
        "Plugin error in {}: code={}, component=SpectralKurtosis, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors surfaced by the analysis engine and its plugin shell
///
/// All of these are reported synchronously by the offending call; none are
/// retried internally.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginError {
    /// Invalid configuration, unsupported channel count, or a compute call
    /// before initialisation
    Configuration { reason: String },

    /// Spectrum (or channel list) length differs from what was configured
    ShapeMismatch { expected: usize, actual: usize },

    /// Attempt to set a parameter or select a program that does not exist
    UnsupportedParameter { identifier: String },
}

impl ErrorCode for PluginError {
    fn code(&self) -> i32 {
        match self {
            PluginError::Configuration { .. } => PluginErrorCodes::CONFIGURATION,
            PluginError::ShapeMismatch { .. } => PluginErrorCodes::SHAPE_MISMATCH,
            PluginError::UnsupportedParameter { .. } => PluginErrorCodes::UNSUPPORTED_PARAMETER,
        }
    }

    fn message(&self) -> String {
        match self {
            PluginError::Configuration { reason } => {
                format!("Invalid configuration: {}", reason)
            }
            PluginError::ShapeMismatch { expected, actual } => {
                format!("Shape mismatch: expected {} values, got {}", expected, actual)
            }
            PluginError::UnsupportedParameter { identifier } => {
                format!("Unsupported parameter or program: {}", identifier)
            }
        }
    }
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PluginError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for PluginError {}
