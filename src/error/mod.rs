// Error types for the spectral kurtosis crate
//
// This module defines custom error types for plugin, audio input and
// configuration operations, each carrying a stable numeric code so hosts can
// react to failures without matching on message text.

mod audio;
mod config;
mod plugin;

pub use audio::{log_audio_error, AudioError, AudioErrorCodes};
pub use config::{ConfigError, ConfigErrorCodes};
pub use plugin::{log_plugin_error, PluginError, PluginErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the host boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
