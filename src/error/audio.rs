// Audio input error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Audio error code constants
///
/// Error code range: 1001-1003
pub struct AudioErrorCodes {}

impl AudioErrorCodes {
    /// Audio file could not be opened or decoded
    pub const READ_FAILED: i32 = 1001;

    /// Sample format is not supported
    pub const UNSUPPORTED_FORMAT: i32 = 1002;

    /// Audio file contains no samples
    pub const EMPTY_CLIP: i32 = 1003;
}

/// Log an audio error with structured context
pub fn log_audio_error(err: &AudioError, context: &str) {
    error!(
        "Audio error in {}: code={}, component=AudioInput, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while loading audio for offline analysis
#[derive(Debug, Clone, PartialEq)]
pub enum AudioError {
    /// File could not be opened or a sample could not be decoded
    ReadFailed { path: String, reason: String },

    /// Bit depth or sample format has no decoder
    UnsupportedFormat { reason: String },

    /// File decoded but held no samples
    EmptyClip { path: String },
}

impl ErrorCode for AudioError {
    fn code(&self) -> i32 {
        match self {
            AudioError::ReadFailed { .. } => AudioErrorCodes::READ_FAILED,
            AudioError::UnsupportedFormat { .. } => AudioErrorCodes::UNSUPPORTED_FORMAT,
            AudioError::EmptyClip { .. } => AudioErrorCodes::EMPTY_CLIP,
        }
    }

    fn message(&self) -> String {
        match self {
            AudioError::ReadFailed { path, reason } => {
                format!("Failed to read {}: {}", path, reason)
            }
            AudioError::UnsupportedFormat { reason } => {
                format!("Unsupported audio format: {}", reason)
            }
            AudioError::EmptyClip { path } => format!("{} contains no samples", path),
        }
    }
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AudioError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for AudioError {}
