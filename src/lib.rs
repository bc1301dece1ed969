// Spectral Kurtosis - per-frame spectral peakedness feature
// Frequency-domain feature extraction behind a host-facing plugin interface

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod host;
pub mod plugin;

// Re-exports for convenience
pub use analysis::{EngineState, FrequencyTable, KurtosisThresholds, SpectralKurtosisEngine};
pub use error::{ErrorCode, PluginError};
pub use host::{FrameResult, OfflineHost};
pub use plugin::{Plugin, PluginRegistry, SpectralKurtosisPlugin};
