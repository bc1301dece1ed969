// Analysis - spectral kurtosis feature extraction
//
// Module organization:
// - frequency: bin index → Hz table for a (sample rate, block size) pair
// - kurtosis: SpectralKurtosisEngine, the per-frame statistics
// - framer: block/step windowing of a signal into frames
// - fft: Hann-windowed FFT producing one-sided spectra
//
// Data flow: samples → Framer → FftProcessor → magnitudes →
// SpectralKurtosisEngine::compute_frame → kurtosis

pub mod fft;
pub mod framer;
pub mod frequency;
pub mod kurtosis;

pub use fft::{magnitudes, FftProcessor};
pub use framer::{Frame, Framer};
pub use frequency::FrequencyTable;
pub use kurtosis::{
    EngineState, KurtosisThresholds, SpectralKurtosisEngine, SpectralMoments,
    DEFAULT_SILENCE_THRESHOLD, DEFAULT_SPREAD_EPSILON,
};
