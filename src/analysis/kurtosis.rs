// Kurtosis module - per-frame spectral kurtosis
//
// Treats a magnitude spectrum as a non-negative weighting over bin
// frequencies and computes its fourth standardized moment:
//
//   c        = Σ(f_i × m_i) / Σm_i
//   spread   = sqrt(Σ((f_i - c)² × m_i) / Σm_i)
//   kurtosis = (Σ((f_i - c)⁴ × m_i) / Σm_i) / spread⁴
//
// A Gaussian-shaped spectrum gives 3, flatter spectra less, peakier more.
// Silent frames and single-point distributions give 0. Only exact silence
// counts by default: the statistic is scale-invariant, so a quiet but
// non-empty frame keeps its shape.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description

use log::{debug, info};
use std::sync::Arc;

use super::frequency::FrequencyTable;
use crate::error::PluginError;

/// Default total-magnitude level at or below which a frame counts as silent
/// (exact zero)
pub const DEFAULT_SILENCE_THRESHOLD: f64 = 0.0;

/// Default minimum spread, as a fraction of the bin width
pub const DEFAULT_SPREAD_EPSILON: f64 = 1e-6;

/// Guards applied before dividing by energy or spread⁴
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KurtosisThresholds {
    /// Frames with Σm_i at or below this return 0
    pub silence_threshold: f64,
    /// Frames whose spread is at or below `spread_epsilon × bin_width`
    /// return 0. Scaled by the bin width so the guard does not depend on
    /// the sample rate.
    pub spread_epsilon: f64,
}

impl Default for KurtosisThresholds {
    fn default() -> Self {
        Self {
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            spread_epsilon: DEFAULT_SPREAD_EPSILON,
        }
    }
}

/// Intermediate statistics of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpectralMoments {
    /// Σm_i
    pub energy: f64,
    /// Weighted mean frequency in Hz
    pub centroid: f64,
    /// Weighted standard deviation of frequency in Hz
    pub spread: f64,
    /// Fourth standardized moment (0 for degenerate frames)
    pub kurtosis: f64,
}

/// Lifecycle state of a [`SpectralKurtosisEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// `initialize` has not succeeded yet; every compute call fails
    Unconfigured,
    /// Frequency table built; frames can be computed
    Ready,
}

/// Computes spectral kurtosis for successive magnitude spectra
///
/// The only state kept across frames is the frequency table, which depends
/// on block size and sample rate alone. An instance is not synchronised
/// internally; drive each instance from one thread at a time and share the
/// table (via [`frequency_table`](Self::frequency_table)) if needed.
#[derive(Debug, Clone)]
pub struct SpectralKurtosisEngine {
    thresholds: KurtosisThresholds,
    table: Option<Arc<FrequencyTable>>,
    step_size: usize,
}

impl Default for SpectralKurtosisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralKurtosisEngine {
    /// Create an unconfigured engine with default thresholds
    pub fn new() -> Self {
        Self::with_thresholds(KurtosisThresholds::default())
    }

    /// Create an unconfigured engine with explicit guard thresholds
    pub fn with_thresholds(thresholds: KurtosisThresholds) -> Self {
        Self {
            thresholds,
            table: None,
            step_size: 0,
        }
    }

    /// Configure the engine for a block size, step size and sample rate
    ///
    /// May be called again at any time. The frequency table is rebuilt only
    /// when the sample rate or block size changes.
    ///
    /// # Errors
    /// `PluginError::Configuration` if the sample rate is not a positive
    /// finite number, or block or step size is zero. The previous
    /// configuration is kept on failure.
    pub fn initialize(
        &mut self,
        sample_rate: f32,
        block_size: usize,
        step_size: usize,
    ) -> Result<(), PluginError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(PluginError::Configuration {
                reason: format!("sample rate must be greater than 0 (got {})", sample_rate),
            });
        }
        if block_size == 0 {
            return Err(PluginError::Configuration {
                reason: "block size must be greater than 0".to_string(),
            });
        }
        if step_size == 0 {
            return Err(PluginError::Configuration {
                reason: "step size must be greater than 0".to_string(),
            });
        }

        match &self.table {
            Some(table) if table.matches(sample_rate, block_size) => {
                debug!(
                    "[SpectralKurtosis] Reusing frequency table ({} bins)",
                    table.len()
                );
            }
            _ => {
                let table = FrequencyTable::new(sample_rate, block_size);
                debug!(
                    "[SpectralKurtosis] Built frequency table: {} bins, {:.3} Hz/bin",
                    table.len(),
                    table.bin_width()
                );
                self.table = Some(Arc::new(table));
            }
        }
        self.step_size = step_size;

        info!(
            "[SpectralKurtosis] Initialised: sample_rate={} block_size={} step_size={}",
            sample_rate, block_size, step_size
        );
        Ok(())
    }

    /// Clear per-run state. The engine keeps none, so this only logs; the
    /// configuration survives and `initialize` can still be called again.
    pub fn reset(&mut self) {
        debug!("[SpectralKurtosis] Reset (state={:?})", self.state());
    }

    pub fn state(&self) -> EngineState {
        if self.table.is_some() {
            EngineState::Ready
        } else {
            EngineState::Unconfigured
        }
    }

    pub fn thresholds(&self) -> KurtosisThresholds {
        self.thresholds
    }

    /// Read-only handle on the current frequency table
    pub fn frequency_table(&self) -> Option<Arc<FrequencyTable>> {
        self.table.clone()
    }

    /// Configured hop size, if initialised
    pub fn step_size(&self) -> Option<usize> {
        self.table.as_ref().map(|_| self.step_size)
    }

    /// Number of magnitudes `compute_frame` expects, if initialised
    pub fn bin_count(&self) -> Option<usize> {
        self.table.as_ref().map(|table| table.len())
    }

    /// Compute the kurtosis of one magnitude spectrum
    ///
    /// # Arguments
    /// * `magnitudes` - Non-negative magnitudes, one per bin of the table
    ///
    /// # Returns
    /// Kurtosis (finite, ≥ 0), or 0 for silent and single-point frames.
    /// Frames whose magnitudes are negative or not finite have no valid
    /// weighting and also give 0.
    ///
    /// # Errors
    /// * `PluginError::Configuration` before `initialize`
    /// * `PluginError::ShapeMismatch` if the length differs from the table
    pub fn compute_frame(&self, magnitudes: &[f32]) -> Result<f64, PluginError> {
        self.compute_moments(magnitudes).map(|moments| moments.kurtosis)
    }

    /// Like [`compute_frame`](Self::compute_frame) but also returns energy,
    /// centroid and spread
    pub fn compute_moments(&self, magnitudes: &[f32]) -> Result<SpectralMoments, PluginError> {
        let table = self.table.as_ref().ok_or_else(|| PluginError::Configuration {
            reason: "engine used before initialize".to_string(),
        })?;

        if magnitudes.len() != table.len() {
            return Err(PluginError::ShapeMismatch {
                expected: table.len(),
                actual: magnitudes.len(),
            });
        }

        Ok(spectral_moments(
            table.frequencies(),
            magnitudes,
            table.bin_width(),
            &self.thresholds,
        ))
    }
}

/// Weighted frequency moments of one spectrum
///
/// `frequencies` and `magnitudes` must have equal length; the engine checks
/// this before calling.
fn spectral_moments(
    frequencies: &[f64],
    magnitudes: &[f32],
    bin_width: f64,
    thresholds: &KurtosisThresholds,
) -> SpectralMoments {
    if magnitudes.iter().any(|&m| !m.is_finite() || m < 0.0) {
        debug!("[SpectralKurtosis] Frame has negative or non-finite magnitudes");
        return SpectralMoments::default();
    }

    let energy: f64 = magnitudes.iter().map(|&m| m as f64).sum();
    if energy.is_nan() || energy <= thresholds.silence_threshold {
        return SpectralMoments::default();
    }

    let weighted_sum: f64 = frequencies
        .iter()
        .zip(magnitudes)
        .map(|(&f, &m)| f * m as f64)
        .sum();
    let centroid = weighted_sum / energy;

    let (m2, m4) = frequencies
        .iter()
        .zip(magnitudes)
        .fold((0.0, 0.0), |(m2, m4), (&f, &m)| {
            let d2 = (f - centroid) * (f - centroid);
            let w = m as f64;
            (m2 + d2 * w, m4 + d2 * d2 * w)
        });
    let variance = m2 / energy;
    let spread = variance.sqrt();

    // NaN spread counts as degenerate
    if spread.is_nan() || spread <= thresholds.spread_epsilon * bin_width {
        return SpectralMoments {
            energy,
            centroid,
            spread,
            kurtosis: 0.0,
        };
    }

    let kurtosis = (m4 / energy) / (variance * variance);
    SpectralMoments {
        energy,
        centroid,
        spread,
        kurtosis: if kurtosis.is_finite() { kurtosis } else { 0.0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_engine(sample_rate: f32, block_size: usize) -> SpectralKurtosisEngine {
        let mut engine = SpectralKurtosisEngine::new();
        engine
            .initialize(sample_rate, block_size, block_size / 2)
            .unwrap();
        engine
    }

    fn assert_relative_eq(actual: f64, expected: f64, tolerance: f64) {
        let scale = expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance * scale,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_engine_starts_unconfigured() {
        let engine = SpectralKurtosisEngine::new();
        assert_eq!(engine.state(), EngineState::Unconfigured);
        assert_eq!(engine.bin_count(), None);
        assert_eq!(engine.step_size(), None);
    }

    #[test]
    fn test_compute_before_initialize_fails() {
        let engine = SpectralKurtosisEngine::new();
        match engine.compute_frame(&[0.0; 5]) {
            Err(PluginError::Configuration { .. }) => {}
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_initialize_rejects_zero_sizes() {
        let mut engine = SpectralKurtosisEngine::new();
        assert!(matches!(
            engine.initialize(44100.0, 0, 512),
            Err(PluginError::Configuration { .. })
        ));
        assert!(matches!(
            engine.initialize(44100.0, 1024, 0),
            Err(PluginError::Configuration { .. })
        ));
        assert_eq!(engine.state(), EngineState::Unconfigured);
    }

    #[test]
    fn test_initialize_rejects_invalid_sample_rate() {
        let mut engine = SpectralKurtosisEngine::new();
        for rate in [0.0, -44100.0, f32::NAN, f32::INFINITY] {
            assert!(
                engine.initialize(rate, 8, 4).is_err(),
                "sample rate {} should be rejected",
                rate
            );
        }
    }

    #[test]
    fn test_failed_reinitialize_keeps_previous_configuration() {
        let mut engine = ready_engine(44100.0, 8);
        assert!(engine.initialize(44100.0, 0, 4).is_err());
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.bin_count(), Some(5));
    }

    #[test]
    fn test_wrong_length_is_shape_mismatch() {
        let engine = ready_engine(44100.0, 8);
        assert_eq!(
            engine.compute_frame(&[1.0; 4]),
            Err(PluginError::ShapeMismatch {
                expected: 5,
                actual: 4
            })
        );
        assert_eq!(
            engine.compute_frame(&[1.0; 6]),
            Err(PluginError::ShapeMismatch {
                expected: 5,
                actual: 6
            })
        );
    }

    #[test]
    fn test_silent_frame_returns_zero() {
        let engine = ready_engine(44100.0, 8);
        assert_eq!(engine.compute_frame(&[0.0; 5]).unwrap(), 0.0);
    }

    #[test]
    fn test_single_bin_returns_zero() {
        let engine = ready_engine(44100.0, 8);
        assert_eq!(engine.compute_frame(&[1.0, 0.0, 0.0, 0.0, 0.0]).unwrap(), 0.0);
        // Centroid reconstruction may be off by an ulp for non-zero bins
        assert_eq!(engine.compute_frame(&[0.0, 0.0, 0.3, 0.0, 0.0]).unwrap(), 0.0);
        assert_eq!(engine.compute_frame(&[0.0, 0.0, 0.0, 0.0, 7.1]).unwrap(), 0.0);
    }

    #[test]
    fn test_symmetric_centered_spectrum() {
        // f = [0, 5512.5, 11025, 16537.5, 22050], centroid 11025.
        // Deviations ±5512.5 with weight 1 each, 0 with weight 4:
        //   variance = 2d²/6, m4 = 2d⁴/6, kurtosis = (d⁴/3) / (d⁴/9) = 3
        let engine = ready_engine(44100.0, 8);
        let moments = engine.compute_moments(&[0.0, 1.0, 4.0, 1.0, 0.0]).unwrap();
        assert_eq!(moments.energy, 6.0);
        assert_relative_eq(moments.centroid, 11025.0, 1e-12);
        assert_relative_eq(moments.spread, 5512.5 / 3f64.sqrt(), 1e-12);
        assert_relative_eq(moments.kurtosis, 3.0, 1e-6);
    }

    #[test]
    fn test_uniform_spectrum_is_platykurtic() {
        // 8 bins at 0..7 Hz: discrete uniform, 3(3n² - 7) / (5(n² - 1)) = 37/21
        let engine = ready_engine(14.0, 14);
        let kurtosis = engine.compute_frame(&[1.0; 8]).unwrap();
        assert_relative_eq(kurtosis, 37.0 / 21.0, 1e-9);
        assert!(kurtosis < 3.0);
    }

    #[test]
    fn test_two_spikes_are_platykurtic() {
        let engine = ready_engine(14.0, 14);
        let kurtosis = engine
            .compute_frame(&[0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
            .unwrap();
        assert_relative_eq(kurtosis, 1.0, 1e-9);
    }

    #[test]
    fn test_spike_over_background_is_leptokurtic() {
        let engine = ready_engine(14.0, 14);
        let kurtosis = engine
            .compute_frame(&[1.0, 1.0, 1.0, 10.0, 1.0, 1.0, 1.0, 1.0])
            .unwrap();
        assert_relative_eq(kurtosis, 3.724693182836155, 1e-9);
        assert!(kurtosis > 3.0);
    }

    #[test]
    fn test_gaussian_spectrum_approaches_three() {
        let engine = ready_engine(1024.0, 1024);
        let spectrum: Vec<f32> = (0..513)
            .map(|i| {
                let d = (i as f32 - 256.0) / 30.0;
                (-0.5 * d * d).exp()
            })
            .collect();
        let kurtosis = engine.compute_frame(&spectrum).unwrap();
        assert!(
            (kurtosis - 3.0).abs() < 0.1,
            "Expected kurtosis ≈ 3 for Gaussian spectrum, got {}",
            kurtosis
        );
    }

    #[test]
    fn test_silence_threshold_is_configurable() {
        let mut engine = SpectralKurtosisEngine::with_thresholds(KurtosisThresholds {
            silence_threshold: 1.0,
            spread_epsilon: DEFAULT_SPREAD_EPSILON,
        });
        engine.initialize(44100.0, 8, 8).unwrap();
        assert_eq!(
            engine.compute_frame(&[0.0, 0.1, 0.4, 0.1, 0.0]).unwrap(),
            0.0
        );

        let mut exact = SpectralKurtosisEngine::with_thresholds(KurtosisThresholds {
            silence_threshold: 0.0,
            spread_epsilon: DEFAULT_SPREAD_EPSILON,
        });
        exact.initialize(44100.0, 8, 8).unwrap();
        let tiny = exact.compute_frame(&[0.0, 1e-12, 4e-12, 1e-12, 0.0]).unwrap();
        assert_relative_eq(tiny, 3.0, 1e-4);
    }

    #[test]
    fn test_quiet_frame_keeps_its_shape() {
        let engine = ready_engine(44100.0, 8);
        let quiet = engine
            .compute_frame(&[0.0, 1e-11, 4e-11, 1e-11, 0.0])
            .unwrap();
        assert_relative_eq(quiet, 3.0, 1e-6);

        let tiny = engine
            .compute_frame(&[0.0, 1e-30, 4e-30, 1e-30, 0.0])
            .unwrap();
        assert_relative_eq(tiny, 3.0, 1e-6);
    }

    #[test]
    fn test_negative_magnitudes_return_zero() {
        let engine = ready_engine(44100.0, 8);
        assert_eq!(
            engine.compute_frame(&[0.0, -1.0, 4.0, -1.0, 0.0]).unwrap(),
            0.0
        );
        assert_eq!(
            engine.compute_frame(&[0.0, -1.0, 0.0, 0.0, 0.0]).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_non_finite_magnitudes_return_zero() {
        let engine = ready_engine(44100.0, 8);
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let kurtosis = engine.compute_frame(&[0.0, bad, 4.0, 1.0, 0.0]).unwrap();
            assert_eq!(kurtosis, 0.0, "magnitude {} should give 0", bad);
        }
    }

    #[test]
    fn test_reinitialize_reuses_matching_table() {
        let mut engine = ready_engine(48000.0, 1024);
        let before = engine.frequency_table().unwrap();

        engine.initialize(48000.0, 1024, 256).unwrap();
        let same = engine.frequency_table().unwrap();
        assert!(Arc::ptr_eq(&before, &same));
        assert_eq!(engine.step_size(), Some(256));

        engine.initialize(44100.0, 1024, 256).unwrap();
        let rebuilt = engine.frequency_table().unwrap();
        assert!(!Arc::ptr_eq(&before, &rebuilt));
        assert_eq!(rebuilt.sample_rate(), 44100.0);
    }

    #[test]
    fn test_reset_is_idempotent_and_keeps_configuration() {
        let mut engine = ready_engine(44100.0, 8);
        engine.reset();
        engine.reset();
        assert_eq!(engine.state(), EngineState::Ready);
        assert_relative_eq(
            engine.compute_frame(&[0.0, 1.0, 4.0, 1.0, 0.0]).unwrap(),
            3.0,
            1e-6,
        );

        let mut fresh = SpectralKurtosisEngine::new();
        fresh.reset();
        assert_eq!(fresh.state(), EngineState::Unconfigured);
    }

    #[test]
    fn test_result_is_finite_for_near_degenerate_spectra() {
        let engine = ready_engine(48000.0, 16);
        let mut spectrum = vec![0.0f32; 9];
        spectrum[4] = 1.0;
        spectrum[5] = 1e-30;
        let kurtosis = engine.compute_frame(&spectrum).unwrap();
        assert!(kurtosis.is_finite());
        assert!(kurtosis >= 0.0);
    }
}
