// FFT module - Fast Fourier Transform computation
//
// Turns one block of time-domain samples into the N/2 + 1 complex bins a
// frequency-domain plugin expects. A Hann window is applied first to reduce
// spectral leakage.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// FFT processor for a fixed block size
pub struct FftProcessor {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    /// Hann window (pre-computed)
    window: Vec<f32>,
}

impl FftProcessor {
    /// Create a new FFT processor
    ///
    /// # Arguments
    /// * `fft_size` - Block size in samples (must be > 0)
    pub fn new(fft_size: usize) -> Self {
        let window = if fft_size > 1 {
            (0..fft_size)
                .map(|i| 0.5 * (1.0 - ((2.0 * PI * i as f32) / (fft_size as f32 - 1.0)).cos()))
                .collect()
        } else {
            vec![1.0; fft_size]
        };

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Self {
            fft,
            fft_size,
            window,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of bins returned by [`compute_spectrum`](Self::compute_spectrum)
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Compute the one-sided complex spectrum of a block
    ///
    /// # Arguments
    /// * `block` - Audio block; shorter blocks are zero-padded, longer ones
    ///   truncated to `fft_size`
    ///
    /// # Returns
    /// Complex spectrum (size = fft_size / 2 + 1)
    pub fn compute_spectrum(&self, block: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> = self
            .window
            .iter()
            .enumerate()
            .map(|(i, &w)| Complex::new(block.get(i).copied().unwrap_or(0.0) * w, 0.0))
            .collect();

        self.fft.process(&mut buffer);
        buffer.truncate(self.bin_count());
        buffer
    }

    /// Compute the magnitude spectrum of a block
    pub fn compute_magnitude_spectrum(&self, block: &[f32]) -> Vec<f32> {
        magnitudes(&self.compute_spectrum(block))
    }
}

/// Magnitude (|X[k]|) of every bin
pub fn magnitudes(spectrum: &[Complex<f32>]) -> Vec<f32> {
    spectrum.iter().map(|c| c.norm()).collect()
}
