// Frequency module - bin index to Hz mapping
//
// A magnitude spectrum of a real block of N samples has N/2 + 1 bins, bin i
// centred on i * sample_rate / N. The table is immutable once built and only
// depends on (sample_rate, block_size).

/// Centre frequencies (Hz) for every bin of a `block_size`-point real FFT
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    sample_rate: f32,
    block_size: usize,
    frequencies: Vec<f64>,
}

impl FrequencyTable {
    /// Build the table for a block size and sample rate
    ///
    /// # Arguments
    /// * `sample_rate` - Input sample rate in Hz
    /// * `block_size` - Analysis window length in samples
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        let bin_width = sample_rate as f64 / block_size as f64;
        let frequencies = (0..=block_size / 2)
            .map(|i| i as f64 * bin_width)
            .collect();

        Self {
            sample_rate,
            block_size,
            frequencies,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of bins (block_size / 2 + 1)
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Spacing between adjacent bins in Hz
    pub fn bin_width(&self) -> f64 {
        self.sample_rate as f64 / self.block_size as f64
    }

    /// Centre frequency of bin `index`, if it exists
    pub fn frequency(&self, index: usize) -> Option<f64> {
        self.frequencies.get(index).copied()
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Whether this table was built for the given configuration
    pub fn matches(&self, sample_rate: f32, block_size: usize) -> bool {
        self.sample_rate == sample_rate && self.block_size == block_size
    }
}
