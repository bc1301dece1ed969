// Framer module - block/step windowing
//
// Frame k covers samples [k × step, k × step + block). Frames are produced
// while the start lies inside the signal; samples past the end read as zero.

use std::time::Duration;

use crate::error::PluginError;

/// One analysis frame cut from a signal
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Frame number, starting at 0
    pub index: usize,
    /// Offset of the first sample in the source signal
    pub start: usize,
    /// `block_size` samples, zero-padded at the end of the signal
    pub samples: Vec<f32>,
}

impl Frame {
    /// Time of the first sample of this frame
    pub fn timestamp(&self, sample_rate: f32) -> Duration {
        sample_offset_to_duration(self.start, sample_rate)
    }
}

/// Convert a sample offset to elapsed time
pub fn sample_offset_to_duration(offset: usize, sample_rate: f32) -> Duration {
    Duration::from_secs_f64(offset as f64 / sample_rate as f64)
}

/// Splits a mono signal into overlapping blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framer {
    block_size: usize,
    step_size: usize,
}

impl Framer {
    /// # Errors
    /// `PluginError::Configuration` if either size is zero
    pub fn new(block_size: usize, step_size: usize) -> Result<Self, PluginError> {
        if block_size == 0 || step_size == 0 {
            return Err(PluginError::Configuration {
                reason: format!(
                    "block and step size must be greater than 0 (got block={}, step={})",
                    block_size, step_size
                ),
            });
        }
        Ok(Self {
            block_size,
            step_size,
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn step_size(&self) -> usize {
        self.step_size
    }

    /// Number of frames a signal of `len` samples yields
    pub fn frame_count(&self, len: usize) -> usize {
        len.div_ceil(self.step_size)
    }

    /// Iterate over the frames of `signal`
    pub fn frames<'a>(&self, signal: &'a [f32]) -> impl Iterator<Item = Frame> + 'a {
        let framer = *self;
        (0..self.frame_count(signal.len())).map(move |index| framer.frame_at(signal, index))
    }

    /// Cut frame `index` from `signal`; any part past the end is zero
    pub fn frame_at(&self, signal: &[f32], index: usize) -> Frame {
        let start = index * self.step_size;
        let begin = start.min(signal.len());
        let end = (start + self.block_size).min(signal.len());

        let mut samples = Vec::with_capacity(self.block_size);
        samples.extend_from_slice(&signal[begin..end]);
        samples.resize(self.block_size, 0.0);

        Frame {
            index,
            start,
            samples,
        }
    }
}
