// WAV decoding via hound
//
// Integer formats are normalised by the type's max value; float files pass
// through. Channels are de-interleaved but never mixed.

use std::path::Path;

use log::debug;

use super::AudioClip;
use crate::error::AudioError;

/// Load a WAV file into an [`AudioClip`]
///
/// # Errors
/// * `AudioError::ReadFailed` if the file can't be opened or decoded
/// * `AudioError::UnsupportedFormat` for bit depths without a decoder
/// * `AudioError::EmptyClip` if the file holds no samples
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioClip, AudioError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let read_failed = |err: hound::Error| AudioError::ReadFailed {
        path: display.clone(),
        reason: err.to_string(),
    };

    let mut reader = hound::WavReader::open(path).map_err(read_failed)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::UnsupportedFormat {
            reason: format!("{} has zero channels", display),
        });
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .map_err(read_failed)?,
        hound::SampleFormat::Int => match spec.bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|sample| sample.map(|v| v as f32 / i8::MAX as f32))
                .collect::<Result<Vec<f32>, _>>()
                .map_err(read_failed)?,
            16 => reader
                .samples::<i16>()
                .map(|sample| sample.map(|v| v as f32 / i16::MAX as f32))
                .collect::<Result<Vec<f32>, _>>()
                .map_err(read_failed)?,
            24 => reader
                .samples::<i32>()
                .map(|sample| sample.map(|v| v as f32 / 8_388_607.0))
                .collect::<Result<Vec<f32>, _>>()
                .map_err(read_failed)?,
            32 => reader
                .samples::<i32>()
                .map(|sample| sample.map(|v| v as f32 / i32::MAX as f32))
                .collect::<Result<Vec<f32>, _>>()
                .map_err(read_failed)?,
            bits => {
                return Err(AudioError::UnsupportedFormat {
                    reason: format!("bits_per_sample={} in {}", bits, display),
                })
            }
        },
    };

    if interleaved.is_empty() {
        return Err(AudioError::EmptyClip { path: display });
    }

    let channel_count = spec.channels as usize;
    let mut channels = vec![Vec::with_capacity(interleaved.len() / channel_count); channel_count];
    for (i, sample) in interleaved.into_iter().enumerate() {
        channels[i % channel_count].push(sample);
    }

    debug!(
        "[Audio] Loaded {}: {} Hz, {} channel(s), {} samples/channel",
        display,
        spec.sample_rate,
        channel_count,
        channels[0].len()
    );

    Ok(AudioClip {
        sample_rate: spec.sample_rate,
        channels,
    })
}
