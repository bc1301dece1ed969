//! Offline host that drives a [`Plugin`] over an in-memory signal.
//!
//! For every step the host cuts one block per channel, converts it to the
//! plugin's input domain (Hann window + FFT for frequency-domain plugins),
//! calls `process` with the block's start time and collects output 0. After
//! the last block it drains `remaining_features`.

use std::time::Duration;

use log::{debug, info};
use serde::Serialize;

use crate::analysis::framer::sample_offset_to_duration;
use crate::analysis::{FftProcessor, Framer};
use crate::config::AnalysisConfig;
use crate::error::PluginError;
use crate::plugin::{BlockInput, Feature, InputDomain, Plugin};

/// One value of output 0 and the time it refers to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    /// Position in the output sequence
    pub index: usize,
    pub timestamp: Duration,
    /// First value of the feature (the kurtosis for the built-in plugin)
    pub value: f32,
}

/// Block/step framing plus sample rate for one analysis run
#[derive(Debug, Clone, Copy)]
pub struct OfflineHost {
    sample_rate: f32,
    framer: Framer,
}

impl OfflineHost {
    /// # Errors
    /// `PluginError::Configuration` for a zero block or step size, or a
    /// sample rate that is not a positive finite number
    pub fn new(sample_rate: f32, block_size: usize, step_size: usize) -> Result<Self, PluginError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(PluginError::Configuration {
                reason: format!("sample rate must be greater than 0 (got {})", sample_rate),
            });
        }
        Ok(Self {
            sample_rate,
            framer: Framer::new(block_size, step_size)?,
        })
    }

    pub fn from_config(sample_rate: f32, config: &AnalysisConfig) -> Result<Self, PluginError> {
        Self::new(sample_rate, config.block_size, config.step_size)
    }

    /// Use the plugin's own preferred framing, falling back to `fallback`
    /// where the plugin has no preference
    pub fn for_plugin(
        plugin: &dyn Plugin,
        sample_rate: f32,
        fallback: &AnalysisConfig,
    ) -> Result<Self, PluginError> {
        let block_size = match plugin.preferred_block_size() {
            0 => fallback.block_size,
            size => size,
        };
        let step_size = match plugin.preferred_step_size() {
            0 => block_size,
            size => size,
        };
        Self::new(sample_rate, block_size, step_size)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.framer.block_size()
    }

    pub fn step_size(&self) -> usize {
        self.framer.step_size()
    }

    /// Run `plugin` over `channels` (one signal per channel)
    ///
    /// # Errors
    /// Whatever `initialise` or `process` report; e.g. a multi-channel
    /// signal given to a single-channel plugin fails with
    /// `PluginError::Configuration`.
    pub fn run(
        &self,
        plugin: &mut dyn Plugin,
        channels: &[Vec<f32>],
    ) -> Result<Vec<FrameResult>, PluginError> {
        plugin.initialise(channels.len(), self.step_size(), self.block_size())?;

        let len = channels.iter().map(Vec::len).max().unwrap_or(0);
        let frame_count = self.framer.frame_count(len);
        let domain = plugin.input_domain();
        let fft = match domain {
            InputDomain::FrequencyDomain => Some(FftProcessor::new(self.block_size())),
            InputDomain::TimeDomain => None,
        };

        info!(
            "[Host] Running '{}' over {} frame(s): block={} step={} channels={}",
            plugin.descriptor().identifier,
            frame_count,
            self.block_size(),
            self.step_size(),
            channels.len()
        );

        let mut results = Vec::with_capacity(frame_count);
        for index in 0..frame_count {
            let blocks: Vec<Vec<f32>> = channels
                .iter()
                .map(|signal| self.framer.frame_at(signal, index).samples)
                .collect();
            let timestamp = sample_offset_to_duration(index * self.step_size(), self.sample_rate);

            let features = match &fft {
                Some(fft) => {
                    let spectra: Vec<_> = blocks
                        .iter()
                        .map(|block| fft.compute_spectrum(block))
                        .collect();
                    plugin.process(BlockInput::FrequencyDomain(&spectra), timestamp)?
                }
                None => plugin.process(BlockInput::TimeDomain(&blocks), timestamp)?,
            };

            if let Some(output) = features.get(&0) {
                collect(&mut results, output, timestamp);
            }
        }

        let remaining = plugin.remaining_features();
        if let Some(output) = remaining.get(&0) {
            let end = sample_offset_to_duration(len, self.sample_rate);
            collect(&mut results, output, end);
        }

        debug!("[Host] Collected {} feature(s)", results.len());
        Ok(results)
    }
}

fn collect(results: &mut Vec<FrameResult>, output: &[Feature], block_time: Duration) {
    for feature in output {
        if let Some(&value) = feature.values.first() {
            results.push(FrameResult {
                index: results.len(),
                timestamp: feature.timestamp.unwrap_or(block_time),
                value,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::plugin::{
        FeatureSet, OutputDescriptor, ParameterDescriptor, PluginDescriptor, SampleType,
        SpectralKurtosisPlugin,
    };

    /// Time-domain plugin reporting peak amplitude, plus one trailing
    /// feature at end of stream
    #[derive(Default)]
    struct PeakPlugin {
        blocks_seen: usize,
    }

    impl Plugin for PeakPlugin {
        fn descriptor(&self) -> PluginDescriptor {
            PluginDescriptor {
                identifier: "peak".to_string(),
                name: "Peak".to_string(),
                description: String::new(),
                maker: String::new(),
                plugin_version: 1,
                copyright: String::new(),
            }
        }
        fn input_domain(&self) -> InputDomain {
            InputDomain::TimeDomain
        }
        fn preferred_block_size(&self) -> usize {
            0
        }
        fn preferred_step_size(&self) -> usize {
            0
        }
        fn min_channel_count(&self) -> usize {
            1
        }
        fn max_channel_count(&self) -> usize {
            2
        }
        fn parameter_descriptors(&self) -> Vec<ParameterDescriptor> {
            Vec::new()
        }
        fn get_parameter(&self, _identifier: &str) -> Result<f32, PluginError> {
            Ok(0.0)
        }
        fn set_parameter(&mut self, _identifier: &str, _value: f32) -> Result<(), PluginError> {
            Ok(())
        }
        fn programs(&self) -> Vec<String> {
            Vec::new()
        }
        fn current_program(&self) -> Option<String> {
            None
        }
        fn select_program(&mut self, _name: &str) -> Result<(), PluginError> {
            Ok(())
        }
        fn output_descriptors(&self) -> Vec<OutputDescriptor> {
            vec![OutputDescriptor {
                identifier: "peak".to_string(),
                name: "Peak".to_string(),
                description: String::new(),
                unit: String::new(),
                has_fixed_bin_count: true,
                bin_count: 1,
                has_known_extents: true,
                min_value: 0.0,
                max_value: 1.0,
                sample_type: SampleType::OneSamplePerStep,
            }]
        }
        fn initialise(&mut self, _c: usize, _s: usize, _b: usize) -> Result<(), PluginError> {
            Ok(())
        }
        fn reset(&mut self) {
            self.blocks_seen = 0;
        }
        fn process(
            &mut self,
            input: BlockInput<'_>,
            _timestamp: Duration,
        ) -> Result<FeatureSet, PluginError> {
            self.blocks_seen += 1;
            let peak = match input {
                BlockInput::TimeDomain(channels) => channels
                    .iter()
                    .flatten()
                    .fold(0.0f32, |acc, s| acc.max(s.abs())),
                BlockInput::FrequencyDomain(_) => unreachable!("declared time domain"),
            };
            let mut set = FeatureSet::new();
            set.insert(
                0,
                vec![Feature {
                    timestamp: None,
                    values: vec![peak],
                    label: None,
                }],
            );
            Ok(set)
        }
        fn remaining_features(&mut self) -> FeatureSet {
            let mut set = FeatureSet::new();
            set.insert(
                0,
                vec![Feature {
                    timestamp: None,
                    values: vec![self.blocks_seen as f32],
                    label: Some("blocks".to_string()),
                }],
            );
            set
        }
    }

    #[test]
    fn test_zero_framing_rejected() {
        assert!(OfflineHost::new(48000.0, 0, 512).is_err());
        assert!(OfflineHost::new(48000.0, 1024, 0).is_err());
        assert!(OfflineHost::new(0.0, 1024, 512).is_err());
    }

    #[test]
    fn test_for_plugin_uses_preferences() {
        let host = OfflineHost::for_plugin(
            &SpectralKurtosisPlugin::new(48000.0),
            48000.0,
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!((host.block_size(), host.step_size()), (1024, 512));

        let fallback = AnalysisConfig {
            block_size: 256,
            step_size: 64,
        };
        let host = OfflineHost::for_plugin(&PeakPlugin::default(), 48000.0, &fallback).unwrap();
        assert_eq!((host.block_size(), host.step_size()), (256, 256));
    }

    #[test]
    fn test_time_domain_plugin_and_trailing_features() {
        let host = OfflineHost::new(4.0, 4, 4).unwrap();
        let signal = vec![vec![0.1, 0.2, 0.3, 0.4, -0.9, 0.0, 0.5, 0.0, 0.25]];
        let mut plugin = PeakPlugin::default();

        let results = host.run(&mut plugin, &signal).unwrap();

        let values: Vec<f32> = results.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![0.4, 0.9, 0.25, 3.0]);
        assert_eq!(results[1].timestamp, Duration::from_secs(1));
        // Trailing feature is stamped at end of signal
        assert_eq!(results[3].timestamp, Duration::from_secs_f64(9.0 / 4.0));
        assert_eq!(results[3].index, 3);
    }

    #[test]
    fn test_kurtosis_plugin_over_silence() {
        let host = OfflineHost::new(44100.0, 512, 256).unwrap();
        let mut plugin = SpectralKurtosisPlugin::new(44100.0);
        let results = host.run(&mut plugin, &[vec![0.0; 2048]]).unwrap();

        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.value == 0.0));
        assert_eq!(
            results[2].timestamp,
            Duration::from_secs_f64(512.0 / 44100.0)
        );
    }

    #[test]
    fn test_stereo_rejected_by_kurtosis_plugin() {
        let host = OfflineHost::new(44100.0, 512, 256).unwrap();
        let mut plugin = SpectralKurtosisPlugin::new(44100.0);
        let result = host.run(&mut plugin, &[vec![0.0; 1024], vec![0.0; 1024]]);
        assert!(matches!(result, Err(PluginError::Configuration { .. })));
    }

    #[test]
    fn test_empty_signal_yields_no_frames() {
        let host = OfflineHost::new(44100.0, 512, 256).unwrap();
        let mut plugin = SpectralKurtosisPlugin::new(44100.0);
        assert!(host.run(&mut plugin, &[Vec::new()]).unwrap().is_empty());
    }
}
