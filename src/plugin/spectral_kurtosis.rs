//! Plugin shell around [`SpectralKurtosisEngine`]
//!
//! Declares frequency-domain, single-channel input and one unit-less output
//! with a value per step. Exposes no parameters and no programs.

use std::time::Duration;

use super::{
    BlockInput, Feature, FeatureSet, InputDomain, OutputDescriptor, ParameterDescriptor, Plugin,
    PluginDescriptor, SampleType,
};
use crate::analysis::{magnitudes, KurtosisThresholds, SpectralKurtosisEngine};
use crate::error::{log_plugin_error, PluginError};

pub const IDENTIFIER: &str = "spectral-kurtosis";
pub const OUTPUT_IDENTIFIER: &str = "spectral-kurtosis";

const PREFERRED_BLOCK_SIZE: usize = 1024;
const PREFERRED_STEP_SIZE: usize = 512;

pub struct SpectralKurtosisPlugin {
    input_sample_rate: f32,
    engine: SpectralKurtosisEngine,
}

impl SpectralKurtosisPlugin {
    pub fn new(input_sample_rate: f32) -> Self {
        Self::with_thresholds(input_sample_rate, KurtosisThresholds::default())
    }

    pub fn with_thresholds(input_sample_rate: f32, thresholds: KurtosisThresholds) -> Self {
        Self {
            input_sample_rate,
            engine: SpectralKurtosisEngine::with_thresholds(thresholds),
        }
    }

    pub fn input_sample_rate(&self) -> f32 {
        self.input_sample_rate
    }

    pub fn engine(&self) -> &SpectralKurtosisEngine {
        &self.engine
    }

    fn unsupported(identifier: &str) -> Result<(), PluginError> {
        if identifier.is_empty() {
            Ok(())
        } else {
            Err(PluginError::UnsupportedParameter {
                identifier: identifier.to_string(),
            })
        }
    }
}

impl Plugin for SpectralKurtosisPlugin {
    fn descriptor(&self) -> PluginDescriptor {
        PluginDescriptor {
            identifier: IDENTIFIER.to_string(),
            name: "Spectral Kurtosis".to_string(),
            description: "Peakedness of each frame's magnitude spectrum: 3 for a Gaussian \
                          shape, lower for flatter spectra, higher for peakier ones, 0 for \
                          silent frames"
                .to_string(),
            maker: "spectral_kurtosis".to_string(),
            plugin_version: 1,
            copyright: "MIT License".to_string(),
        }
    }

    fn input_domain(&self) -> InputDomain {
        InputDomain::FrequencyDomain
    }

    fn preferred_block_size(&self) -> usize {
        PREFERRED_BLOCK_SIZE
    }

    fn preferred_step_size(&self) -> usize {
        PREFERRED_STEP_SIZE
    }

    fn min_channel_count(&self) -> usize {
        1
    }

    fn max_channel_count(&self) -> usize {
        1
    }

    fn parameter_descriptors(&self) -> Vec<ParameterDescriptor> {
        Vec::new()
    }

    fn get_parameter(&self, identifier: &str) -> Result<f32, PluginError> {
        Self::unsupported(identifier).map(|_| 0.0)
    }

    fn set_parameter(&mut self, identifier: &str, _value: f32) -> Result<(), PluginError> {
        Self::unsupported(identifier)
    }

    fn programs(&self) -> Vec<String> {
        Vec::new()
    }

    fn current_program(&self) -> Option<String> {
        None
    }

    fn select_program(&mut self, name: &str) -> Result<(), PluginError> {
        Self::unsupported(name)
    }

    fn output_descriptors(&self) -> Vec<OutputDescriptor> {
        vec![OutputDescriptor {
            identifier: OUTPUT_IDENTIFIER.to_string(),
            name: "Spectral Kurtosis".to_string(),
            description: "Fourth standardized moment of the spectral distribution".to_string(),
            unit: String::new(),
            has_fixed_bin_count: true,
            bin_count: 1,
            has_known_extents: false,
            min_value: 0.0,
            max_value: 0.0,
            sample_type: SampleType::OneSamplePerStep,
        }]
    }

    fn initialise(
        &mut self,
        channels: usize,
        step_size: usize,
        block_size: usize,
    ) -> Result<(), PluginError> {
        if channels < self.min_channel_count() || channels > self.max_channel_count() {
            let err = PluginError::Configuration {
                reason: format!(
                    "unsupported channel count {} (supported: {}..={})",
                    channels,
                    self.min_channel_count(),
                    self.max_channel_count()
                ),
            };
            log_plugin_error(&err, "initialise");
            return Err(err);
        }

        self.engine
            .initialize(self.input_sample_rate, block_size, step_size)
            .inspect_err(|err| log_plugin_error(err, "initialise"))
    }

    fn reset(&mut self) {
        self.engine.reset();
    }

    fn process(
        &mut self,
        input: BlockInput<'_>,
        timestamp: Duration,
    ) -> Result<FeatureSet, PluginError> {
        let spectra = match input {
            BlockInput::FrequencyDomain(spectra) => spectra,
            BlockInput::TimeDomain(_) => {
                return Err(PluginError::Configuration {
                    reason: "time-domain input given to a frequency-domain plugin".to_string(),
                })
            }
        };

        let spectrum = match spectra {
            [spectrum] => spectrum,
            _ => {
                return Err(PluginError::ShapeMismatch {
                    expected: 1,
                    actual: spectra.len(),
                })
            }
        };

        let kurtosis = self.engine.compute_frame(&magnitudes(spectrum))?;

        let mut features = FeatureSet::new();
        features.insert(
            0,
            vec![Feature {
                timestamp: Some(timestamp),
                values: vec![kurtosis as f32],
                label: None,
            }],
        );
        Ok(features)
    }

    fn remaining_features(&mut self) -> FeatureSet {
        FeatureSet::new()
    }
}
