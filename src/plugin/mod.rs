//! Host-facing plugin interface
//!
//! A host discovers plugins through a [`PluginRegistry`], queries their
//! descriptors and framing preferences, calls `initialise` once per run and
//! then feeds one block per step to `process`. Features come back keyed by
//! output index.

use rustfft::num_complex::Complex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::PluginError;

pub mod registry;
pub mod spectral_kurtosis;

pub use registry::{PluginFactory, PluginRegistry};
pub use spectral_kurtosis::SpectralKurtosisPlugin;

/// Identification metadata; no behavioural effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDescriptor {
    pub identifier: String,
    pub name: String,
    pub description: String,
    pub maker: String,
    pub plugin_version: u32,
    pub copyright: String,
}

/// Which representation of each block the plugin wants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputDomain {
    /// Raw samples
    TimeDomain,
    /// Windowed one-sided FFT, block_size / 2 + 1 bins per channel
    FrequencyDomain,
}

/// A tunable plugin parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    pub identifier: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub min_value: f32,
    pub max_value: f32,
    pub default_value: f32,
    pub quantize_step: Option<f32>,
}

/// Timing of the features on an output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleType {
    /// One feature per process call, stamped with the block time
    OneSamplePerStep,
    /// Features at a fixed rate (Hz)
    FixedSampleRate(f32),
    /// Features carry their own timestamps
    VariableSampleRate,
}

/// Shape of one plugin output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputDescriptor {
    pub identifier: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub has_fixed_bin_count: bool,
    pub bin_count: usize,
    pub has_known_extents: bool,
    pub min_value: f32,
    pub max_value: f32,
    pub sample_type: SampleType,
}

/// One value (or vector of values) produced for a block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    pub timestamp: Option<Duration>,
    pub values: Vec<f32>,
    pub label: Option<String>,
}

/// Features keyed by output index
pub type FeatureSet = BTreeMap<usize, Vec<Feature>>;

/// One block of input, per channel, in the domain the plugin asked for
#[derive(Debug, Clone, Copy)]
pub enum BlockInput<'a> {
    TimeDomain(&'a [Vec<f32>]),
    FrequencyDomain(&'a [Vec<Complex<f32>>]),
}

impl BlockInput<'_> {
    pub fn domain(&self) -> InputDomain {
        match self {
            BlockInput::TimeDomain(_) => InputDomain::TimeDomain,
            BlockInput::FrequencyDomain(_) => InputDomain::FrequencyDomain,
        }
    }

    pub fn channel_count(&self) -> usize {
        match self {
            BlockInput::TimeDomain(channels) => channels.len(),
            BlockInput::FrequencyDomain(channels) => channels.len(),
        }
    }
}

/// Operations a host needs from a feature-extraction plugin
///
/// Object safe; hosts hold `Box<dyn Plugin>`.
pub trait Plugin: Send {
    fn descriptor(&self) -> PluginDescriptor;

    fn input_domain(&self) -> InputDomain;

    /// Preferred block size in samples (0 = no preference)
    fn preferred_block_size(&self) -> usize;

    /// Preferred step size in samples (0 = same as block size)
    fn preferred_step_size(&self) -> usize;

    fn min_channel_count(&self) -> usize;

    fn max_channel_count(&self) -> usize;

    fn parameter_descriptors(&self) -> Vec<ParameterDescriptor>;

    fn get_parameter(&self, identifier: &str) -> Result<f32, PluginError>;

    fn set_parameter(&mut self, identifier: &str, value: f32) -> Result<(), PluginError>;

    fn programs(&self) -> Vec<String>;

    fn current_program(&self) -> Option<String>;

    fn select_program(&mut self, name: &str) -> Result<(), PluginError>;

    fn output_descriptors(&self) -> Vec<OutputDescriptor>;

    /// Prepare for a run; must succeed before `process`
    fn initialise(
        &mut self,
        channels: usize,
        step_size: usize,
        block_size: usize,
    ) -> Result<(), PluginError>;

    /// Drop any per-run state, keeping the configuration
    fn reset(&mut self);

    /// Process one block stamped with its start time
    fn process(
        &mut self,
        input: BlockInput<'_>,
        timestamp: Duration,
    ) -> Result<FeatureSet, PluginError>;

    /// Flush anything buffered at end of stream
    fn remaining_features(&mut self) -> FeatureSet;
}
