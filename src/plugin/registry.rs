//! Explicit plugin registry
//!
//! Built once at process start and handed to whatever drives the plugins.
//! Nothing is registered through static initialisation.

use log::debug;

use super::{Plugin, PluginDescriptor, SpectralKurtosisPlugin};
use crate::analysis::KurtosisThresholds;
use crate::error::PluginError;

/// Creates a plugin instance for an input sample rate
pub type PluginFactory = Box<dyn Fn(f32) -> Box<dyn Plugin> + Send + Sync>;

/// Sample rate used to instantiate a plugin just to read its descriptor
const PROBE_SAMPLE_RATE: f32 = 44100.0;

struct RegistryEntry {
    descriptor: PluginDescriptor,
    factory: PluginFactory,
}

/// Plugins available to a host, in registration order
#[derive(Default)]
pub struct PluginRegistry {
    entries: Vec<RegistryEntry>,
}

impl PluginRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every plugin this crate ships
    pub fn builtin(thresholds: KurtosisThresholds) -> Self {
        let mut registry = Self::new();
        let factory: PluginFactory = Box::new(move |sample_rate: f32| -> Box<dyn Plugin> {
            Box::new(SpectralKurtosisPlugin::with_thresholds(
                sample_rate,
                thresholds,
            ))
        });
        let descriptor = factory(PROBE_SAMPLE_RATE).descriptor();
        registry.insert(descriptor, factory);
        registry
    }

    /// Add a plugin factory
    ///
    /// # Errors
    /// `PluginError::Configuration` if a plugin with the same identifier is
    /// already registered
    pub fn register(&mut self, factory: PluginFactory) -> Result<(), PluginError> {
        let descriptor = factory(PROBE_SAMPLE_RATE).descriptor();
        if self.find(&descriptor.identifier).is_some() {
            return Err(PluginError::Configuration {
                reason: format!("plugin '{}' already registered", descriptor.identifier),
            });
        }
        self.insert(descriptor, factory);
        Ok(())
    }

    fn insert(&mut self, descriptor: PluginDescriptor, factory: PluginFactory) {
        debug!("[Registry] Registered plugin '{}'", descriptor.identifier);
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identifiers(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.descriptor.identifier.as_str())
            .collect()
    }

    pub fn descriptors(&self) -> Vec<PluginDescriptor> {
        self.entries
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    /// Instantiate the plugin registered under `identifier`
    pub fn create(&self, identifier: &str, sample_rate: f32) -> Option<Box<dyn Plugin>> {
        self.find(identifier).map(|entry| (entry.factory)(sample_rate))
    }

    fn find(&self, identifier: &str) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.descriptor.identifier == identifier)
    }
}
