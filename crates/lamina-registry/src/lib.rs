//! Engine registry and factory for the lamina suite.
//!
//! A host discovers engines here without processing any audio: each entry
//! carries a stable identifying string, a category, and enough metadata to
//! enumerate controls, and a factory to instantiate the engine at a sample
//! rate. Together with [`AUDIO_PORTS`] this is the static declaration a
//! shell reads before binding anything.
//!
//! # Example
//!
//! ```rust
//! use lamina_core::Effect;
//! use lamina_registry::EngineRegistry;
//!
//! let registry = EngineRegistry::new();
//! let mut plate = registry.create("plate", 48000.0).unwrap();
//! let out = plate.process(0.25);
//! assert!(out.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

use lamina_core::{Effect, ParamDescriptor, ParameterInfo};
use lamina_effects::{CabinetSim, ConsoleBus, PlateReverb, ThreeBandEq, TubeAmp};

/// Static audio-port declaration shared by every engine in the suite.
///
/// All engines process stereo in to stereo out, f32 samples, in place,
/// with a host-supplied block size. Control ports are enumerated through
/// [`ParameterInfo`] on an instance (or [`EngineRegistry::param_info`]
/// without keeping one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortLayout {
    /// Number of audio input channels.
    pub audio_inputs: usize,
    /// Number of audio output channels.
    pub audio_outputs: usize,
}

/// The suite-wide port layout: stereo in, stereo out.
pub const AUDIO_PORTS: PortLayout = PortLayout {
    audio_inputs: 2,
    audio_outputs: 2,
};

/// Category of engine, for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineCategory {
    /// Reverbs and other time-based engines.
    TimeBased,
    /// Saturation and amp-style engines.
    Distortion,
    /// Filter-centric engines.
    Filter,
    /// Bus and utility processors.
    Utility,
}

impl EngineCategory {
    /// Human-readable category name.
    pub const fn name(&self) -> &'static str {
        match self {
            EngineCategory::TimeBased => "Time-Based",
            EngineCategory::Distortion => "Distortion",
            EngineCategory::Filter => "Filter",
            EngineCategory::Utility => "Utility",
        }
    }
}

/// Describes one engine variant in the registry.
#[derive(Debug, Clone)]
pub struct EngineDescriptor {
    /// Short stable identifier (lowercase, no spaces). Hosts key presets
    /// and automation against this; it must never change.
    pub id: &'static str,
    /// Fully qualified stable URI for hosts that namespace identifiers.
    pub uri: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Category.
    pub category: EngineCategory,
    /// Number of control ports.
    pub param_count: usize,
}

/// Factory signature: sample rate in, boxed engine out.
type EngineFactory = fn(f32) -> Box<dyn EngineWithParams + Send>;

struct RegistryEntry {
    descriptor: EngineDescriptor,
    factory: EngineFactory,
}

/// Registry of all engines in the suite.
pub struct EngineRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineRegistry {
    /// Create a registry with every built-in engine registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(5),
        };
        registry.register_builtin_engines();
        registry
    }

    fn register_builtin_engines(&mut self) {
        self.register(
            EngineDescriptor {
                id: "plate",
                uri: "urn:lamina:plate",
                name: "Plate Reverb",
                description: "Decimating plate reverb with a 25-line Householder tank",
                category: EngineCategory::TimeBased,
                param_count: 5,
            },
            |sr| Box::new(PlateReverb::new(sr)),
        );

        self.register(
            EngineDescriptor {
                id: "amp",
                uri: "urn:lamina:amp",
                name: "Tube Amp",
                description: "Tube-voiced amp model with bias-controlled asymmetry",
                category: EngineCategory::Distortion,
                param_count: 4,
            },
            |sr| Box::new(TubeAmp::new(sr)),
        );

        self.register(
            EngineDescriptor {
                id: "cab",
                uri: "urn:lamina:cab",
                name: "Cabinet Sim",
                description: "Speaker cabinet filter bank with adjustable size",
                category: EngineCategory::Filter,
                param_count: 4,
            },
            |sr| Box::new(CabinetSim::new(sr)),
        );

        self.register(
            EngineDescriptor {
                id: "eq",
                uri: "urn:lamina:eq",
                name: "Three Band EQ",
                description: "Fixed-center three-band equalizer",
                category: EngineCategory::Filter,
                param_count: 4,
            },
            |sr| Box::new(ThreeBandEq::new(sr)),
        );

        self.register(
            EngineDescriptor {
                id: "console",
                uri: "urn:lamina:console",
                name: "Console Bus",
                description: "Sine-law console-color bus processor",
                category: EngineCategory::Utility,
                param_count: 3,
            },
            |sr| Box::new(ConsoleBus::new(sr)),
        );
    }

    fn register(&mut self, descriptor: EngineDescriptor, factory: EngineFactory) {
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// Descriptors for every registered engine.
    pub fn all_engines(&self) -> Vec<&EngineDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Descriptors for engines in one category.
    pub fn engines_in_category(&self, category: EngineCategory) -> Vec<&EngineDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Descriptor lookup by stable id or URI.
    pub fn get(&self, id: &str) -> Option<&EngineDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id || e.descriptor.uri == id)
            .map(|e| &e.descriptor)
    }

    /// Instantiate an engine by stable id or URI.
    pub fn create(&self, id: &str, sample_rate: f32) -> Option<Box<dyn EngineWithParams + Send>> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id || e.descriptor.uri == id)
            .map(|e| (e.factory)(sample_rate))
    }

    /// Control-port descriptor for one engine without keeping an instance.
    ///
    /// Instantiates at a nominal rate to read the descriptor table; no
    /// audio is processed.
    pub fn param_info(&self, engine_id: &str, index: usize) -> Option<ParamDescriptor> {
        self.create(engine_id, 48_000.0)?.engine_param_info(index)
    }

    /// Find a control index by name for one engine.
    pub fn param_index_by_name(&self, engine_id: &str, param_name: &str) -> Option<usize> {
        let engine = self.create(engine_id, 48_000.0)?;
        (0..engine.engine_param_count()).find(|&i| {
            engine.engine_param_info(i).is_some_and(|d| {
                d.name.eq_ignore_ascii_case(param_name)
                    || d.short_name.eq_ignore_ascii_case(param_name)
            })
        })
    }

    /// Number of registered engines.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no engines are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Object-safe bridge exposing parameter access on a boxed engine.
///
/// `Box<dyn Effect>` cannot also be `dyn ParameterInfo`; this trait carries
/// both capabilities across one vtable.
pub trait EngineWithParams: Effect {
    /// Number of control ports.
    fn engine_param_count(&self) -> usize;

    /// Descriptor by index.
    fn engine_param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current value by index.
    fn engine_get_param(&self, index: usize) -> f32;

    /// Set a value by index.
    fn engine_set_param(&mut self, index: usize, value: f32);
}

impl<T: Effect + ParameterInfo> EngineWithParams for T {
    fn engine_param_count(&self) -> usize {
        self.param_count()
    }

    fn engine_param_info(&self, index: usize) -> Option<ParamDescriptor> {
        self.param_info(index)
    }

    fn engine_get_param(&self, index: usize) -> f32 {
        self.get_param(index)
    }

    fn engine_set_param(&mut self, index: usize, value: f32) {
        self.set_param(index, value)
    }
}
