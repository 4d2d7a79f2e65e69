//! Lamina Effects - the engine suite.
//!
//! Five engines built on lamina-core:
//!
//! - [`PlateReverb`] - decimating plate with a 25-line Householder tank
//! - [`TubeAmp`] - tube-voiced amp model
//! - [`CabinetSim`] - speaker cabinet filter bank
//! - [`ThreeBandEq`] - fixed-center three-band EQ
//! - [`ConsoleBus`] - sine-law console-color bus
//!
//! ## Example
//!
//! ```rust,ignore
//! use lamina_core::{Effect, EffectExt};
//! use lamina_effects::{TubeAmp, CabinetSim};
//!
//! // An amp-into-cab rig as one chained effect.
//! let mut rig = TubeAmp::new(48000.0).chain(CabinetSim::new(48000.0));
//! rig.process_stereo_block(&mut left, &mut right);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod amp;
pub mod cab;
pub mod console;
pub mod eq;
pub mod plate;

pub use amp::TubeAmp;
pub use cab::CabinetSim;
pub use console::ConsoleBus;
pub use eq::ThreeBandEq;
pub use plate::PlateReverb;
