//! Lamina Core - DSP primitives for the lamina engine suite.
//!
//! Foundational building blocks for real-time audio processing with zero
//! allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Engine surface
//!
//! - [`Effect`] - object-safe trait for all engines, with the in-place
//!   stereo block entry point hosts call
//! - [`EffectExt`] / [`Chain`] - zero-cost series composition
//! - [`ParameterInfo`] / [`ParamDescriptor`] - control enumeration without
//!   audio processing
//!
//! ## Reverb primitives
//!
//! - [`DelayLine`] - fixed-length f64 circular buffer with defensive cursor
//!   wrapping
//! - [`Allpass`] - the diffuser allpass (coefficient 0.5, straddled reads)
//! - [`Biquad`] - transposed direct form II with RBJ coefficient helpers
//! - [`OnePole`] / [`OnePoleHighpass`] - smoothing and rumble removal
//! - [`Xorshift32`] with [`denormal_guard`] and [`dither`] - the entropy
//!   source feeding noise floors and port dither
//!
//! # Precision
//!
//! Engine state is `f64` end to end; only the `Effect` port boundary speaks
//! `f32`. Transcendentals come from `libm`, so the crate stays `no_std`
//! compatible:
//!
//! ```toml
//! [dependencies]
//! lamina-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod allpass;
pub mod biquad;
pub mod delay;
pub mod effect;
pub mod math;
pub mod one_pole;
pub mod param_info;
pub mod rng;

pub use allpass::{Allpass, DIFFUSER_COEFF};
pub use biquad::{
    Biquad, bandpass_coefficients, highpass_coefficients, lowpass_coefficients,
    peaking_coefficients,
};
pub use delay::DelayLine;
pub use effect::{Chain, Effect, EffectExt};
pub use math::{
    db_to_linear, flush_denormal, hard_clip, linear_to_db, sine_clip, soft_clip, wet_dry_mix,
};
pub use one_pole::{OnePole, OnePoleHighpass};
pub use param_info::{
    ParamDescriptor, ParamFlags, ParamId, ParamScale, ParamUnit, ParameterInfo,
};
pub use rng::{Xorshift32, denormal_guard, dither};
