//! Mathematical utility functions for DSP.
//!
//! All functions operate on `f64` — engine internals run in double precision
//! and only convert to `f32` at the port boundary. Everything here is
//! allocation-free and `no_std` clean.
//!
//! # Waveshaping
//!
//! | Function | Character | Use |
//! |----------|-----------|-----|
//! | [`sine_clip`] | Bounded polynomial sine segment | Reverb conditioners, EQ protection |
//! | [`soft_clip`] | tanh, asymptotic | Amp and cab saturation |
//! | [`hard_clip`] | Abrupt | Shaper input guards |

use libm::{exp, log, tanh};

/// Input clamp for [`sine_clip`]: the positive zero-derivative point of the
/// parabolic segment, `0.45 * pi`.
pub const SINE_CLIP_LIMIT: f64 = 1.4137166941154069;

/// Twice [`SINE_CLIP_LIMIT`]; the parabola `x * (SINE_CLIP_SPAN - x) / 2`
/// peaks at the limit with value just under 1.
pub const SINE_CLIP_SPAN: f64 = 2.8274333882308138;

/// Convert decibels to linear gain (0 dB → 1.0, -6 dB → ~0.5).
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    const FACTOR: f64 = core::f64::consts::LN_10 / 20.0;
    exp(db * FACTOR)
}

/// Convert linear gain to decibels. Inputs at or below zero floor at -200 dB.
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    const FACTOR: f64 = 20.0 / core::f64::consts::LN_10;
    log(linear.max(1e-10)) * FACTOR
}

/// Soft clip using hyperbolic tangent. Output in (-1, 1).
#[inline]
pub fn soft_clip(x: f64) -> f64 {
    tanh(x)
}

/// Hard clip to the ±threshold range.
#[inline]
pub fn hard_clip(x: f64, threshold: f64) -> f64 {
    x.clamp(-threshold, threshold)
}

/// Bounded sine-segment saturator.
///
/// Clamps the input to ±[`SINE_CLIP_LIMIT`] and maps it through
/// `x * (SINE_CLIP_SPAN - x) / 2` (mirrored for negative input) — a
/// parabolic approximation of the first sine lobe. Monotonic over the
/// clamped range, small-signal slope of `SINE_CLIP_SPAN / 2` (a touch of
/// drive), output magnitude just under 1.
#[inline]
pub fn sine_clip(x: f64) -> f64 {
    let x = x.clamp(-SINE_CLIP_LIMIT, SINE_CLIP_LIMIT);
    if x >= 0.0 {
        x * (SINE_CLIP_SPAN - x) * 0.5
    } else {
        x * (SINE_CLIP_SPAN + x) * 0.5
    }
}

/// Crossfade between dry and wet signals: `dry + (wet - dry) * mix`.
#[inline]
pub fn wet_dry_mix(dry: f64, wet: f64, mix: f64) -> f64 {
    dry + (wet - dry) * mix
}

/// Flush subnormal-bound values to zero.
///
/// Feedback paths decay toward zero indefinitely; once a value drops below
/// 1e-20 it contributes nothing audible but will eventually reach the
/// subnormal range, which is slow on most hardware. Flush early.
#[inline(always)]
pub fn flush_denormal(x: f64) -> f64 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_linear_roundtrip() {
        let db = linear_to_db(0.5);
        let back = db_to_linear(db);
        assert!((back - 0.5).abs() < 1e-9, "roundtrip gave {back}");
    }

    #[test]
    fn db_known_values() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-12);
        assert!((db_to_linear(-6.0206) - 0.5).abs() < 1e-4);
        assert!((db_to_linear(6.0206) - 2.0).abs() < 1e-3);
    }

    #[test]
    fn sine_clip_bounds() {
        for i in -100..=100 {
            let x = f64::from(i) * 0.05; // -5..5
            let y = sine_clip(x);
            assert!(y.abs() < 1.0, "sine_clip({x}) = {y} out of bounds");
        }
    }

    #[test]
    fn sine_clip_origin_slope() {
        let eps = 1e-6;
        let slope = (sine_clip(eps) - sine_clip(-eps)) / (2.0 * eps);
        assert!((slope - SINE_CLIP_SPAN * 0.5).abs() < 1e-3);
    }

    #[test]
    fn sine_clip_odd_symmetry() {
        for i in 0..50 {
            let x = f64::from(i) * 0.03;
            assert!((sine_clip(x) + sine_clip(-x)).abs() < 1e-12);
        }
    }

    #[test]
    fn sine_clip_monotonic_in_range() {
        let mut prev = sine_clip(-SINE_CLIP_LIMIT);
        let steps = 200;
        for i in 1..=steps {
            let x = -SINE_CLIP_LIMIT + (2.0 * SINE_CLIP_LIMIT) * f64::from(i) / f64::from(steps);
            let y = sine_clip(x);
            assert!(y >= prev, "not monotonic at x={x}");
            prev = y;
        }
    }

    #[test]
    fn soft_clip_bounds() {
        assert!(soft_clip(5.0) < 1.0 && soft_clip(5.0) > 0.99);
        assert!(soft_clip(-5.0) > -1.0 && soft_clip(-5.0) < -0.99);
    }

    #[test]
    fn hard_clip_limits() {
        assert_eq!(hard_clip(2.0, 1.0), 1.0);
        assert_eq!(hard_clip(-2.0, 1.0), -1.0);
        assert_eq!(hard_clip(0.3, 1.0), 0.3);
    }

    #[test]
    fn wet_dry_endpoints() {
        assert_eq!(wet_dry_mix(1.0, 0.25, 0.0), 1.0);
        assert_eq!(wet_dry_mix(1.0, 0.25, 1.0), 0.25);
    }

    #[test]
    fn flush_denormal_threshold() {
        assert_eq!(flush_denormal(1e-10), 1e-10);
        assert_eq!(flush_denormal(1e-21), 0.0);
        assert_eq!(flush_denormal(-1e-21), 0.0);
        assert_eq!(flush_denormal(0.0), 0.0);
    }
}
