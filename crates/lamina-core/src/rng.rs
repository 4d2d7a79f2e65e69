//! Entropy source for denormal floors and output dither.
//!
//! Real-time audio cannot reach for an OS RNG: the generator here is a
//! 32-bit xorshift advanced once per channel per sample. Its two consumers
//! live alongside it:
//!
//! - [`denormal_guard`] replaces near-zero samples with a tiny noise floor so
//!   feedback networks never idle in the subnormal range.
//! - [`dither`] adds noise scaled to the sample's own floating-point
//!   exponent ahead of the f32 port truncation.

use libm::{frexpf, pow};

/// Magnitudes below this are considered "about to go subnormal" and get a
/// noise floor injected. IEEE 754 doubles go subnormal near 2.2e-308; this
/// threshold leaves a wide margin while staying far below audibility.
const GUARD_THRESHOLD: f64 = 1.18e-23;

/// Scale applied to the raw 32-bit state when injecting the noise floor.
const GUARD_SCALE: f64 = 1.18e-17;

/// Scale applied to the centered 32-bit state when dithering.
const DITHER_SCALE: f64 = 5.5e-36;

/// 32-bit xorshift pseudo-random generator (Marsaglia's 13/17/5 triple).
///
/// Deterministic for a given seed; a zero seed is remapped so the state can
/// never get stuck. One instance per audio channel.
#[derive(Debug, Clone, Copy)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    /// Create a generator from a seed.
    ///
    /// The seed is scrambled by a Weyl constant so that small consecutive
    /// seeds (channel 0, channel 1, ...) still produce well-separated
    /// streams. A zero result is remapped to the constant itself.
    pub fn new(seed: u32) -> Self {
        let scrambled = seed.wrapping_add(1).wrapping_mul(0x9E37_79B9);
        Self {
            state: if scrambled == 0 { 0x9E37_79B9 } else { scrambled },
        }
    }

    /// Advance the generator and return the next 32-bit value.
    #[inline]
    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Current state without advancing.
    ///
    /// The denormal guard reads this; only the dither step advances, so the
    /// generator ticks exactly once per channel per sample.
    #[inline]
    pub fn peek(&self) -> u32 {
        self.state
    }
}

/// Replace a near-zero sample with a tiny PRNG-derived value of matching
/// sign. Does not advance the generator (see [`Xorshift32::peek`]).
#[inline]
pub fn denormal_guard(x: f64, rng: &Xorshift32) -> f64 {
    if x.abs() < GUARD_THRESHOLD {
        let noise = f64::from(rng.peek()) * GUARD_SCALE;
        if x.is_sign_negative() { -noise } else { noise }
    } else {
        x
    }
}

/// Add dither scaled to the sample's own f32 exponent.
///
/// The noise term sits at roughly one least-significant mantissa bit of the
/// value as an `f32`, which is where the port truncation will land.
#[inline]
pub fn dither(x: f64, rng: &mut Xorshift32) -> f64 {
    let r = rng.next();
    let (_, expon) = frexpf(x as f32);
    x + (f64::from(r) - f64::from(0x7FFF_FFFFu32)) * DITHER_SCALE * pow(2.0, f64::from(expon + 62))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_seed() {
        let mut a = Xorshift32::new(7);
        let mut b = Xorshift32::new(7);
        for _ in 0..1000 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn seeds_diverge() {
        let mut a = Xorshift32::new(0);
        let mut b = Xorshift32::new(1);
        let same = (0..64).filter(|_| a.next() == b.next()).count();
        assert!(same < 4, "streams barely diverge: {same} collisions");
    }

    #[test]
    fn zero_seed_is_usable() {
        let mut rng = Xorshift32::new(0);
        let first = rng.next();
        assert_ne!(first, 0);
        assert_ne!(rng.next(), first);
    }

    #[test]
    fn state_never_zero() {
        let mut rng = Xorshift32::new(42);
        for _ in 0..100_000 {
            assert_ne!(rng.next(), 0, "xorshift state collapsed to zero");
        }
    }

    #[test]
    fn guard_replaces_tiny_values() {
        let rng = Xorshift32::new(3);
        let out = denormal_guard(1e-30, &rng);
        assert!(out != 1e-30 && out > 0.0);
        assert!(out < 1e-6, "noise floor too loud: {out}");

        let out = denormal_guard(-1e-30, &rng);
        assert!(out < 0.0, "guard should match sign");
    }

    #[test]
    fn guard_passes_normal_values() {
        let rng = Xorshift32::new(3);
        assert_eq!(denormal_guard(0.5, &rng), 0.5);
        assert_eq!(denormal_guard(-1e-10, &rng), -1e-10);
    }

    #[test]
    fn guard_does_not_advance() {
        let mut rng = Xorshift32::new(5);
        let a = denormal_guard(0.0, &rng);
        let b = denormal_guard(0.0, &rng);
        assert_eq!(a, b, "guard must not advance the stream");
        rng.next();
        let c = denormal_guard(0.0, &rng);
        assert_ne!(a, c, "stream should move once the dither step advances");
    }

    #[test]
    fn dither_stays_tiny() {
        let mut rng = Xorshift32::new(11);
        for i in 0..1000 {
            let x = f64::from(i - 500) / 500.0;
            let d = dither(x, &mut rng) - x;
            assert!(d.abs() < 2e-7, "dither {d} too large for x={x}");
        }
    }

    #[test]
    fn dither_scales_with_exponent() {
        let mut rng = Xorshift32::new(11);
        // Collect worst-case dither at two very different magnitudes.
        let mut max_small: f64 = 0.0;
        let mut max_big: f64 = 0.0;
        for _ in 0..200 {
            max_small = max_small.max((dither(1e-4, &mut rng) - 1e-4).abs());
            max_big = max_big.max((dither(1.0, &mut rng) - 1.0).abs());
        }
        assert!(max_small < max_big, "dither should track the exponent");
    }
}
