//! Diffuser allpass for early-reflection smearing.
//!
//! The form used throughout the reverb's diffuser:
//!
//! ```text
//! fed = in - c * delayed            (read before the cursor advances)
//! store fed, advance
//! out = fed + c * delayed'          (read after the cursor advances)
//! ```
//!
//! With c = 0.5 this smears a transient into a dense cluster without much
//! coloration. The two reads straddle the cursor advance, which is what
//! interlocks neighboring lines when several run in series.

use crate::delay::DelayLine;
use crate::math::flush_denormal;

/// Default smearing coefficient for diffuser stages.
pub const DIFFUSER_COEFF: f64 = 0.5;

/// Single allpass delay line.
#[derive(Debug, Clone)]
pub struct Allpass {
    delay: DelayLine,
    coefficient: f64,
}

impl Allpass {
    /// Create an allpass over a delay of `length` samples with the standard
    /// diffuser coefficient.
    pub fn new(length: usize) -> Self {
        Self {
            delay: DelayLine::new(length),
            coefficient: DIFFUSER_COEFF,
        }
    }

    /// Set the smearing coefficient. Stable for |c| < 1.
    pub fn set_coefficient(&mut self, c: f64) {
        self.coefficient = c.clamp(-0.99, 0.99);
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let len = self.delay.len();
        let fed = input - self.delay.read(len) * self.coefficient;
        self.delay.write(flush_denormal(fed));
        fed + self.delay.read(len) * self.coefficient
    }

    /// Zero the internal delay line.
    pub fn clear(&mut self) {
        self.delay.clear();
    }

    /// Delay length in samples.
    pub fn len(&self) -> usize {
        self.delay.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        false
    }
}
