//! One-pole filters for tone shaping and DC removal.
//!
//! [`OnePole`] is the classic 6 dB/oct lowpass:
//!
//! ```text
//! y[n] = x[n] + coeff * (y[n-1] - x[n])      coeff = exp(-2*pi*f/sr)
//! ```
//!
//! [`OnePoleHighpass`] is the same pole flipped around — it tracks the low
//! content with the lowpass recursion and subtracts it, which is all a DC
//! blocker or rumble filter needs.

use crate::math::flush_denormal;
use libm::exp;

/// One-pole (6 dB/oct) lowpass filter.
#[derive(Debug, Clone, Copy)]
pub struct OnePole {
    state: f64,
    coeff: f64,
    sample_rate: f64,
    freq: f64,
}

impl OnePole {
    /// Create a lowpass with the given cutoff.
    pub fn new(sample_rate: f64, freq_hz: f64) -> Self {
        let mut filter = Self {
            state: 0.0,
            coeff: 0.0,
            sample_rate,
            freq: freq_hz,
        };
        filter.recalculate();
        filter
    }

    /// Change the cutoff frequency.
    pub fn set_frequency(&mut self, freq_hz: f64) {
        self.freq = freq_hz;
        self.recalculate();
    }

    /// Change the sample rate, keeping the cutoff.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.state = flush_denormal(input + self.coeff * (self.state - input));
        self.state
    }

    /// Zero the filter state.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    fn recalculate(&mut self) {
        self.coeff = exp(-core::f64::consts::TAU * self.freq / self.sample_rate);
    }
}

/// One-pole highpass: input minus the one-pole-tracked low content.
#[derive(Debug, Clone, Copy)]
pub struct OnePoleHighpass {
    lowpass: OnePole,
}

impl OnePoleHighpass {
    /// Create a highpass with the given corner frequency.
    pub fn new(sample_rate: f64, freq_hz: f64) -> Self {
        Self {
            lowpass: OnePole::new(sample_rate, freq_hz),
        }
    }

    /// Change the corner frequency.
    pub fn set_frequency(&mut self, freq_hz: f64) {
        self.lowpass.set_frequency(freq_hz);
    }

    /// Change the sample rate, keeping the corner.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.lowpass.set_sample_rate(sample_rate);
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        input - self.lowpass.process(input)
    }

    /// Zero the filter state.
    pub fn reset(&mut self) {
        self.lowpass.reset();
    }
}
