//! Console-color bus processor.
//!
//! The sine-law console trick: treating the signal as the angle of a sine
//! compresses peaks the way summing amps do, and a shallow glue dip around
//! 3 kHz takes the edge off. The color control blends between the clean
//! and shaped paths, so 0 is a plain trim.
//!
//! ```text
//! in -> trim -> glue dip (peaking, color-scaled) -> sine law x color -> out
//! ```

use lamina_core::{
    Biquad, Effect, ParamDescriptor, ParamId, ParameterInfo, db_to_linear, hard_clip,
    linear_to_db, peaking_coefficients, wet_dry_mix,
};
use libm::sin;

/// Center of the glue dip in Hz.
const GLUE_HZ: f64 = 3200.0;

/// Glue dip depth at full color, in dB.
const GLUE_DEPTH_DB: f64 = -1.5;

/// The sine law saturates at +/- pi/2 of "angle"; clamp there.
const ANGLE_LIMIT: f64 = core::f64::consts::FRAC_PI_2;

/// Console-color bus processor.
///
/// ## Parameters (`ParameterInfo`)
///
/// | Idx | Name | Range | Default |
/// |-----|------|-------|---------|
/// | 0 | Color | 0.0-1.0 | 0.5 |
/// | 1 | Trim | -12 to +12 dB | 0 |
/// | 2 | Output | -12 to +12 dB | 0 |
pub struct ConsoleBus {
    glue: [Biquad; 2],
    color: f64,
    trim: f64,
    output: f64,
    sample_rate: f64,
}

impl ConsoleBus {
    /// Create a console bus at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let sr = f64::from(sample_rate.max(1.0));
        let mut bus = Self {
            glue: [Biquad::new(); 2],
            color: 0.5,
            trim: 1.0,
            output: 1.0,
            sample_rate: sr,
        };
        bus.update_glue();
        bus
    }

    /// Set the color amount (0 = clean trim, 1 = full console law).
    pub fn set_color(&mut self, color: f32) {
        self.color = f64::from(color.clamp(0.0, 1.0));
        self.update_glue();
    }

    /// Color amount.
    pub fn color(&self) -> f32 {
        self.color as f32
    }

    /// Set input trim in dB (-12 to +12).
    pub fn set_trim_db(&mut self, db: f32) {
        self.trim = db_to_linear(f64::from(db.clamp(-12.0, 12.0)));
    }

    /// Input trim in dB.
    pub fn trim_db(&self) -> f32 {
        linear_to_db(self.trim) as f32
    }

    /// Set output level in dB (-12 to +12).
    pub fn set_output_db(&mut self, db: f32) {
        self.output = db_to_linear(f64::from(db.clamp(-12.0, 12.0)));
    }

    /// Output level in dB.
    pub fn output_db(&self) -> f32 {
        linear_to_db(self.output) as f32
    }

    fn update_glue(&mut self) {
        let freq = GLUE_HZ.min(self.sample_rate * 0.45);
        let coeffs =
            peaking_coefficients(freq, 0.5, GLUE_DEPTH_DB * self.color, self.sample_rate);
        self.glue[0].set_coefficients(coeffs);
        self.glue[1].set_coefficients(coeffs);
    }

    #[inline]
    fn process_channel(&mut self, ch: usize, input: f64) -> f64 {
        let trimmed = input * self.trim;
        let dipped = self.glue[ch].process(trimmed);
        let shaped = sin(hard_clip(dipped, ANGLE_LIMIT));
        wet_dry_mix(dipped, shaped, self.color) * self.output
    }
}

impl Effect for ConsoleBus {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.process_channel(0, f64::from(input)) as f32
    }

    #[inline]
    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        (
            self.process_channel(0, f64::from(left)) as f32,
            self.process_channel(1, f64::from(right)) as f32,
        )
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = f64::from(sample_rate.max(1.0));
        self.update_glue();
    }

    fn reset(&mut self) {
        self.glue[0].clear();
        self.glue[1].clear();
    }
}

impl ParameterInfo for ConsoleBus {
    fn param_count(&self) -> usize {
        3
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor::custom("Color", "Color", 0.0, 1.0, 0.5)
                    .with_id(ParamId(1400), "console_color"),
            ),
            1 => Some(
                ParamDescriptor::gain_db("Trim", "Trim", -12.0, 12.0, 0.0)
                    .with_id(ParamId(1401), "console_trim"),
            ),
            2 => Some(
                ParamDescriptor::gain_db("Output", "Out", -12.0, 12.0, 0.0)
                    .with_id(ParamId(1402), "console_output"),
            ),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.color(),
            1 => self.trim_db(),
            2 => self.output_db(),
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.set_color(value),
            1 => self.set_trim_db(value),
            2 => self.set_output_db(value),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_color_is_a_clean_trim() {
        let mut bus = ConsoleBus::new(48_000.0);
        bus.set_color(0.0);
        for i in 0..2000 {
            let x = libm::sinf(i as f32 * 0.17) * 0.6;
            let out = bus.process(x);
            assert!((out - x).abs() < 1e-6, "color 0 altered the signal");
        }
    }

    #[test]
    fn full_color_compresses_peaks() {
        let mut bus = ConsoleBus::new(48_000.0);
        bus.set_color(1.0);
        let out = bus.process(1.0);
        // sin(1.0) = 0.841..., plus a hair of glue-dip transient.
        assert!(out < 0.95 && out > 0.5, "console law missing: {out}");
    }

    #[test]
    fn output_bounded_at_any_drive() {
        let mut bus = ConsoleBus::new(48_000.0);
        bus.set_color(1.0);
        bus.set_trim_db(12.0);
        for i in 0..5000 {
            let x = libm::sinf(i as f32 * 0.3) * 1.5;
            let out = bus.process(x);
            assert!(out.is_finite());
            assert!(out.abs() < 1.5, "console bus overshot: {out}");
        }
    }

    #[test]
    fn color_is_monotonic_in_harmonic_content() {
        // More color -> more shaping -> lower peak output on a hot sine.
        let mut mild = ConsoleBus::new(48_000.0);
        mild.set_color(0.25);
        let mut heavy = ConsoleBus::new(48_000.0);
        heavy.set_color(1.0);
        let mut peak_mild = 0.0_f32;
        let mut peak_heavy = 0.0_f32;
        for i in 0..4800 {
            let x = libm::sinf(i as f32 * 0.11) * 0.95;
            peak_mild = peak_mild.max(mild.process(x).abs());
            peak_heavy = peak_heavy.max(heavy.process(x).abs());
        }
        assert!(peak_heavy < peak_mild, "{peak_heavy} vs {peak_mild}");
    }

    #[test]
    fn param_roundtrip() {
        let mut bus = ConsoleBus::new(48_000.0);
        bus.set_param(0, 0.8);
        assert!((bus.get_param(0) - 0.8).abs() < 1e-6);
        bus.set_param(1, -3.0);
        assert!((bus.get_param(1) - (-3.0)).abs() < 0.01);
        bus.set_param(2, 40.0);
        assert!(bus.get_param(2) <= 12.0);
    }
}
