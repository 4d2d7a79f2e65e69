//! Three-band equalizer.
//!
//! Fixed-center peaking bands at 120 Hz, 1 kHz, and 6.5 kHz with +/-12 dB
//! of gain each, followed by a protective sine saturator so stacked boosts
//! cannot push the bus past roughly unity.

use lamina_core::math::SINE_CLIP_SPAN;
use lamina_core::{
    Biquad, Effect, ParamDescriptor, ParamId, ParameterInfo, db_to_linear, linear_to_db,
    peaking_coefficients, sine_clip,
};

/// Band centers in Hz.
const BAND_CENTERS: [f64; 3] = [120.0, 1000.0, 6500.0];

/// Band Qs; wider at the edges, tighter in the middle.
const BAND_QS: [f64; 3] = [0.7, 0.9, 0.7];

/// Pre-scale into the sine segment so its small-signal slope is exactly
/// unity; the ceiling then sits just under 1.0.
const PROTECT_SCALE: f64 = 2.0 / SINE_CLIP_SPAN;

/// Three-band equalizer.
///
/// ## Parameters (`ParameterInfo`)
///
/// | Idx | Name | Range | Default |
/// |-----|------|-------|---------|
/// | 0 | Low | -12 to +12 dB | 0 |
/// | 1 | Mid | -12 to +12 dB | 0 |
/// | 2 | High | -12 to +12 dB | 0 |
/// | 3 | Output | -12 to +12 dB | 0 |
pub struct ThreeBandEq {
    bands: [[Biquad; 2]; 3],
    gains_db: [f64; 3],
    output: f64,
    sample_rate: f64,
}

impl ThreeBandEq {
    /// Create a flat EQ at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let sr = f64::from(sample_rate.max(1.0));
        let mut eq = Self {
            bands: [[Biquad::new(); 2]; 3],
            gains_db: [0.0; 3],
            output: 1.0,
            sample_rate: sr,
        };
        eq.update_band(0);
        eq.update_band(1);
        eq.update_band(2);
        eq
    }

    /// Set a band gain in dB (-12 to +12). Bands are 0 = low, 1 = mid,
    /// 2 = high.
    pub fn set_band_db(&mut self, band: usize, db: f32) {
        if band < 3 {
            self.gains_db[band] = f64::from(db.clamp(-12.0, 12.0));
            self.update_band(band);
        }
    }

    /// Band gain in dB.
    pub fn band_db(&self, band: usize) -> f32 {
        if band < 3 { self.gains_db[band] as f32 } else { 0.0 }
    }

    /// Set output trim in dB (-12 to +12).
    pub fn set_output_db(&mut self, db: f32) {
        self.output = db_to_linear(f64::from(db.clamp(-12.0, 12.0)));
    }

    /// Output trim in dB.
    pub fn output_db(&self) -> f32 {
        linear_to_db(self.output) as f32
    }

    fn update_band(&mut self, band: usize) {
        let freq = BAND_CENTERS[band].min(self.sample_rate * 0.45);
        let coeffs = peaking_coefficients(freq, BAND_QS[band], self.gains_db[band], self.sample_rate);
        self.bands[band][0].set_coefficients(coeffs);
        self.bands[band][1].set_coefficients(coeffs);
    }

    #[inline]
    fn process_channel(&mut self, ch: usize, input: f64) -> f64 {
        let mut y = input;
        for band in &mut self.bands {
            y = band[ch].process(y);
        }
        sine_clip(y * self.output * PROTECT_SCALE)
    }
}

impl Effect for ThreeBandEq {
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
        self.update_band(0);
        self.update_band(1);
        self.update_band(2);
    }

    fn reset(&mut self) {
        for band in &mut self.bands {
            band[0].clear();
            band[1].clear();
        }
    }
}

impl ParameterInfo for ThreeBandEq {
    fn param_count(&self) -> usize {
        4
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor::gain_db("Low", "Low", -12.0, 12.0, 0.0)
                    .with_id(ParamId(1300), "eq_low"),
            ),
            1 => Some(
                ParamDescriptor::gain_db("Mid", "Mid", -12.0, 12.0, 0.0)
                    .with_id(ParamId(1301), "eq_mid"),
            ),
            2 => Some(
                ParamDescriptor::gain_db("High", "High", -12.0, 12.0, 0.0)
                    .with_id(ParamId(1302), "eq_high"),
            ),
            3 => Some(
                ParamDescriptor::gain_db("Output", "Out", -12.0, 12.0, 0.0)
                    .with_id(ParamId(1303), "eq_output"),
            ),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0..=2 => self.band_db(index),
            3 => self.output_db(),
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0..=2 => self.set_band_db(index, value),
            3 => self.set_output_db(value),
            _ => {}
        }
    }
}
