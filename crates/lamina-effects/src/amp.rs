//! Tube-voiced amp model.
//!
//! The simple repeating pattern shared by the non-reverb engines: cascaded
//! two-pole filters plus sample-wise waveshaping. Here that is a drive
//! stage, a two-biquad tone rolloff, an asymmetric shaper (sine-bounded
//! positive half, tanh negative half), and a DC-removing highpass — bias
//! asymmetry generates even harmonics and a DC component, and the highpass
//! takes the DC back out.

use lamina_core::{
    Biquad, Effect, OnePoleHighpass, ParamDescriptor, ParamId, ParameterInfo, db_to_linear,
    linear_to_db, lowpass_coefficients, sine_clip, soft_clip,
};

/// Butterworth Q for the cascaded tone stages.
const TONE_Q: f64 = core::f64::consts::FRAC_1_SQRT_2;

/// Corner of the DC-removal highpass in Hz.
const DC_CORNER_HZ: f64 = 20.0;

/// Per-channel filter state.
#[derive(Clone, Copy)]
struct AmpChannel {
    tone: [Biquad; 2],
    dc_block: OnePoleHighpass,
}

impl AmpChannel {
    fn new(sample_rate: f64) -> Self {
        Self {
            tone: [Biquad::new(); 2],
            dc_block: OnePoleHighpass::new(sample_rate, DC_CORNER_HZ),
        }
    }
}

/// Tube-voiced amp model.
///
/// ## Parameters (`ParameterInfo`)
///
/// | Idx | Name | Range | Default |
/// |-----|------|-------|---------|
/// | 0 | Drive | 0 to +36 dB | 12 |
/// | 1 | Tone | 500-8000 Hz | 4000 |
/// | 2 | Bias | 0.0-1.0 | 0.3 |
/// | 3 | Output | -24 to +12 dB | -6 |
pub struct TubeAmp {
    channels: [AmpChannel; 2],
    drive: f64,
    tone_hz: f64,
    bias: f64,
    output: f64,
    sample_rate: f64,
}

impl TubeAmp {
    /// Create an amp at the given sample rate with default settings.
    pub fn new(sample_rate: f32) -> Self {
        let sr = f64::from(sample_rate.max(1.0));
        let mut amp = Self {
            channels: [AmpChannel::new(sr); 2],
            drive: db_to_linear(12.0),
            tone_hz: 4000.0,
            bias: 0.3,
            output: db_to_linear(-6.0),
            sample_rate: sr,
        };
        amp.update_tone();
        amp
    }

    /// Set drive in dB (0 to +36).
    pub fn set_drive_db(&mut self, db: f32) {
        self.drive = db_to_linear(f64::from(db.clamp(0.0, 36.0)));
    }

    /// Drive in dB.
    pub fn drive_db(&self) -> f32 {
        linear_to_db(self.drive) as f32
    }

    /// Set the tone corner in Hz (500-8000).
    pub fn set_tone_hz(&mut self, hz: f32) {
        self.tone_hz = f64::from(hz.clamp(500.0, 8000.0));
        self.update_tone();
    }

    /// Tone corner in Hz.
    pub fn tone_hz(&self) -> f32 {
        self.tone_hz as f32
    }

    /// Set bias asymmetry (0 = symmetric, 1 = maximum even-harmonic tilt).
    pub fn set_bias(&mut self, bias: f32) {
        self.bias = f64::from(bias.clamp(0.0, 1.0));
    }

    /// Bias asymmetry.
    pub fn bias(&self) -> f32 {
        self.bias as f32
    }

    /// Set output level in dB (-24 to +12).
    pub fn set_output_db(&mut self, db: f32) {
        self.output = db_to_linear(f64::from(db.clamp(-24.0, 12.0)));
    }

    /// Output level in dB.
    pub fn output_db(&self) -> f32 {
        linear_to_db(self.output) as f32
    }

    fn update_tone(&mut self) {
        let freq = self.tone_hz.min(self.sample_rate * 0.45);
        let coeffs = lowpass_coefficients(freq, TONE_Q, self.sample_rate);
        for ch in &mut self.channels {
            for stage in &mut ch.tone {
                stage.set_coefficients(coeffs);
            }
        }
    }

    /// The waveshaper: sine-segment saturation above the axis, tanh below,
    /// with the negative half driven harder as bias rises.
    #[inline]
    fn shape(&self, x: f64) -> f64 {
        if x >= 0.0 {
            sine_clip(x)
        } else {
            let push = 1.0 + self.bias;
            soft_clip(x * push) / push
        }
    }

    #[inline]
    fn process_channel(&mut self, ch: usize, input: f64) -> f64 {
        let driven = input * self.drive;
        let toned = {
            let channel = &mut self.channels[ch];
            let mid = channel.tone[0].process(driven);
            channel.tone[1].process(mid)
        };
        let shaped = self.shape(toned);
        let cleaned = self.channels[ch].dc_block.process(shaped);
        cleaned * self.output
    }
}

impl Effect for TubeAmp {
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
        let sr = f64::from(sample_rate.max(1.0));
        self.sample_rate = sr;
        for ch in &mut self.channels {
            ch.dc_block.set_sample_rate(sr);
        }
        self.update_tone();
    }

    fn reset(&mut self) {
        for ch in &mut self.channels {
            for stage in &mut ch.tone {
                stage.clear();
            }
            ch.dc_block.reset();
        }
    }
}

impl ParameterInfo for TubeAmp {
    fn param_count(&self) -> usize {
        4
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor::gain_db("Drive", "Drive", 0.0, 36.0, 12.0)
                    .with_id(ParamId(1100), "amp_drive"),
            ),
            1 => Some(
                ParamDescriptor::freq_hz("Tone", "Tone", 500.0, 8000.0, 4000.0)
                    .with_id(ParamId(1101), "amp_tone"),
            ),
            2 => Some(
                ParamDescriptor::custom("Bias", "Bias", 0.0, 1.0, 0.3)
                    .with_id(ParamId(1102), "amp_bias"),
            ),
            3 => Some(
                ParamDescriptor::gain_db("Output", "Out", -24.0, 12.0, -6.0)
                    .with_id(ParamId(1103), "amp_output"),
            ),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.drive_db(),
            1 => self.tone_hz(),
            2 => self.bias(),
            3 => self.output_db(),
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.set_drive_db(value),
            1 => self.set_tone_hz(value),
            2 => self.set_bias(value),
            3 => self.set_output_db(value),
            _ => {}
        }
    }
}
