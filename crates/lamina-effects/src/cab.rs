//! Cabinet simulator.
//!
//! A speaker cabinet is mostly a filter: steep high rolloff, a low-mid
//! scoop, a presence bump, and a low cut that moves with cabinet size. The
//! chain here is five biquads and a touch of tanh grit:
//!
//! ```text
//! in -> highpass (size) -> scoop peak -> presence peak
//!    -> lowpass x2 (brightness) -> grit -> output trim
//! ```

use lamina_core::{
    Biquad, Effect, ParamDescriptor, ParamId, ParameterInfo, db_to_linear, highpass_coefficients,
    linear_to_db, lowpass_coefficients, peaking_coefficients, soft_clip, wet_dry_mix,
};

/// Butterworth Q for the rolloff stages.
const ROLLOFF_Q: f64 = core::f64::consts::FRAC_1_SQRT_2;

/// Center of the low-mid scoop in Hz.
const SCOOP_HZ: f64 = 500.0;

/// Center of the presence bump in Hz.
const PRESENCE_HZ: f64 = 2600.0;

/// Per-channel filter bank: highpass, scoop, presence, two lowpasses.
#[derive(Clone, Copy)]
struct CabChannel {
    filters: [Biquad; 5],
}

impl CabChannel {
    fn new() -> Self {
        Self {
            filters: [Biquad::new(); 5],
        }
    }

    #[inline]
    fn run(&mut self, x: f64) -> f64 {
        let mut y = x;
        for f in &mut self.filters {
            y = f.process(y);
        }
        y
    }
}

/// Cabinet simulator.
///
/// ## Parameters (`ParameterInfo`)
///
/// | Idx | Name | Range | Default |
/// |-----|------|-------|---------|
/// | 0 | Size | 0.0-1.0 | 0.5 |
/// | 1 | Brightness | 2000-7000 Hz | 4500 |
/// | 2 | Grit | 0.0-1.0 | 0.2 |
/// | 3 | Output | -12 to +12 dB | 0 |
pub struct CabinetSim {
    channels: [CabChannel; 2],
    size: f64,
    brightness_hz: f64,
    grit: f64,
    output: f64,
    sample_rate: f64,
}

impl CabinetSim {
    /// Create a cabinet at the given sample rate with default settings.
    pub fn new(sample_rate: f32) -> Self {
        let sr = f64::from(sample_rate.max(1.0));
        let mut cab = Self {
            channels: [CabChannel::new(); 2],
            size: 0.5,
            brightness_hz: 4500.0,
            grit: 0.2,
            output: 1.0,
            sample_rate: sr,
        };
        cab.update_filters();
        cab
    }

    /// Set cabinet size (0 = small and tight, 1 = big and boomy).
    pub fn set_size(&mut self, size: f32) {
        self.size = f64::from(size.clamp(0.0, 1.0));
        self.update_filters();
    }

    /// Cabinet size.
    pub fn size(&self) -> f32 {
        self.size as f32
    }

    /// Set the brightness corner in Hz (2000-7000).
    pub fn set_brightness_hz(&mut self, hz: f32) {
        self.brightness_hz = f64::from(hz.clamp(2000.0, 7000.0));
        self.update_filters();
    }

    /// Brightness corner in Hz.
    pub fn brightness_hz(&self) -> f32 {
        self.brightness_hz as f32
    }

    /// Set the grit blend (0 = clean filter bank, 1 = full tanh stage).
    pub fn set_grit(&mut self, grit: f32) {
        self.grit = f64::from(grit.clamp(0.0, 1.0));
    }

    /// Grit blend.
    pub fn grit(&self) -> f32 {
        self.grit as f32
    }

    /// Set output trim in dB (-12 to +12).
    pub fn set_output_db(&mut self, db: f32) {
        self.output = db_to_linear(f64::from(db.clamp(-12.0, 12.0)));
    }

    /// Output trim in dB.
    pub fn output_db(&self) -> f32 {
        linear_to_db(self.output) as f32
    }

    fn update_filters(&mut self) {
        let nyq = self.sample_rate * 0.45;
        // Bigger cabinets reach lower: 110 Hz down to 55 Hz.
        let low_corner = (110.0 - self.size * 55.0).min(nyq);
        let scoop_depth = -3.0 - self.size * 2.0;
        let hp = highpass_coefficients(low_corner, ROLLOFF_Q, self.sample_rate);
        let scoop = peaking_coefficients(SCOOP_HZ.min(nyq), 0.8, scoop_depth, self.sample_rate);
        let presence = peaking_coefficients(PRESENCE_HZ.min(nyq), 1.2, 3.0, self.sample_rate);
        let lp = lowpass_coefficients(self.brightness_hz.min(nyq), ROLLOFF_Q, self.sample_rate);
        for ch in &mut self.channels {
            ch.filters[0].set_coefficients(hp);
            ch.filters[1].set_coefficients(scoop);
            ch.filters[2].set_coefficients(presence);
            ch.filters[3].set_coefficients(lp);
            ch.filters[4].set_coefficients(lp);
        }
    }

    #[inline]
    fn process_channel(&mut self, ch: usize, input: f64) -> f64 {
        let filtered = self.channels[ch].run(input);
        let gritty = wet_dry_mix(filtered, soft_clip(filtered * 1.5) / 1.5, self.grit);
        gritty * self.output
    }
}

impl Effect for CabinetSim {
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
        self.update_filters();
    }

    fn reset(&mut self) {
        for ch in &mut self.channels {
            for f in &mut ch.filters {
                f.clear();
            }
        }
    }
}

impl ParameterInfo for CabinetSim {
    fn param_count(&self) -> usize {
        4
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor::custom("Size", "Size", 0.0, 1.0, 0.5)
                    .with_id(ParamId(1200), "cab_size"),
            ),
            1 => Some(
                ParamDescriptor::freq_hz("Brightness", "Bright", 2000.0, 7000.0, 4500.0)
                    .with_id(ParamId(1201), "cab_brightness"),
            ),
            2 => Some(
                ParamDescriptor::custom("Grit", "Grit", 0.0, 1.0, 0.2)
                    .with_id(ParamId(1202), "cab_grit"),
            ),
            3 => Some(
                ParamDescriptor::gain_db("Output", "Out", -12.0, 12.0, 0.0)
                    .with_id(ParamId(1203), "cab_output"),
            ),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.size(),
            1 => self.brightness_hz(),
            2 => self.grit(),
            3 => self.output_db(),
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.set_size(value),
            1 => self.set_brightness_hz(value),
            2 => self.set_grit(value),
            3 => self.set_output_db(value),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_under_hot_input() {
        let mut cab = CabinetSim::new(48_000.0);
        cab.set_grit(1.0);
        for i in 0..5000 {
            let x = libm::sinf(i as f32 * 0.4) * 1.5;
            let out = cab.process(x);
            assert!(out.is_finite());
            assert!(out.abs() < 8.0);
        }
    }

    #[test]
    fn rolls_off_highs() {
        let mut cab = CabinetSim::new(48_000.0);
        cab.set_brightness_hz(2000.0);
        cab.set_grit(0.0);

        // Compare steady-state response at 300 Hz vs 12 kHz.
        let sr = 48_000.0_f32;
        let mut low_energy = 0.0_f32;
        let mut high_energy = 0.0_f32;
        for i in 0..48_000 {
            let t = i as f32 / sr;
            let low = libm::sinf(2.0 * core::f32::consts::PI * 300.0 * t);
            let out = cab.process(low);
            if i > 4800 {
                low_energy += out * out;
            }
        }
        cab.reset();
        for i in 0..48_000 {
            let t = i as f32 / sr;
            let high = libm::sinf(2.0 * core::f32::consts::PI * 12_000.0 * t);
            let out = cab.process(high);
            if i > 4800 {
                high_energy += out * out;
            }
        }
        assert!(
            low_energy > high_energy * 10.0,
            "no high rolloff: low {low_energy} high {high_energy}"
        );
    }

    #[test]
    fn blocks_deep_lows() {
        let mut cab = CabinetSim::new(48_000.0);
        cab.set_size(0.0); // tightest low corner
        cab.set_grit(0.0);
        let mut out = 0.0_f32;
        for _ in 0..96_000 {
            out = cab.process(1.0); // DC
        }
        assert!(out.abs() < 1e-3, "DC leaked through: {out}");
    }

    #[test]
    fn param_roundtrip() {
        let mut cab = CabinetSim::new(48_000.0);
        cab.set_param(1, 3000.0);
        assert!((cab.get_param(1) - 3000.0).abs() < 1.0);
        cab.set_param(3, -6.0);
        assert!((cab.get_param(3) - (-6.0)).abs() < 0.01);
    }

    #[test]
    fn reset_silences() {
        let mut cab = CabinetSim::new(48_000.0);
        for _ in 0..500 {
            cab.process(0.8);
        }
        cab.reset();
        assert!(cab.process(0.0).abs() < 1e-9);
    }
}
