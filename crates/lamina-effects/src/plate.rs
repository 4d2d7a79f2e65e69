//! Plate reverb engine.
//!
//! A decimating plate built from three nested structures:
//!
//! - a nine-allpass **diffuser** in a 3x3 butterfly that smears the input
//!   into decorrelated left/right early-reflection clusters (with one arm
//!   cross-wired so a one-sided transient excites both tails),
//! - a **tank** of twenty-five delay lines per channel in five groups of
//!   five, chained through five Householder mixing stages with bandpass
//!   filters and mulch averages embedded in the feedback return,
//! - a **cycle scheduler** that runs the tank once every `cycle_end` host
//!   samples (1 at 44.1/48 kHz, up to 4 at 192 kHz) and reconstructs the
//!   skipped samples from a small ring of recent tank outputs.
//!
//! Tank delay lengths rescale by the decimated rate, so the tail lasts the
//! same number of *seconds* at every host rate while the tank's CPU cost
//! stays roughly constant.
//!
//! All internal state is `f64`; the `Effect` ports are `f32`. Parameters
//! are cached on set and constant within a block.

use lamina_core::{
    Allpass, Biquad, DelayLine, Effect, ParamDescriptor, ParamId, ParameterInfo, Xorshift32,
    bandpass_coefficients, denormal_guard, dither, flush_denormal, sine_clip,
};
use libm::sin;

/// Tuning reference rate for all delay length constants.
const REFERENCE_RATE: f64 = 44100.0;

/// Predelay buffer ceiling in seconds.
const MAX_PREDELAY_SECONDS: f64 = 0.5;

/// Floor of the adaptive gain trackers (-42 dB).
const TRACKER_FLOOR: f64 = 1.0 / 128.0;

/// Diffuser allpass lengths at the reference rate. Primes, disjoint from
/// the tank set, so early reflections never line up with tank modes.
const EARLY_LENGTHS_44K: [usize; 9] = [13, 41, 71, 127, 199, 281, 431, 641, 971];

/// Tank delay lengths at the reference rate, ascending primes.
const TANK_LENGTHS_44K: [usize; 25] = [
    89, 113, 151, 181, 229, 283, 337, 397, 457, 509, 563, 617, 673, 733, 787, 839, 887, 937, 983,
    1021, 1061, 1091, 1117, 1151, 1187,
];

/// Left-channel line-to-group assignment: stride through the length table so
/// every group holds one line from each length quintile. That keeps the
/// shortest first-arrival path through the five stages under 1200 samples.
const GROUPS_LEFT: [[usize; 5]; 5] = [
    [0, 5, 10, 15, 20],
    [1, 6, 11, 16, 21],
    [2, 7, 12, 17, 22],
    [3, 8, 13, 18, 23],
    [4, 9, 14, 19, 24],
];

/// Right-channel assignment: same quintile structure, rotated within each
/// quintile, so the right tank's feedback topology differs from the left.
const GROUPS_RIGHT: [[usize; 5]; 5] = [
    [1, 7, 13, 19, 20],
    [2, 8, 14, 15, 21],
    [3, 9, 10, 16, 22],
    [4, 5, 11, 17, 23],
    [0, 6, 12, 18, 24],
];

/// Which tank filter serves each of the three filtered stage boundaries,
/// per channel. All four instances stay live and L/R spectra differ.
const FILTER_SELECT: [[usize; 3]; 2] = [[0, 1, 2], [1, 2, 3]];

/// Q ladder for the four tank bandpasses.
const FILTER_QS: [f64; 4] = [1.618034, 0.618034, 0.5, 0.5];

fn scaled_length(base: usize, scale: f64) -> usize {
    (((base as f64 * scale) + 0.5) as usize).max(1)
}

/// Recovery-only loudness governor.
///
/// Gain starts at [`TRACKER_FLOOR`] and is nudged upward by
/// `sin(min(4|x|, 4)) * x^4` (clamped non-negative), saturating at unity.
/// There is no decrease path: the gain comes back down only on reset. The
/// quartic makes recovery fast through moderate program material and
/// negligible near silence, and the sine term stalls it during
/// clipping-level passages.
#[derive(Debug, Clone, Copy)]
struct GainTracker {
    gain: f64,
}

impl GainTracker {
    fn new() -> Self {
        Self {
            gain: TRACKER_FLOOR,
        }
    }

    fn reset(&mut self) {
        self.gain = TRACKER_FLOOR;
    }

    #[inline]
    fn apply(&mut self, x: f64) -> f64 {
        let g = self.gain.clamp(TRACKER_FLOOR, 1.0);
        let y = x * g;
        let nudge = sin((x.abs() * 4.0).min(4.0)).max(0.0) * x * x * x * x;
        self.gain = (g + nudge).min(1.0);
        y
    }
}

/// Per-channel signal conditioner used on both sides of the tank.
///
/// Inbound order: pad, two half-sample averages, one-pole highpass,
/// adaptive gain, sine saturator. Outbound mirrors it in reverse, without
/// the pad.
#[derive(Debug, Clone, Copy)]
struct Conditioner {
    smooth_a: f64,
    smooth_b: f64,
    hp_state: f64,
    tracker: GainTracker,
}

impl Conditioner {
    fn new() -> Self {
        Self {
            smooth_a: 0.0,
            smooth_b: 0.0,
            hp_state: 0.0,
            tracker: GainTracker::new(),
        }
    }

    fn reset(&mut self) {
        self.smooth_a = 0.0;
        self.smooth_b = 0.0;
        self.hp_state = 0.0;
        self.tracker.reset();
    }

    #[inline]
    fn inbound(&mut self, x: f64, pad: f64, hp_coeff: f64) -> f64 {
        let x = x * pad;
        self.smooth_a = (x + self.smooth_a) * 0.5;
        let x = self.smooth_a;
        self.smooth_b = (x + self.smooth_b) * 0.5;
        let x = self.smooth_b;
        self.hp_state += (x - self.hp_state) * hp_coeff;
        let x = x - self.hp_state;
        let x = self.tracker.apply(x);
        sine_clip(x)
    }

    #[inline]
    fn outbound(&mut self, x: f64, hp_coeff: f64) -> f64 {
        let x = sine_clip(x);
        let x = self.tracker.apply(x);
        self.hp_state += (x - self.hp_state) * hp_coeff;
        let x = x - self.hp_state;
        self.smooth_a = (x + self.smooth_a) * 0.5;
        let x = self.smooth_a;
        self.smooth_b = (x + self.smooth_b) * 0.5;
        self.smooth_b
    }
}

/// Everything one channel owns: diffuser, predelay, tank lines, feedback
/// and reconstruction state, conditioners, and its PRNG.
struct PlateChannel {
    early: [Allpass; 9],
    predelay: DelayLine,
    tank: [DelayLine; 25],
    feedback: [f64; 5],
    mulch: [f64; 3],
    last_ref: [f64; 5],
    tail: [f64; 3],
    in_cond: Conditioner,
    out_cond: Conditioner,
    rng: Xorshift32,
    seed: u32,
}

impl PlateChannel {
    fn new(sample_rate: f64, cycle_end: usize, seed: u32) -> Self {
        let host_scale = sample_rate / REFERENCE_RATE;
        let tank_scale = (sample_rate / cycle_end as f64) / REFERENCE_RATE;
        Self {
            early: core::array::from_fn(|i| {
                Allpass::new(scaled_length(EARLY_LENGTHS_44K[i], host_scale))
            }),
            predelay: DelayLine::new((MAX_PREDELAY_SECONDS * sample_rate) as usize + 1),
            tank: core::array::from_fn(|i| {
                DelayLine::new(scaled_length(TANK_LENGTHS_44K[i], tank_scale))
            }),
            feedback: [0.0; 5],
            mulch: [0.0; 3],
            last_ref: [0.0; 5],
            tail: [0.0; 3],
            in_cond: Conditioner::new(),
            out_cond: Conditioner::new(),
            rng: Xorshift32::new(seed),
            seed,
        }
    }

    fn reset(&mut self) {
        for ap in &mut self.early {
            ap.clear();
        }
        self.predelay.clear();
        for line in &mut self.tank {
            line.clear();
        }
        self.feedback = [0.0; 5];
        self.mulch = [0.0; 3];
        self.last_ref = [0.0; 5];
        self.tail = [0.0; 3];
        self.in_cond.reset();
        self.out_cond.reset();
        self.rng = Xorshift32::new(self.seed);
    }
}

/// The unit-norm Householder reflection through the all-ones vector:
/// `new_i = (3*out_i - 2*sum_{j!=i} out_j) / 5 = out_i - 0.4*sum`.
/// Orthogonal, so the five chained stages redistribute energy without
/// amplifying it and the loop is stable for any regen below 1.
#[inline]
fn householder_mix5(v: [f64; 5]) -> [f64; 5] {
    let spread = (v[0] + v[1] + v[2] + v[3] + v[4]) * 0.4;
    [
        v[0] - spread,
        v[1] - spread,
        v[2] - spread,
        v[3] - spread,
        v[4] - spread,
    ]
}

/// Pairwise-minus-third butterfly over three signals. The rotation differs
/// per channel so the two diffusers decorrelate.
#[inline]
fn butterfly3(t: [f64; 3], rotate: bool) -> [f64; 3] {
    if rotate {
        [
            (t[2] + t[0]) - t[1],
            (t[0] + t[1]) - t[2],
            (t[1] + t[2]) - t[0],
        ]
    } else {
        [
            (t[1] + t[2]) - t[0],
            (t[2] + t[0]) - t[1],
            (t[0] + t[1]) - t[2],
        ]
    }
}

/// Plate reverb.
///
/// ## Parameters (`ParameterInfo`)
///
/// | Idx | Name | Range | Default |
/// |-----|------|-------|---------|
/// | 0 | Input | 0.0-1.0 | 1.0 |
/// | 1 | Damping | 0.0-1.0 | 0.5 |
/// | 2 | Low Cut | 0.0-1.0 | 0.1 |
/// | 3 | Predelay | 0-500 ms | 10 |
/// | 4 | Dry/Wet | 0.0-1.0 | 0.5 |
///
/// Damping sets both the feedback return gain (`regen`, about 0.04 down to
/// 0.0001) and the tank bandpass centers. Dry/Wet expands to independent
/// wet and dry gains that both reach unity at 0.5, leaving submix headroom.
///
/// # Example
///
/// ```rust
/// use lamina_effects::PlateReverb;
/// use lamina_core::Effect;
///
/// let mut plate = PlateReverb::new(48000.0);
/// plate.set_blend(1.0);
/// plate.reset();
/// let (l, r) = plate.process_stereo(0.5, 0.5);
/// assert!(l.is_finite() && r.is_finite());
/// ```
pub struct PlateReverb {
    sample_rate: f64,
    cycle_end: usize,
    cycle: usize,

    input_pad: f64,
    damping: f64,
    low_cut: f64,
    predelay_ms: f64,
    blend: f64,

    // Derived once per parameter change, constant within a block.
    regen: f64,
    hp_coeff: f64,
    predelay_samples: usize,
    wet: f64,
    dry: f64,

    // Four bandpass instances, [filter][channel] state.
    filters: [[Biquad; 2]; 4],

    left: PlateChannel,
    right: PlateChannel,
}

impl PlateReverb {
    /// Create a plate at the given sample rate with default parameters.
    pub fn new(sample_rate: f32) -> Self {
        let sr = f64::from(sample_rate.max(1.0));
        let cycle_end = ((sr / REFERENCE_RATE) as usize).clamp(1, 4);
        let mut plate = Self {
            sample_rate: sr,
            cycle_end,
            cycle: 0,
            input_pad: 1.0,
            damping: 0.5,
            low_cut: 0.1,
            predelay_ms: 10.0,
            blend: 0.5,
            regen: 0.0,
            hp_coeff: 0.0,
            predelay_samples: 0,
            wet: 0.0,
            dry: 0.0,
            filters: [[Biquad::new(); 2]; 4],
            left: PlateChannel::new(sr, cycle_end, 0),
            right: PlateChannel::new(sr, cycle_end, 1),
        };
        plate.refresh();
        plate
    }

    /// Set the input pad (0 = mute into the tank, 1 = unity).
    pub fn set_input_pad(&mut self, pad: f32) {
        self.input_pad = f64::from(pad.clamp(0.0, 1.0));
        self.refresh();
    }

    /// Input pad.
    pub fn input_pad(&self) -> f32 {
        self.input_pad as f32
    }

    /// Set damping (0 = longest, brightest tail; 1 = shortest, darkest).
    pub fn set_damping(&mut self, damping: f32) {
        self.damping = f64::from(damping.clamp(0.0, 1.0));
        self.refresh();
    }

    /// Damping.
    pub fn damping(&self) -> f32 {
        self.damping as f32
    }

    /// Set the low-cut amount (0 = barely any rumble filtering, 1 = heavy).
    pub fn set_low_cut(&mut self, low_cut: f32) {
        self.low_cut = f64::from(low_cut.clamp(0.0, 1.0));
        self.refresh();
    }

    /// Low-cut amount.
    pub fn low_cut(&self) -> f32 {
        self.low_cut as f32
    }

    /// Set predelay in milliseconds (0-500).
    pub fn set_predelay_ms(&mut self, ms: f32) {
        self.predelay_ms = f64::from(ms.clamp(0.0, 500.0));
        self.refresh();
    }

    /// Predelay in milliseconds.
    pub fn predelay_ms(&self) -> f32 {
        self.predelay_ms as f32
    }

    /// Set the dry/wet blend (0 = dry only, 0.5 = both full, 1 = wet only).
    pub fn set_blend(&mut self, blend: f32) {
        self.blend = f64::from(blend.clamp(0.0, 1.0));
        self.refresh();
    }

    /// Dry/wet blend.
    pub fn blend(&self) -> f32 {
        self.blend as f32
    }

    /// Decimation factor currently in effect (1-4).
    pub fn cycle_end(&self) -> usize {
        self.cycle_end
    }

    /// The current feedback return gain derived from damping.
    pub fn regen(&self) -> f64 {
        self.regen
    }

    /// Recompute everything derived from the controls.
    fn refresh(&mut self) {
        let down_rate = self.sample_rate / self.cycle_end as f64;

        let sustain = 1.0 - self.damping;
        self.regen = 0.0001 + sustain * sustain * 0.0399;

        // One-pole highpass coefficient, rate-compensated so the corner
        // stays put across host rates.
        let base = 0.0005 + self.low_cut * self.low_cut * 0.05;
        self.hp_coeff = (base * (REFERENCE_RATE / self.sample_rate)).min(0.5);

        self.predelay_samples =
            (((self.predelay_ms / 1000.0) * self.sample_rate) as usize).min(self.left.predelay.len());

        self.wet = (self.blend * 2.0).min(1.0);
        self.dry = ((1.0 - self.blend) * 2.0).min(1.0);

        // Three harmonically related bandpass centers from the damping
        // control, floored by the low cut; the fourth instance reuses the
        // fundamental with a wider skirt. The tank runs at the decimated
        // rate, so coefficients are computed against it.
        let f0 = (150.0 + self.low_cut * 120.0 + sustain * 1050.0).min(down_rate * 0.15);
        let centers = [f0, 2.0 * f0, 3.0 * f0, f0];
        for (i, pair) in self.filters.iter_mut().enumerate() {
            let coeffs = bandpass_coefficients(centers[i], FILTER_QS[i], down_rate);
            pair[0].set_coefficients(coeffs);
            pair[1].set_coefficients(coeffs);
        }
    }

    /// Run both diffusers one sample, butterflying within each channel and
    /// cross-wiring the third arm of the final layer between channels.
    fn diffuse(left: &mut PlateChannel, right: &mut PlateChannel, xl: f64, xr: f64) -> (f64, f64) {
        let mut sl = [xl; 3];
        let mut sr = [xr; 3];
        for layer in 0..2 {
            let tl = [
                left.early[layer * 3].process(sl[0]),
                left.early[layer * 3 + 1].process(sl[1]),
                left.early[layer * 3 + 2].process(sl[2]),
            ];
            let tr = [
                right.early[layer * 3].process(sr[0]),
                right.early[layer * 3 + 1].process(sr[1]),
                right.early[layer * 3 + 2].process(sr[2]),
            ];
            sl = butterfly3(tl, false);
            sr = butterfly3(tr, true);
        }
        let tl = [
            left.early[6].process(sl[0]),
            left.early[7].process(sl[1]),
            left.early[8].process(sl[2]),
        ];
        let tr = [
            right.early[6].process(sr[0]),
            right.early[7].process(sr[1]),
            right.early[8].process(sr[2]),
        ];
        let bl = butterfly3(tl, false);
        let br = butterfly3(tr, true);
        (
            (bl[0] + bl[1] + br[2]) / 3.0,
            (br[0] + br[1] + bl[2]) / 3.0,
        )
    }

    /// One full tank pass for one channel: inject input plus regen-scaled
    /// feedback into the first group, run the five mixing stages (bandpass
    /// and mulch embedded between the 2nd and 4th), capture the final
    /// outputs as next pass's feedback, and return the wet sum.
    fn tank_update(
        ch: &mut PlateChannel,
        filters: &mut [[Biquad; 2]; 4],
        groups: &[[usize; 5]; 5],
        ch_idx: usize,
        regen: f64,
        input: f64,
    ) -> f64 {
        let mut stage_in = [0.0; 5];
        for i in 0..5 {
            stage_in[i] = input + ch.feedback[i] * regen;
        }

        for stage in 0..5 {
            let mut outs = [0.0; 5];
            for i in 0..5 {
                let line = &mut ch.tank[groups[stage][i]];
                line.write(flush_denormal(stage_in[i]));
                let len = line.len();
                outs[i] = line.read(len);
            }
            let mut mixed = householder_mix5(outs);
            if (1..=3).contains(&stage) {
                let slot = stage - 1;
                let f = FILTER_SELECT[ch_idx][slot];
                mixed[0] = filters[f][ch_idx].process(mixed[0]);
                let prev = ch.mulch[slot];
                ch.mulch[slot] = mixed[4];
                mixed[4] = (mixed[4] + prev) * 0.5;
            }
            stage_in = mixed;
        }

        ch.feedback = stage_in;
        (stage_in[0] + stage_in[1] + stage_in[2] + stage_in[3] + stage_in[4]) * 0.2
    }

    /// Spread a fresh tank output across the reconstruction ring:
    /// identity at cycle_end 1, halves at 2, thirds at 3, quarters at 4.
    fn fan_out(last_ref: &mut [f64; 5], cycle_end: usize, v: f64) {
        match cycle_end {
            2 => {
                last_ref[0] = last_ref[2];
                last_ref[1] = (last_ref[0] + v) * 0.5;
                last_ref[2] = v;
            }
            3 => {
                last_ref[0] = last_ref[3];
                last_ref[1] = (last_ref[0] * 2.0 + v) / 3.0;
                last_ref[2] = (last_ref[0] + v * 2.0) / 3.0;
                last_ref[3] = v;
            }
            4 => {
                last_ref[0] = last_ref[4];
                last_ref[2] = (last_ref[0] + v) * 0.5;
                last_ref[1] = (last_ref[0] + last_ref[2]) * 0.5;
                last_ref[3] = (last_ref[2] + v) * 0.5;
                last_ref[4] = v;
            }
            _ => last_ref[0] = v,
        }
    }
}

impl Effect for PlateReverb {
    fn process(&mut self, input: f32) -> f32 {
        let (l, r) = self.process_stereo(input, input);
        (l + r) * 0.5
    }

    fn process_stereo(&mut self, left: f32, right: f32) -> (f32, f32) {
        let dry_l = f64::from(left);
        let dry_r = f64::from(right);

        let xl = denormal_guard(dry_l, &self.left.rng);
        let xr = denormal_guard(dry_r, &self.right.rng);

        let xl = self.left.in_cond.inbound(xl, self.input_pad, self.hp_coeff);
        let xr = self.right.in_cond.inbound(xr, self.input_pad, self.hp_coeff);

        let (el, er) = Self::diffuse(&mut self.left, &mut self.right, xl, xr);

        self.left.predelay.write(el);
        self.right.predelay.write(er);
        let (pre_l, pre_r) = if self.predelay_samples == 0 {
            (el, er)
        } else {
            (
                self.left.predelay.read(self.predelay_samples),
                self.right.predelay.read(self.predelay_samples),
            )
        };

        self.cycle += 1;
        if self.cycle >= self.cycle_end {
            let tl = Self::tank_update(
                &mut self.left,
                &mut self.filters,
                &GROUPS_LEFT,
                0,
                self.regen,
                pre_l,
            );
            let tr = Self::tank_update(
                &mut self.right,
                &mut self.filters,
                &GROUPS_RIGHT,
                1,
                self.regen,
                pre_r,
            );
            let tl = self.left.out_cond.outbound(tl, self.hp_coeff);
            let tr = self.right.out_cond.outbound(tr, self.hp_coeff);
            Self::fan_out(&mut self.left.last_ref, self.cycle_end, tl);
            Self::fan_out(&mut self.right.last_ref, self.cycle_end, tr);
            self.cycle = 0;
        }

        let mut wet_l = self.left.last_ref[self.cycle];
        let mut wet_r = self.right.last_ref[self.cycle];
        for k in 0..self.cycle_end - 1 {
            self.left.tail[k] = (self.left.tail[k] + wet_l) * 0.5;
            wet_l = self.left.tail[k];
            self.right.tail[k] = (self.right.tail[k] + wet_r) * 0.5;
            wet_r = self.right.tail[k];
        }

        let out_l = wet_l * self.wet + dry_l * self.dry;
        let out_r = wet_r * self.wet + dry_r * self.dry;
        let out_l = dither(out_l, &mut self.left.rng);
        let out_r = dither(out_r, &mut self.right.rng);
        (out_l as f32, out_r as f32)
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        let sr = f64::from(sample_rate.max(1.0));
        self.sample_rate = sr;
        self.cycle_end = ((sr / REFERENCE_RATE) as usize).clamp(1, 4);
        self.cycle = 0;
        // Delay buffers are sized to the rate; rebuild and start clean.
        self.left = PlateChannel::new(sr, self.cycle_end, 0);
        self.right = PlateChannel::new(sr, self.cycle_end, 1);
        for pair in &mut self.filters {
            pair[0].clear();
            pair[1].clear();
        }
        self.refresh();
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        for pair in &mut self.filters {
            pair[0].clear();
            pair[1].clear();
        }
        self.cycle = 0;
    }

    fn is_true_stereo(&self) -> bool {
        true
    }
}

impl ParameterInfo for PlateReverb {
    fn param_count(&self) -> usize {
        5
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            0 => Some(
                ParamDescriptor::custom("Input", "Input", 0.0, 1.0, 1.0)
                    .with_id(ParamId(1000), "plate_input"),
            ),
            1 => Some(
                ParamDescriptor::custom("Damping", "Damp", 0.0, 1.0, 0.5)
                    .with_id(ParamId(1001), "plate_damping"),
            ),
            2 => Some(
                ParamDescriptor::custom("Low Cut", "LowCut", 0.0, 1.0, 0.1)
                    .with_id(ParamId(1002), "plate_low_cut"),
            ),
            3 => Some(
                ParamDescriptor::time_ms("Predelay", "Predly", 0.0, 500.0, 10.0)
                    .with_id(ParamId(1003), "plate_predelay"),
            ),
            4 => Some(
                ParamDescriptor::custom("Dry/Wet", "DryWet", 0.0, 1.0, 0.5)
                    .with_id(ParamId(1004), "plate_blend"),
            ),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f32 {
        match index {
            0 => self.input_pad(),
            1 => self.damping(),
            2 => self.low_cut(),
            3 => self.predelay_ms(),
            4 => self.blend(),
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.set_input_pad(value),
            1 => self.set_damping(value),
            2 => self.set_low_cut(value),
            3 => self.set_predelay_ms(value),
            4 => self.set_blend(value),
            _ => {}
        }
    }
}
