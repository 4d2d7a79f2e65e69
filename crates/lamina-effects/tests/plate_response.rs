//! Black-box verification of the plate reverb's contract: dry passthrough,
//! boundedness, decay stability, rate invariance of the tail, reset
//! behavior, and cross-channel diffusion of a one-sided impulse.

use lamina_core::Effect;
use lamina_effects::PlateReverb;

/// Build a full-wet plate, let the recovery-only gain trackers reach
/// unity on moderate program material, then drain the tail to silence.
fn warmed_plate(rate: f32, damping: f32) -> PlateReverb {
    let mut plate = PlateReverb::new(rate);
    plate.set_blend(1.0);
    plate.set_predelay_ms(0.0);
    plate.set_damping(damping);
    plate.reset();

    let warm = (rate * 0.2) as usize;
    for i in 0..warm {
        let x = libm::sinf(i as f32 * 0.05) * 0.4;
        plate.process_stereo(x, x);
    }
    let drain = (rate * 1.5) as usize;
    for _ in 0..drain {
        plate.process_stereo(0.0, 0.0);
    }
    plate
}

/// RMS over consecutive windows of the summed stereo energy.
fn windowed_rms(samples: &[(f32, f32)], window: usize) -> Vec<f64> {
    samples
        .chunks(window)
        .filter(|c| c.len() == window)
        .map(|c| {
            let sum: f64 = c
                .iter()
                .map(|&(l, r)| f64::from(l) * f64::from(l) + f64::from(r) * f64::from(r))
                .sum();
            libm::sqrt(sum / (2.0 * c.len() as f64))
        })
        .collect()
}

#[test]
fn dry_passthrough_within_dither_epsilon() {
    for rate in [44_100.0, 48_000.0, 96_000.0] {
        let mut plate = PlateReverb::new(rate);
        plate.set_blend(0.0); // wet 0, dry 1
        plate.set_damping(0.2);
        plate.set_low_cut(0.9);
        plate.set_predelay_ms(250.0);
        plate.reset();

        let mut x = 0.3_f64;
        for i in 0..10_000 {
            x = (x * 1103.515_245 + 0.12345) % 1.0;
            let input = (x * 2.0 - 1.0) as f32;
            let (l, r) = plate.process_stereo(input, -input);
            assert!(
                (l - input).abs() < 2e-7,
                "rate {rate}: left deviated at {i}: {l} vs {input}"
            );
            assert!(
                (r + input).abs() < 2e-7,
                "rate {rate}: right deviated at {i}: {r} vs {}",
                -input
            );
        }
    }
}

#[test]
fn bounded_for_full_scale_input() {
    let mut plate = warmed_plate(48_000.0, 0.0);
    plate.set_blend(0.5); // wet and dry both at unity
    let mut x = 0.7_f64;
    for _ in 0..20_000 {
        x = (x * 1103.515_245 + 0.12345) % 1.0;
        let input = (x * 2.0 - 1.0) as f32;
        let (l, r) = plate.process_stereo(input, input);
        assert!(l.is_finite() && r.is_finite());
        assert!(l.abs() < 4.0 && r.abs() < 4.0, "unbounded: {l} {r}");
    }
}

#[test]
fn impulse_decay_is_non_increasing() {
    let mut plate = warmed_plate(44_100.0, 0.0);
    let regen = plate.regen();
    assert!(regen > 0.0 && regen < 0.05, "regen out of band: {regen}");

    plate.process_stereo(1.0, 1.0);
    let mut tail = Vec::with_capacity(44_100);
    for _ in 0..44_100 {
        tail.push(plate.process_stereo(0.0, 0.0));
    }

    // Skip the diffusion build-up, then demand monotone decay down to the
    // noise floor.
    let rms = windowed_rms(&tail[8192..], 4096);
    for pair in rms.windows(2) {
        assert!(
            pair[1] <= pair[0] * 1.1 + 2e-7,
            "energy grew: {} -> {}",
            pair[0],
            pair[1]
        );
    }
    let first = rms.first().copied().unwrap();
    let last = rms.last().copied().unwrap();
    assert!(last < first * 0.01 + 2e-7, "tail never decayed: {first} -> {last}");
}

/// Time in seconds for the windowed RMS to fall 60 dB below its peak.
fn decay_time_seconds(rate: f32) -> f64 {
    let mut plate = warmed_plate(rate, 0.0);
    plate.process_stereo(1.0, 1.0);

    let total = (rate * 2.0) as usize;
    let mut tail = Vec::with_capacity(total);
    for _ in 0..total {
        tail.push(plate.process_stereo(0.0, 0.0));
    }

    let window = (rate / 200.0) as usize; // 5 ms windows
    let rms = windowed_rms(&tail, window);
    let (peak_idx, peak) = rms
        .iter()
        .enumerate()
        .fold((0, 0.0_f64), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });
    let threshold = peak * 1e-3; // -60 dB
    let idx = rms
        .iter()
        .enumerate()
        .skip(peak_idx)
        .find(|&(_, &v)| v < threshold)
        .map_or(rms.len(), |(i, _)| i);
    (idx - peak_idx) as f64 * window as f64 / f64::from(rate)
}

#[test]
fn decay_time_is_rate_invariant() {
    let times: Vec<f64> = [44_100.0, 48_000.0, 88_200.0, 96_000.0]
        .into_iter()
        .map(decay_time_seconds)
        .collect();
    let min = times.iter().copied().fold(f64::INFINITY, f64::min);
    let max = times.iter().copied().fold(0.0_f64, f64::max);
    assert!(min > 0.0, "no measurable tail: {times:?}");
    assert!(
        max / min < 1.12,
        "decay time varies with host rate: {times:?}"
    );
}

#[test]
fn reset_then_silence_stays_silent() {
    for rate in [44_100.0_f32, 96_000.0] {
        let mut plate = PlateReverb::new(rate);
        plate.set_blend(0.5);
        plate.reset();

        // Longer than the longest delay line (the 0.5 s predelay buffer).
        let span = (rate * 0.75) as usize;
        for i in 0..span {
            let (l, r) = plate.process_stereo(0.0, 0.0);
            assert!(
                l.abs() < 2e-7 && r.abs() < 2e-7,
                "rate {rate}: residue at {i}: {l} {r}"
            );
        }
    }
}

#[test]
fn one_sided_impulse_diffuses_to_both_channels() {
    let mut plate = warmed_plate(44_100.0, 0.5);

    plate.process_stereo(1.0, 0.0);
    let mut peak_l = 0.0_f32;
    let mut peak_r = 0.0_f32;
    for _ in 0..1200 {
        let (l, r) = plate.process_stereo(0.0, 0.0);
        peak_l = peak_l.max(l.abs());
        peak_r = peak_r.max(r.abs());
    }
    assert!(peak_l > 1e-4, "no left burst within 1200 samples: {peak_l}");
    assert!(peak_r > 1e-4, "no right burst within 1200 samples: {peak_r}");
}

#[test]
fn predelay_gates_the_onset() {
    let rate = 44_100.0_f32;
    let mut plate = warmed_plate(rate, 0.5);
    plate.set_predelay_ms(100.0);

    plate.process_stereo(1.0, 1.0);
    let predelay_samples = (rate * 0.1) as usize;
    let mut pre_peak = 0.0_f32;
    for _ in 0..predelay_samples - 100 {
        let (l, r) = plate.process_stereo(0.0, 0.0);
        pre_peak = pre_peak.max(l.abs()).max(r.abs());
    }
    assert!(pre_peak < 1e-5, "leak before predelay elapsed: {pre_peak}");

    let mut post_peak = 0.0_f32;
    for _ in 0..4000 {
        let (l, r) = plate.process_stereo(0.0, 0.0);
        post_peak = post_peak.max(l.abs()).max(r.abs());
    }
    assert!(post_peak > 1e-4, "no burst after predelay: {post_peak}");
}

#[test]
fn sample_rate_change_rebuilds_cleanly() {
    let mut plate = PlateReverb::new(44_100.0);
    plate.set_blend(1.0);
    for i in 0..5000 {
        plate.process_stereo(libm::sinf(i as f32 * 0.1), 0.0);
    }
    plate.set_sample_rate(96_000.0);
    assert_eq!(plate.cycle_end(), 2);
    // Fresh buffers: silence in, silence out.
    for i in 0..10_000 {
        let (l, r) = plate.process_stereo(0.0, 0.0);
        assert!(
            l.abs() < 2e-7 && r.abs() < 2e-7,
            "stale state after rate change at {i}: {l} {r}"
        );
    }
}
