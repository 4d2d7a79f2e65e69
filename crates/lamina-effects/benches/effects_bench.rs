//! Benchmarks for the engines, plate first — it is the one with a real
//! per-sample cost budget.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lamina_core::{Effect, EffectExt};
use lamina_effects::{CabinetSim, PlateReverb, TubeAmp};

fn bench_plate(c: &mut Criterion) {
    let mut plate = PlateReverb::new(48_000.0);
    plate.set_blend(1.0);
    plate.reset();
    c.bench_function("plate_process_stereo", |b| {
        b.iter(|| black_box(plate.process_stereo(black_box(0.25), black_box(-0.25))));
    });

    let mut plate_hi = PlateReverb::new(96_000.0);
    plate_hi.set_blend(1.0);
    plate_hi.reset();
    c.bench_function("plate_process_stereo_96k", |b| {
        b.iter(|| black_box(plate_hi.process_stereo(black_box(0.25), black_box(-0.25))));
    });
}

fn bench_plate_block(c: &mut Criterion) {
    let mut plate = PlateReverb::new(48_000.0);
    plate.set_blend(1.0);
    plate.reset();
    let mut left = [0.1_f32; 512];
    let mut right = [-0.1_f32; 512];
    c.bench_function("plate_block_512", |b| {
        b.iter(|| {
            plate.process_stereo_block(black_box(&mut left), black_box(&mut right));
        });
    });
}

fn bench_amp_cab_rig(c: &mut Criterion) {
    let mut rig = TubeAmp::new(48_000.0).chain(CabinetSim::new(48_000.0));
    c.bench_function("amp_cab_rig", |b| {
        b.iter(|| black_box(rig.process(black_box(0.4))));
    });
}

criterion_group!(benches, bench_plate, bench_plate_block, bench_amp_cab_rig);
criterion_main!(benches);
