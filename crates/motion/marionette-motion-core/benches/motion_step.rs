//! Per-frame manager update benchmarks

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use marionette_motion_core::{
    decode_segments, CurveTarget, Motion, MotionCurve, MotionManager, ParameterTable,
};

/// A looping motion with one bezier/linear/stepped chain per parameter.
fn mk_rig(curves: usize) -> (ParameterTable, Motion) {
    let mut store = ParameterTable::new();
    let mut motion = Motion::new(4.0).with_loop(true).with_fades(0.5, 0.5);
    for i in 0..curves {
        let name = format!("Param{i}");
        let handle = store.add_parameter(&name, -30.0, 30.0, 0.0);
        let phase = i as f32 * 0.1;
        let flat = [
            0.0, 0.0, //
            1.0, 0.5, 10.0 + phase, 1.0, 20.0, 1.5, 15.0, //
            0.0, 3.0, -10.0, //
            2.0, 4.0, 0.0,
        ];
        let segments = decode_segments(&name, &flat).expect("bench segments decode");
        motion = motion.with_curve(MotionCurve::new(CurveTarget::Parameter(handle), segments));
    }
    (store, motion)
}

fn bench_manager_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("manager_update");

    for curves in [16, 64, 256] {
        let (mut store, motion) = mk_rig(curves);
        let motion = Arc::new(motion);
        let mut manager = MotionManager::default();
        manager.start_motion(motion.clone(), true);
        manager.start_motion(motion, true);

        group.throughput(Throughput::Elements((curves * 2) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(curves), &curves, |b, _| {
            b.iter(|| {
                manager
                    .update(black_box(&mut store), black_box(1.0 / 60.0))
                    .expect("update");
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_manager_update);
criterion_main!(benches);
