use std::sync::Arc;
use std::time::Duration;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use echowalk_core::mocks::RecordingSynthesizer;
use echowalk_core::{
    AnchorId, BoundingBox, Engine, Geometry, GeometryEvent, Transform, Vec3, classify,
};
use echowalk_traits::ManualClock;

// Deterministic scatter of boxes in front of the observer.
fn scene(n: usize, seed: u32) -> Vec<(BoundingBox, Vec3)> {
    let mut state = seed.max(1);
    let mut next_f32 = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        (x as f32) / (u32::MAX as f32 + 1.0)
    };
    (0..n)
        .map(|_| {
            let (w, h, d) = (
                0.1 + next_f32() * 2.5,
                0.1 + next_f32() * 2.2,
                0.1 + next_f32() * 1.0,
            );
            let bbox = BoundingBox::new(Vec3::ZERO, Vec3::new(w, h, d));
            let pos = Vec3::new(next_f32() * 4.0 - 2.0, 0.0, -(0.2 + next_f32() * 4.0));
            (bbox, pos)
        })
        .collect()
}

fn group_settings(g: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>) {
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p echowalk_core --bench tracking
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(Duration::from_millis(ms_u64));
    }
}

pub fn bench_classify(c: &mut Criterion) {
    let mut g = c.benchmark_group("classify");
    group_settings(&mut g);
    let boxes: Vec<BoundingBox> = scene(10_000, 0xC0FFEE).into_iter().map(|(b, _)| b).collect();
    g.bench_function("classify_10k", |b| {
        b.iter(|| {
            for bbox in &boxes {
                black_box(classify(black_box(bbox)));
            }
        })
    });
    g.finish();
}

pub fn bench_motion_tick(c: &mut Criterion) {
    let mut g = c.benchmark_group("motion_tick");
    group_settings(&mut g);

    for &n in &[16usize, 128, 512] {
        let anchors = scene(n, 0x5EED ^ n as u32);
        g.bench_function(format!("anchors_{n}"), |b| {
            b.iter_batched(
                || {
                    let clock = ManualClock::new();
                    let mut e = Engine::builder()
                        .with_synthesizer(RecordingSynthesizer::default())
                        .with_clock(Arc::new(clock.clone()))
                        .build()
                        .expect("engine");
                    for (i, (bbox, pos)) in anchors.iter().enumerate() {
                        e.apply_geometry(GeometryEvent::Added(
                            AnchorId::from(format!("a{i}")),
                            Geometry::new(*bbox, Transform::from_translation(*pos)),
                        ));
                    }
                    (e, clock)
                },
                |(mut e, clock)| {
                    for _ in 0..4 {
                        clock.advance(Duration::from_millis(500));
                        e.motion_tick();
                    }
                    black_box(e.take_notices());
                },
                BatchSize::SmallInput,
            )
        });
    }
    g.finish();
}

criterion_group!(tracking, bench_classify, bench_motion_tick);
criterion_main!(tracking);
