use criterion::{Criterion, black_box, criterion_group, criterion_main};
use keyswitch_core::{ActuationEngine, CalibrationRange, Mode, SampleFilter};

fn bench_tick_path(c: &mut Criterion) {
    let range = CalibrationRange::new(37, 980).unwrap();

    c.bench_function("filter_push", |b| {
        let mut filter = SampleFilter::new(3);
        let mut raw = 0i32;
        b.iter(|| {
            raw = (raw + 97) % 1024;
            black_box(filter.push(black_box(raw)))
        });
    });

    c.bench_function("compute_level", |b| {
        let engine = ActuationEngine::new(40, 20, 10, Mode::Threshold);
        let mut raw = 0i32;
        b.iter(|| {
            raw = (raw + 97) % 1024;
            black_box(engine.compute_level(black_box(raw), Some(&range)))
        });
    });

    c.bench_function("decide_threshold", |b| {
        let mut engine = ActuationEngine::new(40, 20, 10, Mode::Threshold);
        let mut level = 0i32;
        b.iter(|| {
            level = (level + 7) % 40;
            black_box(engine.decide(black_box(level)))
        });
    });

    c.bench_function("decide_rapid_trigger", |b| {
        let mut engine = ActuationEngine::new(40, 20, 10, Mode::RapidTrigger);
        let mut level = 0i32;
        b.iter(|| {
            level = (level + 7) % 40;
            black_box(engine.decide(black_box(level)))
        });
    });
}

criterion_group!(benches, bench_tick_path);
criterion_main!(benches);
