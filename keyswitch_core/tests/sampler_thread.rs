//! Sampler worker lifecycle and the sampler-fed (paced) runner path.
//!
//! Verifies that:
//! - readings flow from the worker thread into the tick loop
//! - a sensor that stops delivering trips the stall watchdog
//! - dropping a `Sampler` stops and joins its worker without hanging

use std::sync::atomic::AtomicBool;
use std::time::Duration;

use keyswitch_core::mocks::{NoopSensor, SeqSensor, StaticLine};
use keyswitch_core::runner::run_paced;
use keyswitch_core::sampler::Sampler;
use keyswitch_core::{
    CalibrationRange, DebounceCfg, FilterCfg, SwitchCfg, SwitchError, TickReport, Timeouts,
    build_core,
};
use keyswitch_traits::clock::MonotonicClock;

fn full_scale() -> CalibrationRange {
    CalibrationRange::new(0, 1024).expect("valid range")
}

#[test]
fn sampler_delivers_readings_from_the_worker() {
    let sampler = Sampler::spawn(
        SeqSensor::new(vec![100, 200, 300]),
        1000,
        Duration::from_millis(10),
        MonotonicClock::new(),
    );

    let mut seen = None;
    for _ in 0..200 {
        if let Some(v) = sampler.latest() {
            seen = Some(v);
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    let v = seen.expect("worker should deliver a reading");
    assert!([100, 200, 300].contains(&v), "unexpected reading {v}");
}

#[test]
fn a_sensor_that_never_delivers_reads_as_stalled() {
    let sampler = Sampler::spawn(
        NoopSensor,
        1000,
        Duration::from_millis(1),
        MonotonicClock::new(),
    );

    std::thread::sleep(Duration::from_millis(20));
    assert!(sampler.latest().is_none());
    assert!(sampler.stalled_for_now() >= 10, "silence should accumulate");
}

#[test]
fn dropping_the_sampler_joins_the_worker() {
    // Repeated spawn/drop cycles hang here if the worker ever fails to
    // notice the stop flag (e.g. while parked in a full channel send)
    for _ in 0..5 {
        let sampler = Sampler::spawn(
            SeqSensor::new(vec![42]),
            200,
            Duration::from_millis(10),
            MonotonicClock::new(),
        );
        std::thread::sleep(Duration::from_millis(5));
        let _ = sampler.latest();
        drop(sampler);
    }
}

#[test]
fn sampler_shutdown_is_prompt() {
    let sampler = Sampler::spawn(
        SeqSensor::new(vec![42]),
        100,
        Duration::from_millis(20),
        MonotonicClock::new(),
    );
    std::thread::sleep(Duration::from_millis(30));

    let start = std::time::Instant::now();
    drop(sampler);
    let took = start.elapsed();
    // worst case: one in-flight read (sensor timeout) plus join overhead
    assert!(took < Duration::from_millis(200), "shutdown took {took:?}");
}

#[test]
fn paced_runner_feeds_ticks_from_the_sampler() {
    let mut core = build_core(
        NoopSensor,
        StaticLine(true),
        StaticLine(true),
        SwitchCfg::default(),
        FilterCfg {
            window: 1,
            sample_rate_hz: 500,
        },
        DebounceCfg::default(),
        Timeouts { sensor_ms: 20 },
        Some(full_scale()),
        None,
        None,
    )
    .expect("core should build");

    let shutdown = AtomicBool::new(false);
    let mut reports = Vec::new();
    run_paced(
        SeqSensor::new(vec![600]),
        500,
        &mut core,
        Some(5),
        &shutdown,
        |r| reports.push(*r),
    )
    .expect("paced run should complete");

    assert_eq!(reports.len(), 5);
    // 600 counts on the full-scale range sits past the level-20 actuation point
    assert!(matches!(
        reports.last(),
        Some(TickReport::Device {
            actuated: true,
            level: 23
        })
    ));
}

#[test]
fn stalled_sampling_aborts_with_a_timeout() {
    let mut core = build_core(
        NoopSensor,
        StaticLine(true),
        StaticLine(true),
        SwitchCfg::default(),
        FilterCfg {
            window: 1,
            sample_rate_hz: 1000,
        },
        DebounceCfg::default(),
        Timeouts { sensor_ms: 1 },
        Some(full_scale()),
        None,
        None,
    )
    .expect("core should build");

    let shutdown = AtomicBool::new(false);
    let err = run_paced(NoopSensor, 1000, &mut core, None, &shutdown, |_| {})
        .expect_err("a sensor that never delivers must trip the watchdog");
    assert!(matches!(
        err.downcast_ref::<SwitchError>(),
        Some(SwitchError::Timeout)
    ));
}
