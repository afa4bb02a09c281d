//! End-to-end tick loop behavior through `SwitchCore` and the builders.

use std::time::Duration;

use keyswitch_core::mocks::{ManualClock, NoopSensor, SeqSensor, SharedLine, StaticLine};
use keyswitch_core::{
    BuildError, CalibrationRange, DebounceCfg, FilterCfg, KeySwitch, Mode, SwitchCfg, TickReport,
    Timeouts, ToggleFlag, build_core,
};

fn full_scale() -> CalibrationRange {
    CalibrationRange::new(0, 1024).expect("valid range")
}

#[test]
fn deep_press_actuates_after_filter_warmup() {
    let mut core = build_core(
        NoopSensor,
        StaticLine(true),
        StaticLine(true),
        SwitchCfg::default(),
        FilterCfg::default(),
        DebounceCfg::default(),
        Timeouts::default(),
        Some(full_scale()),
        None,
        None,
    )
    .expect("core should build");
    core.begin();

    // 600 counts maps to level 23, past the level-20 actuation point,
    // but the zero-filled window needs to fill first
    let r1 = core.tick_from_raw(600).expect("tick");
    assert_eq!(r1, TickReport::Device { actuated: false, level: 7 });
    core.tick_from_raw(600).expect("tick");
    let r3 = core.tick_from_raw(600).expect("tick");
    assert_eq!(r3, TickReport::Device { actuated: true, level: 23 });
    assert_eq!(core.last_level(), 23);
}

#[test]
fn uncalibrated_switch_fails_closed() {
    let mut core = build_core(
        NoopSensor,
        StaticLine(true),
        StaticLine(true),
        SwitchCfg::default(),
        FilterCfg { window: 1, sample_rate_hz: 1000 },
        DebounceCfg::default(),
        Timeouts::default(),
        None,
        None,
        None,
    )
    .expect("core should build");
    core.begin();

    for raw in [0, 512, 1023, 5000] {
        let report = core.tick_from_raw(raw).expect("tick");
        assert_eq!(report, TickReport::Device { actuated: false, level: 0 });
    }
}

#[test]
fn calibration_pass_reports_the_window_then_resumes_actuation() {
    let clock = ManualClock::new();
    let cal_line = SharedLine::new(false); // held pressed (active low)
    let cal_flag = ToggleFlag::new();
    let mut core = build_core(
        NoopSensor,
        StaticLine(true),
        cal_line,
        SwitchCfg::default(),
        FilterCfg { window: 1, sample_rate_hz: 1000 },
        DebounceCfg::default(),
        Timeouts::default(),
        None,
        Some((ToggleFlag::new(), cal_flag.clone())),
        Some(Box::new(clock.clone())),
    )
    .expect("core should build");
    core.begin();

    cal_flag.raise();
    let r = core.tick_from_raw(500).expect("tick");
    assert!(core.is_calibrating());
    assert_eq!(r, TickReport::Calibration { read_min: 500, read_max: 500 });

    let r = core.tick_from_raw(100).expect("tick");
    assert_eq!(r, TickReport::Calibration { read_min: 100, read_max: 500 });
    let r = core.tick_from_raw(900).expect("tick");
    assert_eq!(r, TickReport::Calibration { read_min: 100, read_max: 900 });

    // End the pass after the debounce window; actuation resumes on the
    // same tick using the committed range
    clock.advance(Duration::from_millis(150));
    cal_flag.raise();
    let r = core.tick_from_raw(900).expect("tick");
    assert!(!core.is_calibrating());
    let range = core.range().copied().expect("committed range");
    assert_eq!((range.read_min, range.read_max, range.span), (100, 900, 800));
    // (900 - 100) * 40 / 800 = 40, clamped to 39
    assert_eq!(r, TickReport::Device { actuated: true, level: 39 });
}

#[test]
fn sensor_errors_surface_with_context() {
    let mut core = build_core(
        NoopSensor,
        StaticLine(true),
        StaticLine(true),
        SwitchCfg::default(),
        FilterCfg::default(),
        DebounceCfg::default(),
        Timeouts::default(),
        Some(full_scale()),
        None,
        None,
    )
    .expect("core should build");
    core.begin();

    let err = core.tick().expect_err("noop sensor must fail");
    assert!(format!("{err:#}").contains("reading sensor"));
}

#[test]
fn begin_clears_stroke_state_but_keeps_mode_and_range() {
    let mut core = build_core(
        NoopSensor,
        StaticLine(true),
        StaticLine(true),
        SwitchCfg {
            rapid_trigger: true,
            ..SwitchCfg::default()
        },
        FilterCfg { window: 1, sample_rate_hz: 1000 },
        DebounceCfg::default(),
        Timeouts::default(),
        Some(full_scale()),
        None,
        None,
    )
    .expect("core should build");
    core.begin();

    // Press deep, then begin() a fresh run
    let r = core.tick_from_raw(900).expect("tick");
    assert!(matches!(r, TickReport::Device { actuated: true, .. }));
    core.begin();

    assert_eq!(core.mode(), Mode::RapidTrigger);
    assert!(core.range().is_some());
    assert_eq!(core.last_level(), 0);
    // The old stroke peak is gone: a shallow press actuates
    let r = core.tick_from_raw(150).expect("tick");
    assert!(matches!(r, TickReport::Device { actuated: true, .. }));
}

#[test]
fn dynamic_builder_builds_and_ticks() {
    let mut switch = KeySwitch::builder()
        .with_sensor(SeqSensor::new(vec![600, 600, 600]))
        .with_mode_line(StaticLine(true))
        .with_cal_line(StaticLine(true))
        .with_filter(FilterCfg { window: 1, sample_rate_hz: 1000 })
        .with_range(full_scale())
        .build()
        .expect("switch should build");
    switch.begin();

    let report = switch.tick().expect("tick");
    assert_eq!(report, TickReport::Device { actuated: true, level: 23 });
    assert_eq!(switch.mode(), Mode::Threshold);
}

#[test]
fn try_build_names_the_missing_piece() {
    let err = KeySwitch::builder().try_build().expect_err("no sensor");
    assert!(err.downcast_ref::<BuildError>().is_some());
    assert!(err.to_string().contains("missing sensor"));

    let err = KeySwitch::builder()
        .with_sensor(NoopSensor)
        .try_build()
        .expect_err("no mode line");
    assert!(err.to_string().contains("missing mode line"));

    let err = KeySwitch::builder()
        .with_sensor(NoopSensor)
        .with_mode_line(StaticLine(true))
        .try_build()
        .expect_err("no calibration line");
    assert!(err.to_string().contains("missing calibration line"));
}

#[test]
fn builder_rejects_broken_geometry() {
    let err = KeySwitch::builder()
        .with_sensor(NoopSensor)
        .with_mode_line(StaticLine(true))
        .with_cal_line(StaticLine(true))
        .with_switch(SwitchCfg {
            levels: 1,
            ..SwitchCfg::default()
        })
        .build()
        .expect_err("one level cannot work");
    assert!(err.to_string().contains("levels must be >= 2"));

    let err = KeySwitch::builder()
        .with_sensor(NoopSensor)
        .with_mode_line(StaticLine(true))
        .with_cal_line(StaticLine(true))
        .with_switch(SwitchCfg {
            actuation_point_mm: 4.0,
            ..SwitchCfg::default()
        })
        .build()
        .expect_err("actuation at full travel is unreachable");
    assert!(err.to_string().contains("below full travel"));

    let err = KeySwitch::builder()
        .with_sensor(NoopSensor)
        .with_mode_line(StaticLine(true))
        .with_cal_line(StaticLine(true))
        .with_switch(SwitchCfg {
            rt_release_mm: 0.01,
            ..SwitchCfg::default()
        })
        .build()
        .expect_err("release below resolution");
    assert!(err.to_string().contains("release below level resolution"));
}

#[test]
fn mode_starts_from_config() {
    let switch = KeySwitch::builder()
        .with_sensor(NoopSensor)
        .with_mode_line(StaticLine(true))
        .with_cal_line(StaticLine(true))
        .with_switch(SwitchCfg {
            rapid_trigger: true,
            ..SwitchCfg::default()
        })
        .build()
        .expect("switch should build");
    assert_eq!(switch.mode(), Mode::RapidTrigger);
}
