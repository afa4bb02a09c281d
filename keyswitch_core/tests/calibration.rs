use keyswitch_core::{CalState, CalibrationController, CalibrationRange};

#[test]
fn toggle_enters_a_pass_seeded_from_the_current_sample() {
    let mut cal = CalibrationController::new();
    assert_eq!(cal.state(), CalState::Idle);
    assert_eq!(cal.toggle(512), CalState::Calibrating);
    assert!(cal.is_calibrating());
    // read_min seeds from the sample at toggle time, read_max from zero
    assert_eq!(cal.window(), (512, 0));
}

#[test]
fn observed_extremes_commit_as_the_range_on_exit() {
    let mut cal = CalibrationController::new();
    cal.toggle(50);
    cal.observe(50);
    cal.observe(900);
    cal.observe(300);
    assert_eq!(cal.window(), (50, 900));
    assert_eq!(cal.toggle(300), CalState::Idle);
    let range = cal.range().copied().expect("range should be committed");
    assert_eq!(range.read_min, 50);
    assert_eq!(range.read_max, 900);
    assert_eq!(range.span, 850);
    assert_eq!(cal.span(), Some(850));
}

#[test]
fn observe_tracks_below_the_seed() {
    let mut cal = CalibrationController::new();
    cal.toggle(800);
    cal.observe(100);
    cal.observe(950);
    assert_eq!(cal.window(), (100, 950));
}

#[test]
fn observe_is_a_noop_while_idle() {
    let mut cal = CalibrationController::new();
    cal.observe(700);
    assert_eq!(cal.window(), (0, 0));
    assert!(cal.range().is_none());
}

#[test]
fn an_empty_pass_keeps_the_previous_range() {
    let previous = CalibrationRange::new(10, 900).expect("valid range");
    let mut cal = CalibrationController::with_range(previous);
    // Seed 500, never observe anything above zero: window is 500..0
    cal.toggle(500);
    cal.toggle(500);
    assert_eq!(cal.range(), Some(&previous));
}

#[test]
fn an_empty_pass_with_no_history_stays_uncalibrated() {
    let mut cal = CalibrationController::new();
    cal.toggle(500);
    cal.toggle(500);
    assert!(cal.range().is_none());
    assert!(cal.span().is_none());
}

#[test]
fn a_fresh_pass_replaces_the_preloaded_range() {
    let preload = CalibrationRange::new(0, 1024).expect("valid range");
    let mut cal = CalibrationController::with_range(preload);
    cal.toggle(60);
    cal.observe(60);
    cal.observe(980);
    cal.toggle(400);
    assert_eq!(cal.span(), Some(920));
}

#[test]
fn range_constructor_rejects_empty_spans() {
    assert!(CalibrationRange::new(100, 100).is_none());
    assert!(CalibrationRange::new(900, 100).is_none());
    assert!(CalibrationRange::new(100, 101).is_some());
}
