use keyswitch_core::{
    ActuationEngine, CalibrationRange, DebouncedToggle, Mode, SampleFilter,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn level_always_lands_on_the_scale(
        filtered in i32::MIN / 2..i32::MAX / 2,
        read_min in -10_000i32..10_000,
        span in 1i32..100_000,
    ) {
        let range = CalibrationRange::new(read_min, read_min + span)
            .expect("span is positive by construction");
        let engine = ActuationEngine::new(40, 20, 10, Mode::Threshold);
        let level = engine.compute_level(filtered, Some(&range));
        prop_assert!((0..40).contains(&level));
    }

    #[test]
    fn threshold_decision_is_stateless(levels in proptest::collection::vec(0i32..40, 1..64)) {
        let mut engine = ActuationEngine::new(40, 20, 10, Mode::Threshold);
        for level in levels {
            let actuated = engine.decide(level);
            prop_assert_eq!(actuated, level >= 20);
        }
    }

    #[test]
    fn rapid_trigger_never_holds_at_full_release(
        levels in proptest::collection::vec(0i32..40, 1..64),
    ) {
        let mut engine = ActuationEngine::new(40, 20, 10, Mode::RapidTrigger);
        for level in levels {
            let actuated = engine.decide(level);
            if level == 0 {
                prop_assert!(!actuated, "level 0 must always release");
            }
        }
    }

    #[test]
    fn filter_output_stays_within_observed_bounds(
        window in 1usize..8,
        samples in proptest::collection::vec(0i32..=1023, 1..64),
    ) {
        let mut filter = SampleFilter::new(window);
        let mut hi = 0i32; // zero-filled slots count as observed zeros
        for s in samples {
            hi = hi.max(s);
            let out = filter.push(s);
            prop_assert!((0..=hi).contains(&out), "out {out} not in 0..={hi}");
        }
    }

    #[test]
    fn accepted_toggles_are_spaced_by_the_window(
        window in 1u64..500,
        gaps in proptest::collection::vec(0u64..200, 1..64),
    ) {
        let mut gate = DebouncedToggle::new(window);
        let mut now = 0u64;
        let mut last_accept: Option<u64> = None;
        for gap in gaps {
            now += gap;
            if gate.accept(now, true) {
                if let Some(prev) = last_accept {
                    prop_assert!(now - prev >= window);
                }
                last_accept = Some(now);
            }
        }
    }
}
