//! `From` implementations bridging `keyswitch_config` types to
//! `keyswitch_core` types.
//!
//! These eliminate manual field-by-field mapping in the CLI.

use crate::calibration::CalibrationRange;
use crate::config::{DebounceCfg, FilterCfg, SwitchCfg, Timeouts};

// ── SwitchCfg ────────────────────────────────────────────────────────────────

impl From<&keyswitch_config::Switch> for SwitchCfg {
    fn from(c: &keyswitch_config::Switch) -> Self {
        Self {
            levels: c.levels,
            total_travel_mm: c.total_travel_mm,
            actuation_point_mm: c.actuation_point_mm,
            rt_release_mm: c.rt_release_mm,
            rapid_trigger: c.rapid_trigger,
        }
    }
}

// ── FilterCfg ────────────────────────────────────────────────────────────────

impl From<&keyswitch_config::Filter> for FilterCfg {
    fn from(c: &keyswitch_config::Filter) -> Self {
        Self {
            window: c.window,
            sample_rate_hz: c.sample_rate_hz,
        }
    }
}

// ── DebounceCfg ──────────────────────────────────────────────────────────────

impl From<&keyswitch_config::Debounce> for DebounceCfg {
    fn from(c: &keyswitch_config::Debounce) -> Self {
        Self {
            debounce_ms: c.debounce_ms,
            active_low: c.active_low,
        }
    }
}

// ── Timeouts ─────────────────────────────────────────────────────────────────

impl From<&keyswitch_config::Hardware> for Timeouts {
    fn from(c: &keyswitch_config::Hardware) -> Self {
        Self {
            sensor_ms: c.sensor_read_timeout_ms,
        }
    }
}

// ── CalibrationRange ─────────────────────────────────────────────────────────

impl TryFrom<&keyswitch_config::PersistedRange> for CalibrationRange {
    type Error = eyre::Report;

    fn try_from(c: &keyswitch_config::PersistedRange) -> Result<Self, Self::Error> {
        Self::new(c.read_min, c.read_max).ok_or_else(|| {
            eyre::eyre!(
                "persisted calibration range has no span: {}..{}",
                c.read_min,
                c.read_max
            )
        })
    }
}

impl From<&CalibrationRange> for keyswitch_config::PersistedRange {
    fn from(r: &CalibrationRange) -> Self {
        Self {
            read_min: r.read_min,
            read_max: r.read_max,
        }
    }
}
