//! Configuration types for the actuation engine.
//!
//! These are the runtime configuration structs used by `SwitchCore`.
//! They are separate from the TOML-deserialized config in `keyswitch_config`.

/// Switch geometry and policy selection.
#[derive(Debug, Clone)]
pub struct SwitchCfg {
    /// Number of discrete travel levels the calibrated range maps onto.
    pub levels: i32,
    /// Full mechanical travel of the switch in millimeters.
    pub total_travel_mm: f32,
    /// Threshold-mode actuation point in millimeters of travel.
    pub actuation_point_mm: f32,
    /// Rapid-trigger release distance in millimeters.
    pub rt_release_mm: f32,
    /// Start in rapid-trigger mode instead of fixed-threshold mode.
    pub rapid_trigger: bool,
}

impl Default for SwitchCfg {
    fn default() -> Self {
        Self {
            levels: 40,
            total_travel_mm: 4.0,
            actuation_point_mm: 2.0,
            rt_release_mm: 1.0,
            rapid_trigger: false,
        }
    }
}

/// Filter configuration for signal conditioning.
#[derive(Debug, Clone)]
pub struct FilterCfg {
    /// Moving average window size in samples.
    pub window: usize,
    /// Sampling rate in Hz; drives the loop period.
    pub sample_rate_hz: u32,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            window: 3,
            sample_rate_hz: 1000,
        }
    }
}

/// Button debounce configuration shared by the mode and calibration lines.
#[derive(Debug, Clone)]
pub struct DebounceCfg {
    /// Minimum spacing between accepted toggles (ms).
    pub debounce_ms: u64,
    /// Treat low level as pressed when true (pull-up wiring).
    pub active_low: bool,
}

impl Default for DebounceCfg {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            active_low: true,
        }
    }
}

/// Timeouts and watchdogs.
#[derive(Debug, Clone)]
pub struct Timeouts {
    /// Max sensor wait per read (ms).
    pub sensor_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { sensor_ms: 50 }
    }
}
