#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration persistence for the key-switch engine.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - A committed calibration range can be persisted to its own TOML file
//!   and loaded back at startup, written with a temp-file + rename swap.
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// ADC channel the Hall sensor is wired to (MCP3008: 0..=7)
    pub adc_channel: u8,
    /// GPIO pin of the rapid-trigger mode button, if fitted
    pub mode_button: Option<u8>,
    /// GPIO pin of the calibration button, if fitted
    pub cal_button: Option<u8>,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            adc_channel: 0,
            mode_button: None,
            cal_button: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Switch {
    /// Number of discrete travel levels the raw range maps onto
    pub levels: i32,
    /// Full mechanical travel of the switch in millimeters
    pub total_travel_mm: f32,
    /// Threshold-mode actuation point in millimeters of travel
    pub actuation_point_mm: f32,
    /// Rapid-trigger release distance in millimeters
    pub rt_release_mm: f32,
    /// Start in rapid-trigger mode instead of fixed-threshold mode
    pub rapid_trigger: bool,
    /// Native ADC range; used as the default calibration span before the
    /// first calibration pass commits a measured one
    pub adc_range: i32,
}

impl Default for Switch {
    fn default() -> Self {
        Self {
            levels: 40,
            total_travel_mm: 4.0,
            actuation_point_mm: 2.0,
            rt_release_mm: 1.0,
            rapid_trigger: false,
            adc_range: 1024,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Filter {
    /// Moving-average window in samples
    pub window: usize,
    pub sample_rate_hz: u32,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            window: 3,
            sample_rate_hz: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Debounce {
    /// Minimum spacing between accepted button toggles (ms)
    pub debounce_ms: u64,
    /// Treat low level as pressed when true (pull-up wiring)
    pub active_low: bool,
}

impl Default for Debounce {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            active_low: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// Max time to wait for one ADC conversion before failing
    pub sensor_read_timeout_ms: u64,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            sensor_read_timeout_ms: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Sampler,
    Direct,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Runner {
    /// Default orchestration mode: "sampler" (rate-paced thread) or "direct"
    pub mode: RunMode,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub switch: Switch,
    pub filter: Filter,
    pub debounce: Debounce,
    pub logging: Logging,
    pub hardware: Hardware,
    pub runner: Runner,
    /// Optional persisted calibration range; preferred at runtime over the
    /// full-ADC default when present.
    pub calibration: Option<PersistedRange>,
}

/// Committed calibration window in raw ADC counts.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PersistedRange {
    pub read_min: i32,
    pub read_max: i32,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Load the persisted calibration range from its own TOML file.
pub fn load_range(path: &std::path::Path) -> eyre::Result<PersistedRange> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read calibration file {:?}: {}", path, e))?;
    let range: PersistedRange = toml::from_str(&text)
        .map_err(|e| eyre::eyre!("parse calibration file {:?}: {}", path, e))?;
    validate_range(&range)?;
    Ok(range)
}

/// Persist a calibration range, replacing any previous file atomically so a
/// crash mid-write never leaves a truncated file behind.
pub fn save_range(path: &std::path::Path, range: &PersistedRange) -> eyre::Result<()> {
    validate_range(range)?;
    let text = toml::to_string(range)
        .map_err(|e| eyre::eyre!("serialize calibration range: {}", e))?;
    write_atomic(path, text.as_bytes())
        .map_err(|e| eyre::eyre!("write calibration file {:?}: {}", path, e))
}

fn write_atomic(path: &std::path::Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    let tmp = path.with_extension("new");
    {
        let mut f = std::fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(tmp, path)
}

fn validate_range(range: &PersistedRange) -> eyre::Result<()> {
    if range.read_max <= range.read_min {
        eyre::bail!(
            "calibration range must satisfy read_max > read_min, got {}..{}",
            range.read_min,
            range.read_max
        );
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Switch geometry
        if self.switch.levels < 2 {
            eyre::bail!("switch.levels must be >= 2");
        }
        if !(self.switch.total_travel_mm.is_finite() && self.switch.total_travel_mm > 0.0) {
            eyre::bail!("switch.total_travel_mm must be finite and > 0");
        }
        if !(self.switch.actuation_point_mm.is_finite() && self.switch.actuation_point_mm > 0.0) {
            eyre::bail!("switch.actuation_point_mm must be finite and > 0");
        }
        if self.switch.actuation_point_mm >= self.switch.total_travel_mm {
            eyre::bail!("switch.actuation_point_mm must be below switch.total_travel_mm");
        }
        if !(self.switch.rt_release_mm.is_finite() && self.switch.rt_release_mm > 0.0) {
            eyre::bail!("switch.rt_release_mm must be finite and > 0");
        }
        if self.switch.adc_range < 2 {
            eyre::bail!("switch.adc_range must be >= 2");
        }

        // Filter
        if self.filter.window == 0 {
            eyre::bail!("filter.window must be >= 1");
        }
        if self.filter.sample_rate_hz == 0 {
            eyre::bail!("filter.sample_rate_hz must be > 0");
        }

        // Debounce
        if self.debounce.debounce_ms == 0 {
            eyre::bail!("debounce.debounce_ms must be >= 1");
        }
        if self.debounce.debounce_ms > 5_000 {
            eyre::bail!("debounce.debounce_ms is unreasonably large (>5s)");
        }

        // Hardware
        if self.hardware.sensor_read_timeout_ms == 0 {
            eyre::bail!("hardware.sensor_read_timeout_ms must be >= 1");
        }

        // Pins
        if self.pins.adc_channel > 7 {
            eyre::bail!("pins.adc_channel must be in 0..=7");
        }

        // Persisted calibration
        if let Some(range) = &self.calibration {
            validate_range(range)?;
        }

        // Logging
        if let Some(rotation) = &self.logging.rotation {
            match rotation.as_str() {
                "never" | "daily" | "hourly" => {}
                other => eyre::bail!(
                    "logging.rotation must be one of never|daily|hourly, got {other:?}"
                ),
            }
        }

        Ok(())
    }
}
