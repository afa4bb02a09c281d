//! The per-switch tick loop (`SwitchCore`).
//!
//! Contains the state machine that drives each iteration: sample filtering,
//! consumption of interrupt-raised toggle flags with debounce, calibration
//! observation, and the actuation decision.

use std::sync::Arc;
use std::time::{Duration, Instant};

use eyre::WrapErr;
use keyswitch_traits::clock::Clock;
use keyswitch_traits::{AnalogSensor, InputLine, ToggleFlag};

use crate::calibration::{CalibrationController, CalibrationRange};
use crate::engine::{ActuationEngine, Mode};
use crate::error::Result;
use crate::filter::SampleFilter;
use crate::hw_error::map_hw_error;
use crate::status::TickReport;
use crate::toggle::DebouncedToggle;

/// Unified core for both dynamic (boxed) and generic (static dispatch) variants.
pub struct SwitchCore<A: AnalogSensor, R: InputLine, C: InputLine> {
    pub(crate) sensor: A,
    pub(crate) mode_line: R,
    pub(crate) cal_line: C,
    pub(crate) filter: SampleFilter,
    pub(crate) calib: CalibrationController,
    pub(crate) engine: ActuationEngine,
    pub(crate) mode_flag: ToggleFlag,
    pub(crate) cal_flag: ToggleFlag,
    pub(crate) mode_debounce: DebouncedToggle,
    pub(crate) cal_debounce: DebouncedToggle,
    pub(crate) active_low: bool,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) sensor_timeout: Duration,
    pub(crate) period_us: u64,
    pub(crate) last_level: i32,
}

impl<A: AnalogSensor, R: InputLine, C: InputLine> core::fmt::Debug for SwitchCore<A, R, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SwitchCore")
            .field("mode", &self.engine.mode())
            .field("calibrating", &self.calib.is_calibrating())
            .field("last_level", &self.last_level)
            .field("actuated", &self.engine.is_actuated())
            .finish()
    }
}

impl<A: AnalogSensor, R: InputLine, C: InputLine> SwitchCore<A, R, C> {
    /// One iteration of the switch loop (reads the sensor internally).
    pub fn tick(&mut self) -> Result<TickReport> {
        let raw = self
            .sensor
            .read(self.sensor_timeout)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading sensor")?;
        self.tick_from_raw(raw)
    }

    /// Process a pre-sampled raw reading (for sampler integration).
    pub fn tick_from_raw(&mut self, raw: i32) -> Result<TickReport> {
        let filtered = self.filter.push(raw);
        let now = self.clock.ms_since(self.epoch);
        self.consume_toggles(now, raw)?;

        if self.calib.is_calibrating() {
            self.calib.observe(raw);
            let (read_min, read_max) = self.calib.window();
            tracing::trace!(raw, read_min, read_max, "calibration sample");
            return Ok(TickReport::Calibration { read_min, read_max });
        }

        let level = self.engine.compute_level(filtered, self.calib.range());
        self.last_level = level;
        let actuated = self.engine.decide(level);
        tracing::trace!(raw, filtered, level, actuated, "tick");
        Ok(TickReport::Device { actuated, level })
    }

    /// Reset per-run state. Call before entering the loop.
    ///
    /// The committed calibration range and the selected mode survive; the
    /// filter warm-up, debounce windows, and rapid-trigger stroke state do
    /// not.
    pub fn begin(&mut self) {
        self.epoch = self.clock.now();
        self.filter.reset();
        self.mode_debounce.reset();
        self.cal_debounce.reset();
        self.engine.reset();
        self.last_level = 0;
    }

    /// Current actuation policy.
    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    /// Select a policy directly (clears rapid-trigger stroke state).
    pub fn set_mode(&mut self, mode: Mode) {
        self.engine.set_mode(mode);
    }

    pub fn is_calibrating(&self) -> bool {
        self.calib.is_calibrating()
    }

    /// Committed calibration range, if any.
    pub fn range(&self) -> Option<&CalibrationRange> {
        self.calib.range()
    }

    /// Level computed on the most recent device tick.
    pub fn last_level(&self) -> i32 {
        self.last_level
    }

    pub fn period_us(&self) -> u64 {
        self.period_us
    }

    /// Handle to raise mode-toggle requests from an interrupt callback.
    pub fn mode_flag(&self) -> ToggleFlag {
        self.mode_flag.clone()
    }

    /// Handle to raise calibration-toggle requests from an interrupt callback.
    pub fn cal_flag(&self) -> ToggleFlag {
        self.cal_flag.clone()
    }

    // ── Private: toggle consumption ─────────────────────────────────────────

    /// Drain both toggle flags, re-confirm the lines, and apply accepted
    /// toggles. Runs once per tick so merged requests act at most once.
    fn consume_toggles(&mut self, now_ms: u64, raw: i32) -> Result<()> {
        if self.mode_flag.take() {
            let pressed = self.mode_line_pressed()?;
            if self.mode_debounce.accept(now_ms, pressed) {
                let mode = self.engine.toggle_mode();
                tracing::debug!(?mode, "actuation mode toggled");
            } else {
                tracing::trace!(now_ms, pressed, "mode toggle rejected");
            }
        }
        if self.cal_flag.take() {
            let pressed = self.cal_line_pressed()?;
            if self.cal_debounce.accept(now_ms, pressed) {
                let state = self.calib.toggle(raw);
                tracing::debug!(?state, "calibration toggled");
            } else {
                tracing::trace!(now_ms, pressed, "calibration toggle rejected");
            }
        }
        Ok(())
    }

    fn mode_line_pressed(&mut self) -> Result<bool> {
        let high = self
            .mode_line
            .is_high()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading mode line")?;
        Ok(high != self.active_low)
    }

    fn cal_line_pressed(&mut self) -> Result<bool> {
        let high = self
            .cal_line
            .is_high()
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
            .wrap_err("reading calibration line")?;
        Ok(high != self.active_low)
    }
}
