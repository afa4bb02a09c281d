//! Type-state builder for `KeySwitch` and generic `build_core` constructor.
//!
//! The builder enforces at compile time that the sensor and both button
//! lines are provided before `build()` is available. `try_build()` is always
//! available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use keyswitch_traits::clock::{Clock, MonotonicClock};
use keyswitch_traits::{AnalogSensor, InputLine, ToggleFlag};

use crate::calibration::{CalibrationController, CalibrationRange};
use crate::config::{DebounceCfg, FilterCfg, SwitchCfg, Timeouts};
use crate::core::SwitchCore;
use crate::engine::{ActuationEngine, Mode};
use crate::error::{BuildError, Result};
use crate::filter::SampleFilter;
use crate::status::TickReport;
use crate::toggle::DebouncedToggle;

// ── Public dynamic-dispatch wrapper ──────────────────────────────────────────

/// Public dynamic (boxed) switch that preserves a simple API via composition.
pub struct KeySwitch {
    pub(crate) inner: SwitchCore<Box<dyn AnalogSensor>, Box<dyn InputLine>, Box<dyn InputLine>>,
}

impl core::fmt::Debug for KeySwitch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeySwitch")
            .field("mode", &self.inner.mode())
            .field("calibrating", &self.inner.is_calibrating())
            .field("last_level", &self.inner.last_level)
            .finish()
    }
}

impl KeySwitch {
    /// Start building a KeySwitch.
    pub fn builder() -> KeySwitchBuilder<Missing, Missing, Missing> {
        KeySwitchBuilder::default()
    }

    /// One iteration of the switch loop.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.inner.tick()
    }

    /// Process a pre-sampled raw reading (for sampler integration).
    pub fn tick_from_raw(&mut self, raw: i32) -> Result<TickReport> {
        self.inner.tick_from_raw(raw)
    }

    /// Reset per-run state. Call before entering the loop.
    pub fn begin(&mut self) {
        self.inner.begin();
    }

    pub fn mode(&self) -> Mode {
        self.inner.mode()
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.inner.set_mode(mode);
    }

    pub fn is_calibrating(&self) -> bool {
        self.inner.is_calibrating()
    }

    pub fn range(&self) -> Option<&CalibrationRange> {
        self.inner.range()
    }

    pub fn last_level(&self) -> i32 {
        self.inner.last_level()
    }

    /// Handle to raise mode-toggle requests from an interrupt callback.
    pub fn mode_flag(&self) -> ToggleFlag {
        self.inner.mode_flag()
    }

    /// Handle to raise calibration-toggle requests from an interrupt callback.
    pub fn cal_flag(&self) -> ToggleFlag {
        self.inner.cal_flag()
    }
}

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `KeySwitch`. All fields are validated on `build()`.
pub struct KeySwitchBuilder<S, R, C> {
    sensor: Option<Box<dyn AnalogSensor>>,
    mode_line: Option<Box<dyn InputLine>>,
    cal_line: Option<Box<dyn InputLine>>,
    switch: Option<SwitchCfg>,
    filter: Option<FilterCfg>,
    debounce: Option<DebounceCfg>,
    timeouts: Option<Timeouts>,
    range: Option<CalibrationRange>,
    flags: Option<(ToggleFlag, ToggleFlag)>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _s: PhantomData<S>,
    _r: PhantomData<R>,
    _c: PhantomData<C>,
}

impl Default for KeySwitchBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            sensor: None,
            mode_line: None,
            cal_line: None,
            switch: None,
            filter: None,
            debounce: None,
            timeouts: None,
            range: None,
            flags: None,
            clock: None,
            _s: PhantomData,
            _r: PhantomData,
            _c: PhantomData,
        }
    }
}

/// Validate configuration and construct a `SwitchCore` with precomputed
/// level geometry.
///
/// This is the single source of truth for validation and construction,
/// used by both `KeySwitchBuilder::try_build()` and `build_core()`.
#[allow(clippy::too_many_arguments)]
fn validate_and_build<A: AnalogSensor, R: InputLine, C: InputLine>(
    sensor: A,
    mode_line: R,
    cal_line: C,
    switch: SwitchCfg,
    filter: FilterCfg,
    debounce: DebounceCfg,
    timeouts: Timeouts,
    range: Option<CalibrationRange>,
    flags: Option<(ToggleFlag, ToggleFlag)>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<SwitchCore<A, R, C>> {
    // ── Validation ───────────────────────────────────────────────────────────
    if switch.levels < 2 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "levels must be >= 2",
        )));
    }
    if !(switch.total_travel_mm.is_finite() && switch.total_travel_mm > 0.0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "total_travel_mm must be finite and > 0",
        )));
    }
    if !(switch.actuation_point_mm.is_finite() && switch.actuation_point_mm > 0.0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "actuation_point_mm must be finite and > 0",
        )));
    }
    if !(switch.rt_release_mm.is_finite() && switch.rt_release_mm > 0.0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "rt_release_mm must be finite and > 0",
        )));
    }
    if filter.window == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "filter window must be >= 1",
        )));
    }
    if filter.sample_rate_hz == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "sample_rate_hz must be > 0",
        )));
    }
    if debounce.debounce_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "debounce_ms must be >= 1",
        )));
    }
    if timeouts.sensor_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "sensor_ms must be >= 1",
        )));
    }
    if let Some(r) = &range
        && (r.span <= 0 || r.read_max <= r.read_min)
    {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "calibration range span must be > 0",
        )));
    }

    // ── Precompute ───────────────────────────────────────────────────────────
    let actuation_level = crate::util::mm_to_levels(
        switch.actuation_point_mm,
        switch.levels,
        switch.total_travel_mm,
    );
    if actuation_level == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "actuation point below level resolution",
        )));
    }
    if actuation_level >= switch.levels {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "actuation point must sit below full travel",
        )));
    }
    let rt_release_levels =
        crate::util::mm_to_levels(switch.rt_release_mm, switch.levels, switch.total_travel_mm);
    if rt_release_levels == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "rapid-trigger release below level resolution",
        )));
    }

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    let epoch = clock.now();
    let period_us = crate::util::period_us(filter.sample_rate_hz);

    let mode = if switch.rapid_trigger {
        Mode::RapidTrigger
    } else {
        Mode::Threshold
    };
    let calib = match range {
        Some(r) => CalibrationController::with_range(r),
        None => CalibrationController::new(),
    };
    let (mode_flag, cal_flag) = flags.unwrap_or_else(|| (ToggleFlag::new(), ToggleFlag::new()));

    Ok(SwitchCore {
        sensor,
        mode_line,
        cal_line,
        filter: SampleFilter::new(filter.window),
        calib,
        engine: ActuationEngine::new(switch.levels, actuation_level, rt_release_levels, mode),
        mode_flag,
        cal_flag,
        mode_debounce: DebouncedToggle::new(debounce.debounce_ms),
        cal_debounce: DebouncedToggle::new(debounce.debounce_ms),
        active_low: debounce.active_low,
        clock,
        epoch,
        sensor_timeout: Duration::from_millis(timeouts.sensor_ms),
        period_us,
        last_level: 0,
    })
}

impl<S, R, C> KeySwitchBuilder<S, R, C> {
    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<KeySwitch> {
        let sensor = self
            .sensor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingSensor))?;
        let mode_line = self
            .mode_line
            .ok_or_else(|| eyre::Report::new(BuildError::MissingModeLine))?;
        let cal_line = self
            .cal_line
            .ok_or_else(|| eyre::Report::new(BuildError::MissingCalLine))?;

        let inner = validate_and_build(
            sensor,
            mode_line,
            cal_line,
            self.switch.unwrap_or_default(),
            self.filter.unwrap_or_default(),
            self.debounce.unwrap_or_default(),
            self.timeouts.unwrap_or_default(),
            self.range,
            self.flags,
            self.clock,
        )?;

        Ok(KeySwitch { inner })
    }
}

/// Chainable setters that do not affect type-state.
impl<S, R, C> KeySwitchBuilder<S, R, C> {
    pub fn with_switch(mut self, switch: SwitchCfg) -> Self {
        self.switch = Some(switch);
        self
    }
    pub fn with_filter(mut self, filter: FilterCfg) -> Self {
        self.filter = Some(filter);
        self
    }
    pub fn with_debounce(mut self, debounce: DebounceCfg) -> Self {
        self.debounce = Some(debounce);
        self
    }
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = Some(timeouts);
        self
    }
    /// Preload a committed calibration range (persisted or full-scale).
    pub fn with_range(mut self, range: CalibrationRange) -> Self {
        self.range = Some(range);
        self
    }
    /// Provide externally created toggle flags so interrupt callbacks can be
    /// registered before the switch is built.
    pub fn with_flags(mut self, mode_flag: ToggleFlag, cal_flag: ToggleFlag) -> Self {
        self.flags = Some((mode_flag, cal_flag));
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<R, C> KeySwitchBuilder<Missing, R, C> {
    pub fn with_sensor(self, sensor: impl AnalogSensor + 'static) -> KeySwitchBuilder<Set, R, C> {
        KeySwitchBuilder {
            sensor: Some(Box::new(sensor)),
            mode_line: self.mode_line,
            cal_line: self.cal_line,
            switch: self.switch,
            filter: self.filter,
            debounce: self.debounce,
            timeouts: self.timeouts,
            range: self.range,
            flags: self.flags,
            clock: self.clock,
            _s: PhantomData,
            _r: PhantomData,
            _c: PhantomData,
        }
    }
}

impl<S, C> KeySwitchBuilder<S, Missing, C> {
    pub fn with_mode_line(self, line: impl InputLine + 'static) -> KeySwitchBuilder<S, Set, C> {
        KeySwitchBuilder {
            sensor: self.sensor,
            mode_line: Some(Box::new(line)),
            cal_line: self.cal_line,
            switch: self.switch,
            filter: self.filter,
            debounce: self.debounce,
            timeouts: self.timeouts,
            range: self.range,
            flags: self.flags,
            clock: self.clock,
            _s: PhantomData,
            _r: PhantomData,
            _c: PhantomData,
        }
    }
}

impl<S, R> KeySwitchBuilder<S, R, Missing> {
    pub fn with_cal_line(self, line: impl InputLine + 'static) -> KeySwitchBuilder<S, R, Set> {
        KeySwitchBuilder {
            sensor: self.sensor,
            mode_line: self.mode_line,
            cal_line: Some(Box::new(line)),
            switch: self.switch,
            filter: self.filter,
            debounce: self.debounce,
            timeouts: self.timeouts,
            range: self.range,
            flags: self.flags,
            clock: self.clock,
            _s: PhantomData,
            _r: PhantomData,
            _c: PhantomData,
        }
    }
}

impl KeySwitchBuilder<Set, Set, Set> {
    /// Validate and build the KeySwitch. Only available once the sensor and
    /// both lines are set.
    pub fn build(self) -> Result<KeySwitch> {
        self.try_build()
    }
}

/// Generic, statically-dispatched alias using the unified core.
pub type SwitchCoreG<A, R, C> = SwitchCore<A, R, C>;

/// Build a generic, statically-dispatched `SwitchCore` from concrete parts.
///
/// Delegates to the shared `validate_and_build`; no duplicated validation logic.
#[allow(clippy::too_many_arguments)]
pub fn build_core<A, R, C>(
    sensor: A,
    mode_line: R,
    cal_line: C,
    switch: SwitchCfg,
    filter: FilterCfg,
    debounce: DebounceCfg,
    timeouts: Timeouts,
    range: Option<CalibrationRange>,
    flags: Option<(ToggleFlag, ToggleFlag)>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<SwitchCore<A, R, C>>
where
    A: AnalogSensor + 'static,
    R: InputLine + 'static,
    C: InputLine + 'static,
{
    validate_and_build(
        sensor, mode_line, cal_line, switch, filter, debounce, timeouts, range, flags, clock,
    )
}
