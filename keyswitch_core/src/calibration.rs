//! Calibration pass state machine.
//!
//! A calibration pass starts and ends on the calibration button. While the
//! pass runs, every raw sample widens the observed min/max window; on exit
//! the window is committed as the active range only when its span is usable.

/// Whether a calibration pass is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalState {
    Idle,
    Calibrating,
}

/// Committed raw-count window with a precomputed positive span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationRange {
    pub read_min: i32,
    pub read_max: i32,
    pub span: i32,
}

impl CalibrationRange {
    /// Build a range; `None` unless `read_max > read_min`.
    pub fn new(read_min: i32, read_max: i32) -> Option<Self> {
        let span = read_max.saturating_sub(read_min);
        (span > 0).then_some(Self {
            read_min,
            read_max,
            span,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CalibrationController {
    calibrating: bool,
    read_min: i32,
    read_max: i32,
    committed: Option<CalibrationRange>,
}

impl CalibrationController {
    /// Start uncalibrated and idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start idle with a previously committed range (persisted calibration
    /// or the sensor's native full-scale window).
    pub fn with_range(range: CalibrationRange) -> Self {
        Self {
            committed: Some(range),
            ..Self::default()
        }
    }

    pub fn state(&self) -> CalState {
        if self.calibrating {
            CalState::Calibrating
        } else {
            CalState::Idle
        }
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    /// Flip the pass state. Entering seeds the window from the current raw
    /// sample (min) and zero (max); leaving commits the window when its span
    /// is positive, otherwise the previous range is kept.
    pub fn toggle(&mut self, current_raw: i32) -> CalState {
        if self.calibrating {
            match CalibrationRange::new(self.read_min, self.read_max) {
                Some(range) => {
                    tracing::debug!(
                        read_min = range.read_min,
                        read_max = range.read_max,
                        span = range.span,
                        "calibration committed"
                    );
                    self.committed = Some(range);
                }
                None => {
                    tracing::warn!(
                        read_min = self.read_min,
                        read_max = self.read_max,
                        "calibration window never opened; keeping previous range"
                    );
                }
            }
            self.calibrating = false;
        } else {
            self.read_min = current_raw;
            self.read_max = 0;
            self.calibrating = true;
            tracing::debug!(seed = current_raw, "calibration pass started");
        }
        self.state()
    }

    /// Widen the live window; no-op outside a pass.
    #[inline]
    pub fn observe(&mut self, raw: i32) {
        if self.calibrating {
            if raw > self.read_max {
                self.read_max = raw;
            }
            if raw < self.read_min {
                self.read_min = raw;
            }
        }
    }

    /// Live min/max window of the running pass.
    pub fn window(&self) -> (i32, i32) {
        (self.read_min, self.read_max)
    }

    /// The committed range, if any pass (or preload) produced one.
    pub fn range(&self) -> Option<&CalibrationRange> {
        self.committed.as_ref()
    }

    pub fn span(&self) -> Option<i32> {
        self.committed.map(|r| r.span)
    }
}
