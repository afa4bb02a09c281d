//! Actuation decision policies.
//!
//! Maps a filtered raw sample onto the discrete level scale and feeds it
//! through the active policy: a fixed threshold, or rapid trigger with a
//! per-stroke peak and release hysteresis.

use crate::calibration::CalibrationRange;

/// Actuation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Actuate while the level sits at or beyond a fixed point.
    Threshold,
    /// Actuate on downward movement, release on upward movement relative to
    /// the deepest point of the current stroke.
    RapidTrigger,
}

impl Mode {
    pub fn flipped(self) -> Self {
        match self {
            Self::Threshold => Self::RapidTrigger,
            Self::RapidTrigger => Self::Threshold,
        }
    }
}

/// Per-switch actuation state.
#[derive(Debug, Clone)]
pub struct ActuationEngine {
    mode: Mode,
    levels: i32,
    actuation_level: i32,
    rt_release_levels: i32,
    local_max_level: i32,
    actuated: bool,
}

impl ActuationEngine {
    /// `actuation_level` and `rt_release_levels` are precomputed from
    /// millimeter geometry by the builder.
    pub fn new(levels: i32, actuation_level: i32, rt_release_levels: i32, mode: Mode) -> Self {
        Self {
            mode,
            levels,
            actuation_level,
            rt_release_levels,
            local_max_level: 0,
            actuated: false,
        }
    }

    /// Map a filtered raw sample onto `0..levels-1`.
    ///
    /// Without a committed range the level is pinned to 0, so the switch
    /// cannot actuate before a usable calibration exists.
    #[inline]
    pub fn compute_level(&self, filtered: i32, range: Option<&CalibrationRange>) -> i32 {
        let Some(r) = range else {
            return 0;
        };
        let scaled =
            i64::from(filtered - r.read_min) * i64::from(self.levels) / i64::from(r.span);
        scaled.clamp(0, i64::from(self.levels - 1)) as i32
    }

    /// Feed one level through the active policy; returns the actuation bit.
    #[inline]
    pub fn decide(&mut self, level: i32) -> bool {
        match self.mode {
            Mode::Threshold => {
                self.actuated = level >= self.actuation_level;
            }
            Mode::RapidTrigger => {
                // The release check runs before the peak check so a sample
                // that both backs off and re-peaks on one tick releases.
                if level == 0 || level + self.rt_release_levels < self.local_max_level {
                    self.local_max_level = level;
                    self.actuated = false;
                } else if level > self.local_max_level {
                    self.local_max_level = level;
                    self.actuated = true;
                }
            }
        }
        self.actuated
    }

    /// Flip between policies, discarding transient rapid-trigger state.
    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.flipped());
        self.mode
    }

    /// Select a policy; the stroke peak and held actuation bit are cleared
    /// even when the mode is unchanged.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.reset();
    }

    /// Clear transient decision state without changing the mode.
    pub fn reset(&mut self) {
        self.local_max_level = 0;
        self.actuated = false;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_actuated(&self) -> bool {
        self.actuated
    }

    pub fn actuation_level(&self) -> i32 {
        self.actuation_level
    }
}
