//! Debounced handling of interrupt-raised toggle requests.
//!
//! Button edges arrive on interrupt callbacks that only raise a
//! `ToggleFlag`; the tick loop consumes the flag and runs it through a
//! `DebouncedToggle` before acting on it.

pub use keyswitch_traits::ToggleFlag;

/// Debounce gate for one toggle button.
///
/// A pending request is accepted when the line still reads as pressed and at
/// least `debounce_ms` elapsed since the previous accepted toggle. Requests
/// falling inside the window are dropped, never queued, so a bouncing
/// contact produces exactly one state change.
#[derive(Debug, Clone)]
pub struct DebouncedToggle {
    debounce_ms: u64,
    last_accept_ms: Option<u64>,
}

impl DebouncedToggle {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            last_accept_ms: None,
        }
    }

    /// Judge a pending toggle request at `now_ms`.
    ///
    /// `line_pressed` is the re-read logical state of the button line; a
    /// spike that is already gone by tick time is rejected outright.
    pub fn accept(&mut self, now_ms: u64, line_pressed: bool) -> bool {
        if !line_pressed {
            return false;
        }
        let ok = match self.last_accept_ms {
            None => true,
            Some(prev) => now_ms.saturating_sub(prev) >= self.debounce_ms,
        };
        if ok {
            self.last_accept_ms = Some(now_ms);
        }
        ok
    }

    /// Forget the last accepted toggle (used when a run begins).
    pub fn reset(&mut self) {
        self.last_accept_ms = None;
    }
}
