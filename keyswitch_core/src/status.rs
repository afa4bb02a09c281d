//! Tick outcome returned from each loop iteration.

/// Public outcome of a single tick of the switch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickReport {
    /// Normal operation: the actuation decision and the travel level it was
    /// made from.
    Device { actuated: bool, level: i32 },
    /// A calibration pass is in progress; carries the live min/max window
    /// observed so far.
    Calibration { read_min: i32, read_max: i32 },
}
