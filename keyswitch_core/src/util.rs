//! Common time/period and geometry helpers for keyswitch_core.

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;
/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Compute the period in microseconds for a given sampling rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 microsecond.
#[inline]
pub fn period_us(hz: u32) -> u64 {
    (MICROS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Compute the period in milliseconds for a given sampling rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 millisecond.
#[inline]
pub fn period_ms(hz: u32) -> u64 {
    (MILLIS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Convert a distance in millimeters to discrete travel levels, rounding to
/// nearest and clamping to `0..=levels`. Degenerate geometry maps to 0 so the
/// caller can reject it with a proper build error.
#[inline]
pub fn mm_to_levels(mm: f32, levels: i32, total_travel_mm: f32) -> i32 {
    if !(mm.is_finite() && total_travel_mm.is_finite()) || total_travel_mm <= 0.0 || levels <= 0 {
        return 0;
    }
    let scaled = (mm * levels as f32 / total_travel_mm).round();
    if scaled <= 0.0 {
        0
    } else if scaled >= levels as f32 {
        levels
    } else {
        scaled as i32
    }
}
