//! Maps `Box<dyn Error>` from trait boundaries to typed `SwitchError`.
//!
//! The traits in `keyswitch_traits` use `Box<dyn Error + Send + Sync>` for
//! maximum flexibility; this module converts those to our typed error enum,
//! with an optional feature-gated path for `keyswitch_hardware::HwError`
//! downcasting.

use crate::error::SwitchError;

/// Map a trait-boundary error to a typed `SwitchError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> SwitchError {
    // Feature-gated: try to downcast to HwError for precise mapping
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<keyswitch_hardware::error::HwError>() {
            return match hw {
                keyswitch_hardware::error::HwError::Timeout => SwitchError::Timeout,
                other => SwitchError::HardwareFault(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        SwitchError::Timeout
    } else {
        SwitchError::Hardware(s)
    }
}
