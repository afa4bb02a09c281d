pub mod clock;
pub mod flag;

pub use clock::{Clock, MonotonicClock};
pub use flag::ToggleFlag;

/// Analog travel sensor (Hall-effect cell behind an ADC).
///
/// Readings are raw ADC counts; higher counts mean deeper key travel.
pub trait AnalogSensor {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>>;
}

/// Digital input line backing a physical button (mode or calibration).
///
/// `is_high` reports the electrical level, not the logical press state;
/// callers apply the active-low convention themselves.
pub trait InputLine {
    fn is_high(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: AnalogSensor + ?Sized> AnalogSensor for Box<T> {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(timeout)
    }
}

impl<T: InputLine + ?Sized> InputLine for Box<T> {
    fn is_high(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).is_high()
    }
}
