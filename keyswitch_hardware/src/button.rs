//! GPIO buttons whose edge interrupt raises a `ToggleFlag`.
//!
//! The interrupt callback only sets the flag; all debounce and state
//! transitions happen in the tick loop that consumes it.

use crate::error::HwError;
use keyswitch_traits::{InputLine, ToggleFlag};
use rppal::gpio::{Gpio, InputPin, Trigger};

pub struct GpioButton {
    pin: InputPin,
}

impl GpioButton {
    /// Configure `pin` as a pulled-up input and register an async interrupt
    /// on the pressed edge that raises `flag`.
    pub fn new(pin: u8, active_low: bool, flag: ToggleFlag) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_input_pullup();
        let trigger = if active_low {
            Trigger::FallingEdge
        } else {
            Trigger::RisingEdge
        };
        pin.set_async_interrupt(trigger, move |_| {
            flag.raise();
        })
        .map_err(|e| HwError::Gpio(e.to_string()))?;
        Ok(Self { pin })
    }
}

impl InputLine for GpioButton {
    fn is_high(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.pin.is_high())
    }
}
