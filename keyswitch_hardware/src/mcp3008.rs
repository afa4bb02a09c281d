//! MCP3008 10-bit ADC over SPI, reading the Hall sensor channel.

use crate::error::HwError;
use keyswitch_traits::AnalogSensor;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

pub struct Mcp3008Sensor {
    spi: Spi,
    channel: u8,
}

impl Mcp3008Sensor {
    pub fn new(channel: u8) -> Result<Self, HwError> {
        if channel > 7 {
            return Err(HwError::Spi(format!("invalid MCP3008 channel {channel}")));
        }
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_350_000, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Self { spi, channel })
    }

    fn read_counts(&mut self) -> Result<i32, HwError> {
        // Start bit, then single-ended mode + channel in the top nibble,
        // then one padding byte to clock the 10 result bits out
        let tx = [0x01, (0x08 | self.channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok((i32::from(rx[1] & 0x03) << 8) | i32::from(rx[2]))
    }
}

impl AnalogSensor for Mcp3008Sensor {
    fn read(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        // One SPI transfer completes in microseconds; no waiting involved
        let raw = self.read_counts()?;
        tracing::trace!(raw, channel = self.channel, "mcp3008 sample");
        Ok(raw)
    }
}
