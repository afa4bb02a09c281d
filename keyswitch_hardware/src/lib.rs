pub mod error;

#[cfg(feature = "hardware")]
pub mod button;
#[cfg(feature = "hardware")]
pub mod mcp3008;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use keyswitch_traits::{AnalogSensor, InputLine, ToggleFlag};

/// Simulated Hall sensor: a deterministic triangle wave sweeping between a
/// resting reading and a fully-pressed reading, one step per read.
pub struct SimulatedSensor {
    rest: i32,
    pressed: i32,
    step: i32,
    pos: i32,
    dir: i32,
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self::with_range(60, 990, 24)
    }

    /// `rest < pressed`; `step` controls how fast the simulated key moves.
    pub fn with_range(rest: i32, pressed: i32, step: i32) -> Self {
        Self {
            rest,
            pressed,
            step: step.max(1),
            pos: rest,
            dir: 1,
        }
    }
}

impl AnalogSensor for SimulatedSensor {
    fn read(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let current = self.pos;
        self.pos += self.dir * self.step;
        if self.pos >= self.pressed {
            self.pos = self.pressed;
            self.dir = -1;
        } else if self.pos <= self.rest {
            self.pos = self.rest;
            self.dir = 1;
        }
        Ok(current)
    }
}

/// Simulated button: holds an electrical level and raises a `ToggleFlag`
/// on each press, standing in for the GPIO edge interrupt.
#[derive(Clone)]
pub struct SimulatedButton {
    active_low: bool,
    level_high: Arc<AtomicBool>,
    flag: ToggleFlag,
}

impl SimulatedButton {
    pub fn new(active_low: bool, flag: ToggleFlag) -> Self {
        Self {
            active_low,
            // released level: high for pull-up wiring, low otherwise
            level_high: Arc::new(AtomicBool::new(active_low)),
            flag,
        }
    }

    pub fn press(&self) {
        self.level_high.store(!self.active_low, Ordering::Release);
        self.flag.raise();
    }

    pub fn release(&self) {
        self.level_high.store(self.active_low, Ordering::Release);
    }
}

impl InputLine for SimulatedButton {
    fn is_high(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.level_high.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[case(100, 200, 30)]
    #[case(60, 990, 24)]
    #[case(0, 1023, 512)]
    fn simulated_sensor_sweeps_within_its_range(
        #[case] rest: i32,
        #[case] pressed: i32,
        #[case] step: i32,
    ) {
        let mut sensor = SimulatedSensor::with_range(rest, pressed, step);
        let mut seen_top = false;
        let mut seen_bottom = false;
        // enough reads to cover both legs of the triangle wave
        let reads = 2 * (((pressed - rest) / step) + 2) as usize;
        for _ in 0..reads {
            let v = sensor.read(Duration::from_millis(1)).unwrap();
            assert!((rest..=pressed).contains(&v));
            seen_top |= v == pressed;
            seen_bottom |= v == rest;
        }
        assert!(seen_top && seen_bottom, "wave should reach both ends");
    }

    #[test]
    fn simulated_button_raises_the_flag_on_press() {
        let flag = ToggleFlag::new();
        let mut button = SimulatedButton::new(true, flag.clone());
        assert!(button.is_high().unwrap(), "pull-up line idles high");
        assert!(!flag.take());

        button.press();
        assert!(!button.is_high().unwrap());
        assert!(flag.take());

        button.release();
        assert!(button.is_high().unwrap());
    }
}
