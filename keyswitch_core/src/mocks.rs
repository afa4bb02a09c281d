//! Test and helper mocks for keyswitch_core

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use keyswitch_traits::clock::Clock;

/// A sensor that always errors on read; useful when driving the tick loop
/// with externally sampled raw values via `tick_from_raw`.
pub struct NoopSensor;

impl keyswitch_traits::AnalogSensor for NoopSensor {
    fn read(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("noop sensor")))
    }
}

/// Replays a fixed sequence of raw samples, repeating the final value.
pub struct SeqSensor {
    seq: Vec<i32>,
    idx: usize,
}

impl SeqSensor {
    pub fn new(seq: Vec<i32>) -> Self {
        Self { seq, idx: 0 }
    }
}

impl keyswitch_traits::AnalogSensor for SeqSensor {
    fn read(
        &mut self,
        _timeout: std::time::Duration,
    ) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let v = if self.idx < self.seq.len() {
            let v = self.seq[self.idx];
            self.idx += 1;
            v
        } else {
            self.seq.last().copied().unwrap_or(0)
        };
        Ok(v)
    }
}

/// Input line pinned to one electrical level.
pub struct StaticLine(pub bool);

impl keyswitch_traits::InputLine for StaticLine {
    fn is_high(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0)
    }
}

/// Input line whose electrical level can be changed from the test body.
#[derive(Clone)]
pub struct SharedLine(Arc<AtomicBool>);

impl SharedLine {
    pub fn new(high: bool) -> Self {
        Self(Arc::new(AtomicBool::new(high)))
    }

    pub fn set_high(&self, high: bool) {
        self.0.store(high, Ordering::Release);
    }
}

impl keyswitch_traits::InputLine for SharedLine {
    fn is_high(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0.load(Ordering::Acquire))
    }
}

/// Clock for tests: time only moves when the test moves it.
///
/// Debounce windows and loop pacing become deterministic because `sleep`
/// advances the clock instead of blocking. Clones share the same timeline,
/// so a clock handed to the core can still be driven from the test body.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move the shared timeline forward by `d`.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed = elapsed.saturating_add(d);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let elapsed = self.elapsed.lock().map_or(Duration::ZERO, |g| *g);
        self.base + elapsed
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}
