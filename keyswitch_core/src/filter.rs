//! Travel-sample smoothing.

/// Fixed-window moving average over raw ADC samples.
///
/// The ring is zero-initialized, so the first `window - 1` outputs are biased
/// toward zero while it warms up; `SwitchCore::begin` resets back to that
/// state. The mean uses truncated integer division.
#[derive(Debug, Clone)]
pub struct SampleFilter {
    slots: Box<[i32]>,
    idx: usize,
}

impl SampleFilter {
    /// `window` is clamped to at least 1; the builder rejects 0 before this
    /// is ever reached.
    pub fn new(window: usize) -> Self {
        Self {
            slots: vec![0; window.max(1)].into_boxed_slice(),
            idx: 0,
        }
    }

    /// Insert a sample, evicting the oldest, and return the window mean.
    #[inline]
    pub fn push(&mut self, raw: i32) -> i32 {
        self.slots[self.idx] = raw;
        self.idx = (self.idx + 1) % self.slots.len();
        let sum: i64 = self.slots.iter().map(|&v| i64::from(v)).sum();
        (sum / self.slots.len() as i64) as i32
    }

    /// Clear all slots back to the zero-filled warm-up state.
    pub fn reset(&mut self) {
        self.slots.fill(0);
        self.idx = 0;
    }

    pub fn window(&self) -> usize {
        self.slots.len()
    }
}
