use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One-bit handoff cell between an interrupt-side producer and the tick
/// loop. The producer calls `raise()`; the loop calls `take()` once per
/// tick. Raising twice before a `take` collapses into one pending request,
/// which is exactly the merge behavior button handling wants.
#[derive(Debug, Clone, Default)]
pub struct ToggleFlag(Arc<AtomicBool>);

impl ToggleFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Mark a pending toggle request. Safe to call from a signal or
    /// interrupt callback thread.
    #[inline]
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume the pending request, returning whether one was set.
    #[inline]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    /// Peek without consuming.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_the_flag() {
        let flag = ToggleFlag::new();
        assert!(!flag.take());
        flag.raise();
        assert!(flag.is_raised());
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn raises_merge_into_one_pending_request() {
        let flag = ToggleFlag::new();
        flag.raise();
        flag.raise();
        flag.raise();
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn clones_share_the_same_cell() {
        let flag = ToggleFlag::new();
        let isr_side = flag.clone();
        isr_side.raise();
        assert!(flag.take());
    }
}
