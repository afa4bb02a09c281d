//! Rate-paced background sampling.
//!
//! A `Sampler` moves sensor ownership onto a dedicated worker thread and
//! forwards readings over a bounded(1) channel; the tick loop drains with
//! `latest()` so only the freshest reading survives. Every good read also
//! stamps a millisecond counter on the shared `Clock`, which is what the
//! runner's stall watchdog compares against.
//!
//! Dropping the `Sampler` stops and joins the worker, so no thread outlives
//! its switch loop.
use crossbeam_channel as xch;
use keyswitch_traits::AnalogSensor;
use keyswitch_traits::clock::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub struct Sampler {
    rx: xch::Receiver<i32>,
    last_ok_ms: Arc<AtomicU64>,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    stop: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    /// Spawn a worker reading `sensor` at `hz` on `clock`.
    ///
    /// The worker exits when the `Sampler` is dropped or when the receiving
    /// side disappears, whichever comes first.
    pub fn spawn<S, C>(mut sensor: S, hz: u32, timeout: Duration, clock: C) -> Self
    where
        S: AnalogSensor + Send + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let (tx, rx) = xch::bounded(1);
        let stop = Arc::new(AtomicBool::new(false));
        let last_ok_ms = Arc::new(AtomicU64::new(0));
        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(clock);
        let epoch = clock.now();
        let period = Duration::from_micros(crate::util::period_us(hz));

        let worker = {
            let stop = Arc::clone(&stop);
            let last_ok_ms = Arc::clone(&last_ok_ms);
            let clock = Arc::clone(&clock);
            std::thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    match sensor.read(timeout) {
                        Ok(raw) => {
                            if tx.send(raw).is_err() {
                                // receiver gone, nothing left to feed
                                break;
                            }
                            last_ok_ms.store(clock.ms_since(epoch), Ordering::Relaxed);
                        }
                        Err(_) => {
                            // a failed read leaves last_ok_ms alone; the
                            // watchdog turns prolonged silence into a timeout
                        }
                    }
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    clock.sleep(period);
                }
                tracing::trace!("sampler worker stopped");
            })
        };

        Self {
            rx,
            last_ok_ms,
            clock,
            epoch,
            stop,
            worker: Some(worker),
        }
    }

    /// Freshest reading, discarding anything staler.
    pub fn latest(&self) -> Option<i32> {
        self.rx.try_iter().last()
    }

    /// Milliseconds of silence relative to the caller's notion of now.
    pub fn stalled_for(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ok_ms.load(Ordering::Relaxed))
    }

    /// Milliseconds of silence measured on this sampler's own clock.
    pub fn stalled_for_now(&self) -> u64 {
        self.stalled_for(self.clock.ms_since(self.epoch))
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        // A worker parked in send() holds a reading we never drained; take
        // it so the send completes and the stop flag gets seen. A read in
        // flight delays the join by at most the sensor timeout.
        let _ = self.rx.try_iter().last();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("sampler worker panicked before shutdown");
        }
    }
}
