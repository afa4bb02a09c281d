use crate::core::SwitchCore;
use crate::error::{Result as CoreResult, SwitchError};
use crate::sampler::Sampler;
use crate::status::TickReport;
use keyswitch_traits::clock::MonotonicClock;
use keyswitch_traits::{AnalogSensor, InputLine};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// How sampling should be orchestrated
#[derive(Debug, Clone, Copy)]
pub enum SamplingMode {
    /// Read inside the tick loop using AnalogSensor::read(timeout)
    Direct,
    /// Rate-paced background sampling at the given Hz
    Paced(u32),
}

/// Compute the stall watchdog threshold in milliseconds.
///
/// Parameters:
/// - `sensor_timeout_ms`: the per-read sensor timeout in milliseconds. Expected ≥ 1.
///   Used to derive a conservative "fast" stall threshold (4x timeout) for quick detection.
/// - `period_ms`: the sampling period in milliseconds derived from the sample rate.
///   Expected in [1, 1000] (clamped by utility helpers); the threshold spans at least
///   two periods so a single missed sample doesn't immediately trip the watchdog.
#[inline]
fn compute_stall_threshold_ms(sensor_timeout_ms: u64, period_ms: u64) -> u64 {
    debug_assert!((1..=crate::util::MILLIS_PER_SEC).contains(&period_ms));
    std::cmp::max(
        fast_threshold_ms(sensor_timeout_ms),
        two_periods_ms(period_ms),
    )
    .max(1)
}

/// Derive a quick stall threshold from per-read sensor timeout.
#[inline]
fn fast_threshold_ms(sensor_timeout_ms: u64) -> u64 {
    sensor_timeout_ms.saturating_mul(4)
}

/// Ensure the stall threshold spans at least two periods to tolerate one miss.
#[inline]
fn two_periods_ms(period_ms: u64) -> u64 {
    period_ms.saturating_mul(2)
}

#[inline]
fn stalled_now(elapsed_ms: u64, stalled_ms: u64, threshold_ms: u64) -> bool {
    elapsed_ms >= threshold_ms && stalled_ms > threshold_ms
}

/// Run the tick loop reading the sensor inline, invoking `on_report` after
/// every tick, until `ticks` is exhausted or `shutdown` is raised.
pub fn run_direct<A, R, C, F>(
    core: &mut SwitchCore<A, R, C>,
    ticks: Option<u64>,
    shutdown: &AtomicBool,
    mut on_report: F,
) -> CoreResult<()>
where
    A: AnalogSensor,
    R: InputLine,
    C: InputLine,
    F: FnMut(&TickReport),
{
    core.begin();
    tracing::info!(mode = ?core.mode(), orchestration = "direct", "switch loop start");
    let period = Duration::from_micros(core.period_us);
    let mut done: u64 = 0;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::debug!("shutdown requested; leaving switch loop");
            return Ok(());
        }
        let report = core.tick()?;
        on_report(&report);
        done += 1;
        if let Some(limit) = ticks
            && done >= limit
        {
            return Ok(());
        }
        core.clock.sleep(period);
    }
}

/// Run the tick loop fed by a background `Sampler` that owns `sensor`.
///
/// The core is typically built with `mocks::NoopSensor` since only
/// `tick_from_raw` is used here. A stall watchdog aborts with
/// `SwitchError::Timeout` when the sampler stops delivering readings.
pub fn run_paced<A, S, R, C, F>(
    sensor: A,
    hz: u32,
    core: &mut SwitchCore<S, R, C>,
    ticks: Option<u64>,
    shutdown: &AtomicBool,
    mut on_report: F,
) -> CoreResult<()>
where
    A: AnalogSensor + Send + 'static,
    S: AnalogSensor,
    R: InputLine,
    C: InputLine,
    F: FnMut(&TickReport),
{
    let period_us = crate::util::period_us(hz);
    let period_ms = crate::util::period_ms(hz);
    let sensor_timeout_ms = {
        let ms = core.sensor_timeout.as_millis();
        (ms.min(u128::from(u64::MAX))) as u64
    };
    let stall_threshold_ms = compute_stall_threshold_ms(sensor_timeout_ms, period_ms);

    let sampler = Sampler::spawn(sensor, hz, core.sensor_timeout, MonotonicClock::new());

    core.begin();
    tracing::info!(mode = ?core.mode(), orchestration = "paced", hz, "switch loop start");

    let start = std::time::Instant::now();
    let mut done: u64 = 0;
    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::debug!("shutdown requested; leaving switch loop");
            return Ok(());
        }

        let elapsed_ms: u64 = {
            let ms = start.elapsed().as_millis();
            (ms.min(u128::from(u64::MAX))) as u64
        };
        let stalled_ms = sampler.stalled_for_now();
        if stalled_now(elapsed_ms, stalled_ms, stall_threshold_ms) {
            tracing::error!(stalled_ms, stall_threshold_ms, "sensor stalled");
            return Err(crate::error::Report::new(SwitchError::Timeout));
        }

        if let Some(raw) = sampler.latest() {
            let report = core.tick_from_raw(raw)?;
            on_report(&report);
            done += 1;
            if let Some(limit) = ticks
                && done >= limit
            {
                return Ok(());
            }
        } else {
            // avoid busy spin if no sample yet
            std::thread::sleep(Duration::from_micros(period_us));
        }
    }
}
