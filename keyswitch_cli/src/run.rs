//! Loop assembly: config mapping, backend selection, and console output.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use keyswitch_config::{Config, PersistedRange, RunMode};
use keyswitch_core::error::Result as CoreResult;
use keyswitch_core::mocks::NoopSensor;
use keyswitch_core::runner::{run_direct, run_paced};
use keyswitch_core::{
    CalibrationRange, DebounceCfg, FilterCfg, SwitchCfg, TickReport, Timeouts, build_core,
};
use keyswitch_hardware::SimulatedButton;
use keyswitch_traits::{AnalogSensor, InputLine, ToggleFlag};

pub struct RunOpts {
    pub ticks: Option<u64>,
    pub direct: bool,
    pub rapid_trigger: bool,
    pub calibration: Option<PathBuf>,
    pub save_calibration: Option<PathBuf>,
}

/// Assemble the switch from config and drive the tick loop until the tick
/// limit is reached or shutdown is raised.
pub fn run_switch(cfg: &Config, opts: &RunOpts, shutdown: &AtomicBool) -> CoreResult<()> {
    let mut switch: SwitchCfg = (&cfg.switch).into();
    switch.rapid_trigger |= opts.rapid_trigger;
    let filter: FilterCfg = (&cfg.filter).into();
    let debounce: DebounceCfg = (&cfg.debounce).into();
    let timeouts: Timeouts = (&cfg.hardware).into();
    let range = pick_range(cfg, opts.calibration.as_deref())?;
    let levels = switch.levels;

    let mode_flag = ToggleFlag::new();
    let cal_flag = ToggleFlag::new();
    let (mode_line, cal_line) = make_lines(cfg, &mode_flag, &cal_flag)?;
    let sensor = make_sensor(cfg)?;

    let direct = opts.direct || matches!(cfg.runner.mode, RunMode::Direct);
    let mut printer = ReportPrinter::new(levels);

    let range = if direct {
        let mut core = build_core(
            sensor,
            mode_line,
            cal_line,
            switch,
            filter,
            debounce,
            timeouts,
            Some(range),
            Some((mode_flag, cal_flag)),
            None,
        )?;
        run_direct(&mut core, opts.ticks, shutdown, |r| printer.print(r))?;
        core.range().copied()
    } else {
        // The sampler thread owns the real sensor; the core only ever sees
        // pre-sampled readings through tick_from_raw.
        let mut core = build_core(
            NoopSensor,
            mode_line,
            cal_line,
            switch,
            filter,
            debounce,
            timeouts,
            Some(range),
            Some((mode_flag, cal_flag)),
            None,
        )?;
        run_paced(
            sensor,
            cfg.filter.sample_rate_hz,
            &mut core,
            opts.ticks,
            shutdown,
            |r| printer.print(r),
        )?;
        core.range().copied()
    };

    if let Some(path) = &opts.save_calibration
        && let Some(range) = &range
    {
        let persisted = PersistedRange::from(range);
        keyswitch_config::save_range(path, &persisted)?;
        tracing::info!(
            ?path,
            read_min = persisted.read_min,
            read_max = persisted.read_max,
            "calibration saved"
        );
    }
    Ok(())
}

/// Probe the sensor and toggle plumbing without entering the loop.
pub fn self_check(cfg: &Config) -> CoreResult<()> {
    let mut sensor = make_sensor(cfg)?;
    let timeout = Duration::from_millis(cfg.hardware.sensor_read_timeout_ms);
    for _ in 0..4 {
        let raw = sensor
            .read(timeout)
            .map_err(|e| eyre::eyre!("sensor self-check read: {e}"))?;
        if !(0..cfg.switch.adc_range).contains(&raw) {
            eyre::bail!(
                "sensor reading {raw} outside 0..{}",
                cfg.switch.adc_range
            );
        }
    }

    let flag = ToggleFlag::new();
    let mut line = SimulatedButton::new(cfg.debounce.active_low, flag.clone());
    line.press();
    if !flag.take() {
        eyre::bail!("toggle flag did not latch");
    }
    line.release();
    let _ = line
        .is_high()
        .map_err(|e| eyre::eyre!("line self-check read: {e}"))?;

    println!("self-check ok");
    Ok(())
}

/// Pick the calibration range the run starts with: an explicit file wins,
/// then the config's [calibration] section, then the full ADC scale until a
/// calibration pass commits a measured window.
fn pick_range(cfg: &Config, file: Option<&Path>) -> eyre::Result<CalibrationRange> {
    let persisted = match file {
        Some(path) => Some(keyswitch_config::load_range(path)?),
        None => cfg.calibration,
    };
    if let Some(p) = &persisted {
        return CalibrationRange::try_from(p);
    }
    CalibrationRange::new(0, cfg.switch.adc_range)
        .ok_or_else(|| eyre::eyre!("switch.adc_range leaves no calibration span"))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn make_sensor(cfg: &Config) -> eyre::Result<Box<dyn AnalogSensor + Send>> {
    let sensor = keyswitch_hardware::mcp3008::Mcp3008Sensor::new(cfg.pins.adc_channel)
        .map_err(|e| eyre::eyre!("open mcp3008: {e}"))?;
    Ok(Box::new(sensor))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn make_sensor(_cfg: &Config) -> eyre::Result<Box<dyn AnalogSensor + Send>> {
    Ok(Box::new(keyswitch_hardware::SimulatedSensor::new()))
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
fn make_lines(
    cfg: &Config,
    mode_flag: &ToggleFlag,
    cal_flag: &ToggleFlag,
) -> eyre::Result<(Box<dyn InputLine>, Box<dyn InputLine>)> {
    use keyswitch_hardware::button::GpioButton;
    if let (Some(mode_pin), Some(cal_pin)) = (cfg.pins.mode_button, cfg.pins.cal_button) {
        let mode = GpioButton::new(mode_pin, cfg.debounce.active_low, mode_flag.clone())
            .map_err(|e| eyre::eyre!("open mode button: {e}"))?;
        let cal = GpioButton::new(cal_pin, cfg.debounce.active_low, cal_flag.clone())
            .map_err(|e| eyre::eyre!("open calibration button: {e}"))?;
        return Ok((Box::new(mode), Box::new(cal)));
    }
    tracing::info!("mode/cal buttons not configured; using simulated lines");
    Ok((
        Box::new(SimulatedButton::new(cfg.debounce.active_low, mode_flag.clone())),
        Box::new(SimulatedButton::new(cfg.debounce.active_low, cal_flag.clone())),
    ))
}

#[cfg(not(all(feature = "hardware", target_os = "linux")))]
fn make_lines(
    cfg: &Config,
    mode_flag: &ToggleFlag,
    cal_flag: &ToggleFlag,
) -> eyre::Result<(Box<dyn InputLine>, Box<dyn InputLine>)> {
    Ok((
        Box::new(SimulatedButton::new(cfg.debounce.active_low, mode_flag.clone())),
        Box::new(SimulatedButton::new(cfg.debounce.active_low, cal_flag.clone())),
    ))
}

/// Prints one console line per tick report.
struct ReportPrinter {
    levels: i32,
}

impl ReportPrinter {
    fn new(levels: i32) -> Self {
        Self { levels }
    }

    fn print(&mut self, report: &TickReport) {
        match report {
            TickReport::Device { actuated, level } => {
                let bar = level_bar(*level, self.levels, 20);
                let marker = if *actuated { " actuated" } else { "" };
                println!("{bar} level {level:>3}/{}{marker}", self.levels);
            }
            TickReport::Calibration { read_min, read_max } => {
                println!("calibrating: min={read_min} max={read_max}");
            }
        }
    }
}

/// Render a fixed-width travel depth bar, e.g. `[#####...............]`.
fn level_bar(level: i32, levels: i32, width: usize) -> String {
    let levels = levels.max(1) as usize;
    let filled = (level.clamp(0, levels as i32) as usize * width) / levels;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for i in 0..width {
        bar.push(if i < filled { '#' } else { '.' });
    }
    bar.push(']');
    bar
}
