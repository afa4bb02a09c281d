//! Binary entry point: argument parsing, logging setup, and dispatch.

mod cli;
mod error_fmt;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(&cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}

fn real_main(cli: &Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    let cfg = load_config(&cli.config)?;
    cfg.validate().wrap_err("invalid configuration")?;
    init_tracing(cli, &cfg.logging);

    match &cli.cmd {
        Commands::Run {
            ticks,
            direct,
            rapid_trigger,
            calibration,
            save_calibration,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let shutdown = Arc::clone(&shutdown);
                ctrlc::set_handler(move || shutdown.store(true, Ordering::SeqCst))
                    .wrap_err("install Ctrl-C handler")?;
            }
            let opts = run::RunOpts {
                ticks: *ticks,
                direct: *direct,
                rapid_trigger: *rapid_trigger,
                calibration: calibration.clone(),
                save_calibration: save_calibration.clone(),
            };
            run::run_switch(&cfg, &opts, &shutdown)
        }
        Commands::SelfCheck => run::self_check(&cfg),
    }
}

/// Read and parse the config TOML; a missing file falls back to defaults so
/// the sim backend works out of the box.
fn load_config(path: &Path) -> eyre::Result<keyswitch_config::Config> {
    if path.exists() {
        let text =
            std::fs::read_to_string(path).wrap_err_with(|| format!("read config {path:?}"))?;
        keyswitch_config::load_toml(&text).wrap_err_with(|| format!("parse config {path:?}"))
    } else {
        Ok(keyswitch_config::Config::default())
    }
}

/// Install the tracing subscriber: pretty or JSON lines on stderr, plus an
/// optional JSON file sink with the configured rotation.
fn init_tracing(cli: &Cli, logging: &keyswitch_config::Logging) {
    let level = logging.level.as_deref().unwrap_or(&cli.log_level);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let stderr_layer = if cli.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file_layer = logging.file.as_deref().map(|file| {
        let path = Path::new(file);
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let name = path
            .file_name()
            .map_or_else(|| std::ffi::OsString::from("keyswitch.log"), |n| n.to_os_string());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        // Keep the worker alive for the process lifetime
        let _ = FILE_GUARD.set(guard);
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .boxed()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}
