//! Human-readable error descriptions and structured JSON error formatting.

use keyswitch_core::error::{BuildError, SwitchError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSensor => {
                "What happened: No analog sensor was provided to the switch engine.\nLikely causes: Hardware sensor failed to initialize or was not wired into the builder.\nHow to fix: Ensure the MCP3008 sensor is created successfully and passed via with_sensor(...).".to_string()
            }
            BuildError::MissingModeLine => {
                "What happened: No mode button line was provided to the switch engine.\nLikely causes: GPIO init failed or the line was not wired into the builder.\nHow to fix: Ensure the mode button is created successfully and passed via with_mode_line(...).".to_string()
            }
            BuildError::MissingCalLine => {
                "What happened: No calibration button line was provided to the switch engine.\nLikely causes: GPIO init failed or the line was not wired into the builder.\nHow to fix: Ensure the calibration button is created successfully and passed via with_cal_line(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See README for a sample."
            ),
        };
    }

    if let Some(se) = err.downcast_ref::<SwitchError>() {
        return match se {
            SwitchError::Timeout => {
                "What happened: Sensor read timed out.\nLikely causes: MCP3008 not wired correctly, SPI bus disabled, or timeout too low.\nHow to fix: Verify the SPI wiring and bus, and consider increasing hardware.sensor_read_timeout_ms in the config.".to_string()
            }
            SwitchError::Hardware(msg) | SwitchError::HardwareFault(msg) => format!(
                "What happened: Hardware fault ({msg}).\nLikely causes: Wiring or power issues, or insufficient GPIO/SPI permissions.\nHow to fix: Check [pins] in the config and the process permissions, then rerun with --log-level=debug."
            ),
            SwitchError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config.
    // The alternate format renders the whole context chain.
    let msg = format!("{err:#}");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("open mcp3008") || lower.contains("open mode button")
        || lower.contains("open calibration button")
    {
        return "What happened: Failed to initialize hardware.\nLikely causes: Incorrect pin numbers, SPI bus disabled, or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure SPI is enabled and the process can access GPIO.".to_string();
    }

    if lower.contains("calibration file") || lower.contains("calibration range") {
        return format!(
            "What happened: The calibration file is missing or invalid.\nLikely causes: The file was never written, or it holds an empty range (read_max <= read_min).\nHow to fix: Re-run a calibration pass with --save-calibration, or delete the file to fall back to the full ADC range. Original: {msg}"
        );
    }

    if lower.contains("invalid configuration") {
        return format!(
            "What happened: Configuration is invalid or incomplete.\nLikely causes: Out-of-range values in [switch], [filter], [debounce] or [hardware].\nHow to fix: Edit the TOML config and try again. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map typed domain errors to stable exit codes; everything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(se) = err.downcast_ref::<SwitchError>() {
        return match se {
            SwitchError::Timeout => 3,
            SwitchError::Hardware(_) | SwitchError::HardwareFault(_) => 4,
            SwitchError::Config(_) => 2,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = if let Some(se) = err.downcast_ref::<SwitchError>() {
        match se {
            SwitchError::Timeout => "Timeout",
            SwitchError::Hardware(_) => "Hardware",
            SwitchError::HardwareFault(_) => "HardwareFault",
            SwitchError::Config(_) => "Config",
        }
    } else if err.downcast_ref::<BuildError>().is_some() {
        "Build"
    } else {
        "Error"
    };

    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
