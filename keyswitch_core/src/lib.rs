#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core key-switch actuation logic (hardware-agnostic).
//!
//! This crate provides the hardware-independent decision engine for a
//! Hall-effect key switch. All hardware interactions go through the
//! `keyswitch_traits::AnalogSensor` and `keyswitch_traits::InputLine` traits.
//!
//! ## Architecture
//!
//! - **Filtering**: fixed-window moving average over raw samples (`filter`)
//! - **Calibration**: Idle/Calibrating pass committing a min/max range (`calibration`)
//! - **Toggles**: interrupt-raised flags consumed with debounce (`toggle`)
//! - **Actuation**: clamped level mapping + Threshold/RapidTrigger policies (`engine`)
//! - **Loop**: `SwitchCore::tick` ties the stages together (`core`, `status`)
//!
//! ## Integer arithmetic
//!
//! The hot path operates on raw ADC counts and discrete travel levels using
//! `i32` for deterministic behavior; millimeter geometry is converted to
//! levels once at build time (`util::mm_to_levels`).

pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod core;
pub mod engine;
pub mod error;
pub mod filter;
pub mod hw_error;
pub mod mocks;
pub mod runner;
pub mod sampler;
pub mod status;
pub mod toggle;
pub mod util;

pub use builder::{KeySwitch, KeySwitchBuilder, Missing, Set, build_core};
pub use calibration::{CalState, CalibrationController, CalibrationRange};
pub use config::{DebounceCfg, FilterCfg, SwitchCfg, Timeouts};
pub use core::SwitchCore;
pub use engine::{ActuationEngine, Mode};
pub use error::{BuildError, Result, SwitchError};
pub use filter::SampleFilter;
pub use status::TickReport;
pub use toggle::{DebouncedToggle, ToggleFlag};
