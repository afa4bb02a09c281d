use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum SwitchError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing sensor")]
    MissingSensor,
    #[error("missing mode line")]
    MissingModeLine,
    #[error("missing calibration line")]
    MissingCalLine,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
