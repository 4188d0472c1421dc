use thiserror::Error;

use crate::calibration::GyroBias;

#[derive(Error, Debug)]
pub enum ImuError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Sample source unavailable: {0}")]
    SourceUnavailable(String),

    /// The calibration fit failed. `best_effort` holds whatever bias could
    /// still be computed so the caller can inspect it.
    #[error("Degenerate calibration: {reason}")]
    DegenerateCalibration {
        reason: String,
        best_effort: Option<GyroBias>,
    },

    #[error("Invalid record: expected {expected} bytes, got {actual}")]
    InvalidRecord { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ImuError {
    /// Best-effort bias attached to a failed calibration, if any.
    pub fn best_effort_bias(&self) -> Option<GyroBias> {
        match self {
            Self::DegenerateCalibration { best_effort, .. } => *best_effort,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImuError>;
