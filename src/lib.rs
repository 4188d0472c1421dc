pub mod attitude;
pub mod calibration;
pub mod config;
pub mod constants;
pub mod error;
pub mod heading;
pub mod output;
pub mod processing;
pub mod sensor;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::ImuConfig;
pub use error::{ImuError, Result};
pub use processing::{AttitudeProcessor, OrientationRecord};
