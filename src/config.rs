//! Configuration for the gyrocompass pipeline.
//!
//! Every section has working defaults for the reference board, so a TOML file
//! only needs the values that differ:
//!
//! ```toml
//! [clock]
//! frequency_hz = 19200000.0
//!
//! [averaging]
//! window = 32
//!
//! [integration]
//! method = "axis-angle"
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{
    DEFAULT_CLOCK_FREQUENCY_HZ, MAX_AVERAGE_COUNT, MIN_CALIBRATION_POINTS, STANDARD_GRAVITY,
};
use crate::error::{ImuError, Result};

/// Device sample clock rate
///
/// Converts raw timestamps (ticks) into seconds.
///
/// # Parsing formats
/// - `19200000` - ticks per second (no suffix)
/// - `19200000hz` or `19200000Hz` - explicit Hz
/// - `19200kHz` - kilohertz
/// - `19.2MHz` - megahertz
///
/// # Example
/// ```
/// use gyrocompass::config::ClockFrequency;
///
/// let clock: ClockFrequency = "19.2MHz".parse().unwrap();
/// assert_eq!(clock.as_hz(), 19_200_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockFrequency(f64);

impl ClockFrequency {
    pub fn from_hz(hz: f64) -> Result<Self> {
        if !(hz.is_finite() && hz > 0.0) {
            return Err(ImuError::Config(format!(
                "clock frequency must be positive, got {}",
                hz
            )));
        }
        Ok(Self(hz))
    }

    pub fn as_hz(&self) -> f64 {
        self.0
    }

    /// Signed seconds from `previous` to `current`.
    pub fn elapsed_secs(&self, previous: u64, current: u64) -> f64 {
        (current as i128 - previous as i128) as f64 / self.0
    }

    pub fn ticks_to_secs(&self, ticks: u64) -> f64 {
        ticks as f64 / self.0
    }

    pub fn secs_to_ticks(&self, secs: f64) -> u64 {
        (secs * self.0).round() as u64
    }
}

impl Default for ClockFrequency {
    fn default() -> Self {
        Self(DEFAULT_CLOCK_FREQUENCY_HZ)
    }
}

impl fmt::Display for ClockFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hz", self.0)
    }
}

impl FromStr for ClockFrequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();

        let (num, scale) = if let Some(num) = lower.strip_suffix("mhz") {
            (num, 1e6)
        } else if let Some(num) = lower.strip_suffix("khz") {
            (num, 1e3)
        } else if let Some(num) = lower.strip_suffix("hz") {
            (num, 1.0)
        } else {
            (lower.as_str(), 1.0)
        };

        let value: f64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid clock frequency: {}", s))?;
        Self::from_hz(value * scale).map_err(|e| e.to_string())
    }
}

/// How a gyro sample becomes an incremental rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrationMethod {
    /// `(1, ½ωx·dt, ½ωy·dt, ½ωz·dt)`, normalized
    FirstOrder,
    /// Exact rotation of `|ω|·dt` about `ω/|ω|`
    AxisAngle,
}

/// Top-level configuration
///
/// # Example
/// ```
/// use gyrocompass::config::ImuConfig;
///
/// let config = ImuConfig::from_toml_str("[averaging]\nwindow = 8\n").unwrap();
/// assert_eq!(config.averaging.window, 8);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImuConfig {
    pub clock: ClockConfig,
    pub averaging: AveragingConfig,
    pub calibration: CalibrationConfig,
    pub integration: IntegrationConfig,
    pub heading: HeadingConfig,
    pub motion: MotionConfig,
}

/// Sample clock configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Device clock ticks per second
    pub frequency_hz: f64,
}

/// Window averaging ahead of integration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AveragingConfig {
    /// Raw samples per averaged sample (1 disables averaging)
    pub window: usize,
}

/// Gyro bias calibration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Minimum number of averaged headings for a fit (never below 3)
    pub min_points: usize,
}

/// Attitude integration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntegrationConfig {
    pub method: IntegrationMethod,
}

/// Heading output
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    /// Mounting offset added to every heading (degrees)
    pub north_offset_degrees: f64,
}

/// Static (zero-motion) detection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Largest bias-corrected gyro magnitude still considered static (rad/s)
    pub gyro_threshold: f64,
    /// Expected magnitude of the accelerometer at rest
    pub gravity: f64,
    /// Allowed deviation of the accelerometer magnitude from `gravity`
    pub accel_tolerance: f64,
}

impl ImuConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ImuError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.clock.frequency()?;
        if self.averaging.window == 0 || self.averaging.window > MAX_AVERAGE_COUNT {
            return Err(ImuError::Config(format!(
                "averaging window must be between 1 and {}, got {}",
                MAX_AVERAGE_COUNT, self.averaging.window
            )));
        }
        if self.motion.gyro_threshold < 0.0 || self.motion.accel_tolerance < 0.0 {
            return Err(ImuError::Config(
                "motion thresholds must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl ClockConfig {
    pub fn frequency(&self) -> Result<ClockFrequency> {
        ClockFrequency::from_hz(self.frequency_hz)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_CLOCK_FREQUENCY_HZ,
        }
    }
}

impl Default for AveragingConfig {
    fn default() -> Self {
        Self { window: 1 }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            min_points: MIN_CALIBRATION_POINTS,
        }
    }
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            method: IntegrationMethod::FirstOrder,
        }
    }
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            north_offset_degrees: 0.0,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            gyro_threshold: 0.01,
            gravity: STANDARD_GRAVITY,
            accel_tolerance: 0.3,
        }
    }
}
