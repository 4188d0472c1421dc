//! Gyrocompass heading.
//!
//! With the bias removed, the horizontal gyro vector is the horizontal part of
//! the Earth's rotation, which points north. The heading of the sensor's
//! y axis, clockwise from north, is then `atan2(-x, y)`.

use crate::calibration::GyroBias;
use crate::config::HeadingConfig;
use crate::sensor::GyroVector2D;

/// Wrap an angle in degrees into [0, 360).
///
/// NaN passes through.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round tiny negative inputs up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Heading in degrees [0, 360) of an already bias-corrected vector.
pub fn heading_degrees(corrected: GyroVector2D) -> f64 {
    normalize_degrees((-corrected.x).atan2(corrected.y).to_degrees())
}

/// Heading in degrees [0, 360) of a raw horizontal vector given its bias.
pub fn heading_from_raw(raw: GyroVector2D, bias: &GyroBias) -> f64 {
    heading_degrees(GyroVector2D::new(raw.x - bias.x, raw.y - bias.y))
}

/// Heading calculator with a fixed mounting offset
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingCalculator {
    north_offset_degrees: f64,
}

impl HeadingCalculator {
    pub fn new(config: &HeadingConfig) -> Self {
        Self {
            north_offset_degrees: config.north_offset_degrees,
        }
    }

    pub fn heading(&self, raw: GyroVector2D, bias: &GyroBias) -> f64 {
        normalize_degrees(heading_from_raw(raw, bias) + self.north_offset_degrees)
    }
}
