use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Three-axis reading in sensor body axes
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl Add for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Device timestamp and temperature carried alongside derived values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStamp {
    /// Device clock ticks
    pub timestamp: u64,
    pub temperature: f64,
}

/// One IMU reading as delivered by the device
///
/// Gyro rates are in rad/s, acceleration in the device's units (m/s² on the
/// reference board).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Monotonic device clock ticks
    pub timestamp: u64,
    pub temperature: f64,
    pub gyro: Vector3,
    pub accel: Vector3,
}

/// Mean over a window of raw samples; `timestamp` is the last one in the window.
pub type AveragedSample = RawSample;

impl RawSample {
    pub fn new(timestamp: u64, temperature: f64, gyro: Vector3, accel: Vector3) -> Self {
        Self {
            timestamp,
            temperature,
            gyro,
            accel,
        }
    }

    pub fn stamp(&self) -> SampleStamp {
        SampleStamp {
            timestamp: self.timestamp,
            temperature: self.temperature,
        }
    }

    pub fn horizontal_gyro(&self) -> GyroVector2D {
        GyroVector2D::new(self.gyro.x, self.gyro.y)
    }

    /// Copy of this sample with `offset` subtracted from the gyro axes
    pub fn with_gyro_offset_removed(&self, offset: Vector3) -> Self {
        Self {
            gyro: self.gyro - offset,
            ..*self
        }
    }
}

/// Horizontal (x, y) gyro components
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GyroVector2D {
    pub x: f64,
    pub y: f64,
}

impl GyroVector2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<&RawSample> for GyroVector2D {
    fn from(sample: &RawSample) -> Self {
        sample.horizontal_gyro()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gyro_offset_removal_keeps_other_fields() {
        let sample = RawSample::new(
            42,
            25.5,
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::new(0.0, 0.0, 9.8),
        );
        let corrected = sample.with_gyro_offset_removed(Vector3::new(0.5, 0.5, 0.5));

        assert_eq!(corrected.gyro, Vector3::new(0.5, 1.5, 2.5));
        assert_eq!(corrected.accel, sample.accel);
        assert_eq!(corrected.timestamp, 42);
        assert_eq!(corrected.temperature, 25.5);
    }

    #[test]
    fn test_vector_norm() {
        assert!((Vector3::new(3.0, 4.0, 12.0).norm() - 13.0).abs() < 1e-12);
        assert_eq!(Vector3::ZERO.norm(), 0.0);
    }
}
