use crate::config::MotionConfig;
use crate::sensor::RawSample;

/// Zero-motion test for a bias-corrected sample
///
/// A sample is static when the gyro magnitude is under `gyro_threshold` and
/// the accelerometer magnitude is within `accel_tolerance` of `gravity`.
#[derive(Debug, Clone, Copy)]
pub struct StaticDetector {
    gyro_threshold: f64,
    gravity: f64,
    accel_tolerance: f64,
}

impl StaticDetector {
    pub fn new(config: &MotionConfig) -> Self {
        Self {
            gyro_threshold: config.gyro_threshold,
            gravity: config.gravity,
            accel_tolerance: config.accel_tolerance,
        }
    }

    pub fn is_static(&self, corrected: &RawSample) -> bool {
        corrected.gyro.norm() < self.gyro_threshold
            && (corrected.accel.norm() - self.gravity).abs() <= self.accel_tolerance
    }
}

impl Default for StaticDetector {
    fn default() -> Self {
        Self::new(&MotionConfig::default())
    }
}
