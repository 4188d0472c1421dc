use super::Quaternion;
use crate::config::{ClockFrequency, IntegrationConfig, IntegrationMethod};
use crate::sensor::{RawSample, Vector3};

/// Propagates an attitude quaternion by one gyro sample
///
/// Stateless: the caller keeps the attitude and the previous timestamp. The
/// gyro reading must already have its bias removed.
#[derive(Debug, Clone, Copy)]
pub struct OrientationIntegrator {
    clock: ClockFrequency,
    method: IntegrationMethod,
}

impl OrientationIntegrator {
    pub fn new(clock: ClockFrequency, config: &IntegrationConfig) -> Self {
        Self {
            clock,
            method: config.method,
        }
    }

    pub fn clock(&self) -> ClockFrequency {
        self.clock
    }

    /// Incremental rotation for angular rate `omega` (rad/s) over `dt` seconds.
    pub fn delta_rotation(&self, omega: Vector3, dt: f64) -> Quaternion {
        match self.method {
            IntegrationMethod::FirstOrder => {
                let half = 0.5 * dt;
                Quaternion::new(1.0, omega.x * half, omega.y * half, omega.z * half).normalized()
            }
            IntegrationMethod::AxisAngle => {
                Quaternion::from_axis_angle([omega.x, omega.y, omega.z], omega.norm() * dt)
            }
        }
    }

    /// Advance `attitude` to `sample.timestamp`.
    ///
    /// Returns `attitude` untouched when the elapsed time is zero or negative
    /// (duplicate timestamp or clock rollback).
    pub fn integrate(
        &self,
        attitude: &Quaternion,
        previous_timestamp: u64,
        sample: &RawSample,
    ) -> Quaternion {
        let dt = self.clock.elapsed_secs(previous_timestamp, sample.timestamp);
        if dt <= 0.0 {
            log::debug!(
                "Skipping integration step: dt = {:e}s ({} -> {})",
                dt,
                previous_timestamp,
                sample.timestamp
            );
            return *attitude;
        }

        let delta = self.delta_rotation(sample.gyro, dt).with_stamp(sample.stamp());
        attitude.compose(&delta).normalized()
    }
}
