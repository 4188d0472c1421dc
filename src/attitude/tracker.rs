use super::{OrientationIntegrator, Quaternion};
use crate::sensor::RawSample;

/// Running attitude of one body
///
/// Owns the only state that outlives a single call: the current quaternion and
/// the timestamp of the last sample applied. The first sample only seeds the
/// timestamp.
#[derive(Debug, Clone)]
pub struct AttitudeTracker {
    integrator: OrientationIntegrator,
    attitude: Quaternion,
    last_timestamp: Option<u64>,
    steps: usize,
}

impl AttitudeTracker {
    pub fn new(integrator: OrientationIntegrator) -> Self {
        Self::with_initial(integrator, Quaternion::identity())
    }

    pub fn with_initial(integrator: OrientationIntegrator, initial: Quaternion) -> Self {
        Self {
            integrator,
            attitude: initial.normalized(),
            last_timestamp: None,
            steps: 0,
        }
    }

    /// Apply one bias-corrected sample and return the new attitude.
    pub fn update(&mut self, sample: &RawSample) -> Quaternion {
        match self.last_timestamp {
            None => {
                self.attitude = self.attitude.with_stamp(sample.stamp());
                self.last_timestamp = Some(sample.timestamp);
            }
            Some(previous) => {
                let next = self.integrator.integrate(&self.attitude, previous, sample);
                if sample.timestamp > previous {
                    self.attitude = next;
                    self.last_timestamp = Some(sample.timestamp);
                    self.steps += 1;
                }
            }
        }
        self.attitude
    }

    pub fn attitude(&self) -> &Quaternion {
        &self.attitude
    }

    pub fn last_timestamp(&self) -> Option<u64> {
        self.last_timestamp
    }

    /// Number of integration steps applied so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn reset(&mut self, attitude: Quaternion) {
        self.attitude = attitude.normalized();
        self.last_timestamp = None;
        self.steps = 0;
    }
}
