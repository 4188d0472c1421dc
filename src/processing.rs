use serde::Serialize;

use crate::attitude::{AttitudeTracker, EulerAngles, OrientationIntegrator, Quaternion, StaticDetector};
use crate::calibration::{GyroBias, average_samples};
use crate::config::{ClockFrequency, ImuConfig};
use crate::error::Result;
use crate::heading::HeadingCalculator;
use crate::sensor::{RawSample, SampleSource, Vector3};

/// One processed (averaged, bias-corrected, integrated) sample
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OrientationRecord {
    /// Device clock ticks of the last raw sample in the window
    pub timestamp: u64,
    pub timestamp_secs: f64,
    pub temperature: f64,
    pub quaternion: Quaternion,
    pub euler: EulerAngles,
    /// Bias-corrected angular rate
    pub gyro: Vector3,
    pub accel: Vector3,
    /// Gyrocompass heading; only produced while static
    pub heading: Option<f64>,
    pub is_static: bool,
}

/// Sample-by-sample pipeline: window averaging, bias removal, attitude
/// tracking, static detection and heading.
pub struct AttitudeProcessor {
    window: usize,
    pending: Vec<RawSample>,
    bias: GyroBias,
    clock: ClockFrequency,
    tracker: AttitudeTracker,
    heading: HeadingCalculator,
    detector: StaticDetector,
}

impl AttitudeProcessor {
    pub fn new(config: &ImuConfig, bias: GyroBias) -> Result<Self> {
        config.validate()?;
        let clock = config.clock.frequency()?;
        let integrator = OrientationIntegrator::new(clock, &config.integration);

        Ok(Self {
            window: config.averaging.window,
            pending: Vec::with_capacity(config.averaging.window),
            bias,
            clock,
            tracker: AttitudeTracker::new(integrator),
            heading: HeadingCalculator::new(&config.heading),
            detector: StaticDetector::new(&config.motion),
        })
    }

    /// Feed one raw sample; returns a record each time a window completes.
    pub fn process_sample(&mut self, sample: &RawSample) -> Result<Option<OrientationRecord>> {
        self.pending.push(*sample);
        if self.pending.len() < self.window {
            return Ok(None);
        }

        let averaged = average_samples(&self.pending)?;
        self.pending.clear();
        Ok(Some(self.process_averaged(&averaged)))
    }

    fn process_averaged(&mut self, averaged: &RawSample) -> OrientationRecord {
        let corrected = self.bias.correct(averaged);
        let quaternion = self.tracker.update(&corrected);
        let is_static = self.detector.is_static(&corrected);
        let heading = is_static.then(|| {
            self.heading
                .heading(averaged.horizontal_gyro(), &self.bias)
        });

        OrientationRecord {
            timestamp: averaged.timestamp,
            timestamp_secs: self.clock.ticks_to_secs(averaged.timestamp),
            temperature: averaged.temperature,
            quaternion,
            euler: quaternion.to_euler(),
            gyro: corrected.gyro,
            accel: corrected.accel,
            heading,
            is_static,
        }
    }

    /// Drain `source`, passing each record to `emit`. Returns the record count.
    ///
    /// A trailing partial window is discarded.
    pub fn process_source<S, F>(&mut self, source: &mut S, mut emit: F) -> Result<usize>
    where
        S: SampleSource + ?Sized,
        F: FnMut(&OrientationRecord),
    {
        let mut count = 0;
        while let Some(sample) = source.next_sample()? {
            if let Some(record) = self.process_sample(&sample)? {
                emit(&record);
                count += 1;
            }
        }

        if !self.pending.is_empty() {
            log::debug!(
                "Discarding {} samples of an incomplete window",
                self.pending.len()
            );
            self.pending.clear();
        }
        Ok(count)
    }

    pub fn attitude(&self) -> &Quaternion {
        self.tracker.attitude()
    }

    pub fn bias(&self) -> &GyroBias {
        &self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STANDARD_GRAVITY;
    use crate::sensor::VecSource;

    fn config(window: usize) -> ImuConfig {
        let mut config = ImuConfig::default();
        config.clock.frequency_hz = 1000.0;
        config.averaging.window = window;
        config
    }

    fn resting(ts: u64, gyro: Vector3) -> RawSample {
        RawSample::new(ts, 22.0, gyro, Vector3::new(0.0, 0.0, STANDARD_GRAVITY))
    }

    #[test]
    fn test_window_emits_every_n_samples() {
        let mut processor = AttitudeProcessor::new(&config(4), GyroBias::default()).unwrap();
        let samples: Vec<RawSample> = (0..10).map(|i| resting(i * 10, Vector3::ZERO)).collect();

        let mut timestamps = Vec::new();
        let count = processor
            .process_source(&mut VecSource::new(samples), |r| timestamps.push(r.timestamp))
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(timestamps, vec![30, 70]);
    }

    #[test]
    fn test_bias_removed_and_heading_reported_when_static() {
        let bias = GyroBias::new(0.002, -0.001, 0.0005);
        let mut processor = AttitudeProcessor::new(&config(1), bias).unwrap();

        // Earth-rate-sized horizontal vector pointing along -x: heading 90°
        let raw = resting(0, Vector3::new(0.002 - 5e-5, -0.001, 0.0005));
        let record = processor.process_sample(&raw).unwrap().unwrap();

        assert!(record.is_static);
        assert!((record.gyro.x + 5e-5).abs() < 1e-12);
        assert!(record.gyro.y.abs() < 1e-12);
        let heading = record.heading.unwrap();
        assert!((heading - 90.0).abs() < 1e-6, "heading {}", heading);
    }

    #[test]
    fn test_moving_sample_has_no_heading() {
        let mut processor = AttitudeProcessor::new(&config(1), GyroBias::default()).unwrap();
        let record = processor
            .process_sample(&resting(0, Vector3::new(0.0, 0.0, 0.5)))
            .unwrap()
            .unwrap();
        assert!(!record.is_static);
        assert!(record.heading.is_none());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut bad = config(1);
        bad.clock.frequency_hz = -1.0;
        assert!(AttitudeProcessor::new(&bad, GyroBias::default()).is_err());
    }
}
