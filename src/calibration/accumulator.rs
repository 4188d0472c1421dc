use crate::constants::MAX_AVERAGE_COUNT;
use crate::error::{ImuError, Result};
use crate::sensor::{AveragedSample, RawSample, SampleSource, Vector3};

/// Incremental mean over raw samples
///
/// Uses the running-mean update `m += (x - m) / k`, so a run of identical
/// values reproduces that value exactly and a single sample passes through
/// unchanged.
#[derive(Debug, Clone, Copy, Default)]
struct RunningMean {
    count: usize,
    last_timestamp: u64,
    temperature: f64,
    gyro: Vector3,
    accel: Vector3,
}

fn step(mean: f64, value: f64, k: f64) -> f64 {
    mean + (value - mean) / k
}

fn step_vec(mean: Vector3, value: Vector3, k: f64) -> Vector3 {
    Vector3::new(
        step(mean.x, value.x, k),
        step(mean.y, value.y, k),
        step(mean.z, value.z, k),
    )
}

impl RunningMean {
    fn push(self, sample: &RawSample) -> Self {
        let count = self.count + 1;
        let k = count as f64;
        Self {
            count,
            last_timestamp: sample.timestamp,
            temperature: step(self.temperature, sample.temperature, k),
            gyro: step_vec(self.gyro, sample.gyro, k),
            accel: step_vec(self.accel, sample.accel, k),
        }
    }

    fn finish(self) -> AveragedSample {
        AveragedSample {
            timestamp: self.last_timestamp,
            temperature: self.temperature,
            gyro: self.gyro,
            accel: self.accel,
        }
    }
}

fn validate_count(count: usize) -> Result<()> {
    if count == 0 || count > MAX_AVERAGE_COUNT {
        return Err(ImuError::InvalidArgument(format!(
            "sample count must be between 1 and {}, got {}",
            MAX_AVERAGE_COUNT, count
        )));
    }
    Ok(())
}

/// Average a run of samples held by the caller.
///
/// The slice length is the sample count and must lie in `1..=1000`.
pub fn average_samples(samples: &[RawSample]) -> Result<AveragedSample> {
    validate_count(samples.len())?;
    Ok(samples
        .iter()
        .fold(RunningMean::default(), RunningMean::push)
        .finish())
}

/// Pull `count` samples from `source` and average them.
///
/// All-or-nothing: if the source fails or ends early no average is returned.
pub fn average_from_source<S>(source: &mut S, count: usize) -> Result<AveragedSample>
where
    S: SampleSource + ?Sized,
{
    validate_count(count)?;

    let mut mean = RunningMean::default();
    for consumed in 0..count {
        let sample = match source.next_sample() {
            Ok(Some(sample)) => sample,
            Ok(None) => {
                log::warn!("Source ended after {} of {} samples", consumed, count);
                return Err(ImuError::SourceUnavailable(format!(
                    "source ended after {} of {} samples",
                    consumed, count
                )));
            }
            Err(e) => {
                log::warn!("Source failed after {} of {} samples: {}", consumed, count, e);
                return Err(match e {
                    ImuError::SourceUnavailable(_) => e,
                    other => ImuError::SourceUnavailable(other.to_string()),
                });
            }
        };
        mean = mean.push(&sample);
    }

    Ok(mean.finish())
}

/// Fixed-size averaging front end
///
/// Holds only the validated window size; every call is independent.
#[derive(Debug, Clone, Copy)]
pub struct SampleAccumulator {
    count: usize,
}

impl SampleAccumulator {
    pub fn new(count: usize) -> Result<Self> {
        validate_count(count)?;
        Ok(Self { count })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn average<S: SampleSource + ?Sized>(&self, source: &mut S) -> Result<AveragedSample> {
        average_from_source(source, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::VecSource;

    fn constant_sample(ts: u64) -> RawSample {
        RawSample::new(
            ts,
            23.7,
            Vector3::new(0.1, -0.3, 0.7),
            Vector3::new(0.01, 0.02, 9.81),
        )
    }

    #[test]
    fn test_constant_run_averages_exactly() {
        for n in [1, 2, 3, 7, 10, 999, 1000] {
            let samples: Vec<RawSample> = (0..n).map(|i| constant_sample(i as u64)).collect();
            let avg = average_samples(&samples).unwrap();

            assert_eq!(avg.gyro, samples[0].gyro, "n = {}", n);
            assert_eq!(avg.accel, samples[0].accel, "n = {}", n);
            assert_eq!(avg.temperature, samples[0].temperature, "n = {}", n);
            assert_eq!(avg.timestamp, (n - 1) as u64);
        }
    }

    #[test]
    fn test_single_sample_unchanged() {
        let sample = RawSample::new(
            77,
            -1.25,
            Vector3::new(1e-5, 3.3, -0.001),
            Vector3::new(4.0, 5.0, 6.0),
        );
        assert_eq!(average_samples(&[sample]).unwrap(), sample);
    }

    #[test]
    fn test_mean_and_last_timestamp() {
        let samples = [
            RawSample::new(100, 10.0, Vector3::new(1.0, 2.0, 3.0), Vector3::ZERO),
            RawSample::new(50, 20.0, Vector3::new(3.0, 4.0, 5.0), Vector3::ZERO),
        ];
        let avg = average_samples(&samples).unwrap();

        assert_eq!(avg.timestamp, 50);
        assert!((avg.temperature - 15.0).abs() < 1e-12);
        assert!((avg.gyro.x - 2.0).abs() < 1e-12);
        assert!((avg.gyro.y - 3.0).abs() < 1e-12);
        assert!((avg.gyro.z - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_count_out_of_range() {
        assert!(matches!(
            average_samples(&[]),
            Err(ImuError::InvalidArgument(_))
        ));

        let samples = vec![constant_sample(0); 1001];
        assert!(matches!(
            average_samples(&samples),
            Err(ImuError::InvalidArgument(_))
        ));

        let mut source = VecSource::new(samples);
        assert!(matches!(
            average_from_source(&mut source, 0),
            Err(ImuError::InvalidArgument(_))
        ));
        assert!(matches!(
            average_from_source(&mut source, 1001),
            Err(ImuError::InvalidArgument(_))
        ));
        // Nothing was consumed by the rejected calls
        assert_eq!(source.remaining(), 1001);
    }

    #[test]
    fn test_short_source_is_all_or_nothing() {
        let mut source = VecSource::new(vec![constant_sample(0); 5]);
        let result = average_from_source(&mut source, 10);
        assert!(matches!(result, Err(ImuError::SourceUnavailable(_))));
    }

    #[test]
    fn test_accumulator_consumes_window() {
        let mut source = VecSource::new((0..8).map(constant_sample).collect());
        let accumulator = SampleAccumulator::new(4).unwrap();

        assert_eq!(accumulator.average(&mut source).unwrap().timestamp, 3);
        assert_eq!(accumulator.average(&mut source).unwrap().timestamp, 7);
        assert!(accumulator.average(&mut source).is_err());
    }
}
