use crate::calibration::GyroBias;
use crate::config::ClockFrequency;
use crate::constants::{EARTH_ROTATION_RATE, STANDARD_GRAVITY};
use crate::sensor::{RawSample, Vector3};

use super::{NoiseConfig, apply_noise};

/// Stationary IMU on a level turntable
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct TurntableConfig {
    pub latitude_degrees: f64,
    /// Rotation rate sensed by the gyro (rad/s)
    pub rotation_rate: f64,
    pub bias: GyroBias,
    pub gravity: f64,
    pub temperature: f64,
    pub sample_rate_hz: f64,
    pub clock_frequency_hz: f64,
}

impl Default for TurntableConfig {
    fn default() -> Self {
        Self {
            latitude_degrees: 35.0,
            rotation_rate: EARTH_ROTATION_RATE,
            bias: GyroBias::default(),
            gravity: STANDARD_GRAVITY,
            temperature: 25.0,
            sample_rate_hz: 960.0,
            clock_frequency_hz: crate::constants::DEFAULT_CLOCK_FREQUENCY_HZ,
        }
    }
}

impl TurntableConfig {
    /// Horizontal rate magnitude the bias fit should find as its radius
    pub fn horizontal_rate(&self) -> f64 {
        self.rotation_rate * self.latitude_degrees.to_radians().cos()
    }

    /// True (bias-free) angular rate seen with the y axis at `heading_degrees`
    pub fn true_rate(&self, heading_degrees: f64) -> Vector3 {
        let h = self.horizontal_rate();
        let (s, c) = heading_degrees.to_radians().sin_cos();
        Vector3::new(
            -h * s,
            h * c,
            self.rotation_rate * self.latitude_degrees.to_radians().sin(),
        )
    }

    fn tick_step(&self) -> f64 {
        self.clock_frequency_hz / self.sample_rate_hz
    }
}

/// `count` noise-free samples at one heading, starting at `start_tick`.
pub fn generate_heading_samples(
    config: &TurntableConfig,
    heading_degrees: f64,
    count: usize,
    start_tick: u64,
) -> Vec<RawSample> {
    let gyro = config.true_rate(heading_degrees) + config.bias.as_vector();
    let accel = Vector3::new(0.0, 0.0, config.gravity);
    let step = config.tick_step();

    (0..count)
        .map(|i| {
            let timestamp = start_tick + (i as f64 * step).round() as u64;
            RawSample::new(timestamp, config.temperature, gyro, accel)
        })
        .collect()
}

/// One block of samples per heading, each with its own derived noise seed.
pub fn generate_turntable_run(
    config: &TurntableConfig,
    headings: &[f64],
    samples_per_heading: usize,
    noise: &NoiseConfig,
) -> Vec<Vec<RawSample>> {
    let block_ticks = (samples_per_heading as f64 * config.tick_step()).round() as u64;

    headings
        .iter()
        .enumerate()
        .map(|(i, &heading)| {
            let start = i as u64 * block_ticks;
            let mut samples = generate_heading_samples(config, heading, samples_per_heading, start);
            let block_noise = match noise.seed {
                Some(seed) => noise.clone().with_seed(seed.wrapping_add(i as u64)),
                None => noise.clone(),
            };
            apply_noise(&mut samples, &block_noise);
            samples
        })
        .collect()
}

/// Samples of a constant angular rate, `dt_secs` apart, the first one
/// `dt_secs` after `start_tick`.
pub fn constant_rate_samples(
    rate: Vector3,
    clock: ClockFrequency,
    dt_secs: f64,
    count: usize,
    start_tick: u64,
) -> Vec<RawSample> {
    let step = clock.secs_to_ticks(dt_secs);
    (1..=count as u64)
        .map(|k| {
            RawSample::new(
                start_tick + k * step,
                25.0,
                rate,
                Vector3::new(0.0, 0.0, STANDARD_GRAVITY),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading::heading_degrees;
    use crate::sensor::GyroVector2D;

    #[test]
    fn test_true_rate_points_north() {
        let config = TurntableConfig::default();
        for heading in [0.0, 45.0, 90.0, 200.0, 315.0] {
            let rate = config.true_rate(heading);
            let measured = heading_degrees(GyroVector2D::new(rate.x, rate.y));
            assert!((measured - heading).abs() < 1e-9, "{} vs {}", measured, heading);
        }
    }

    #[test]
    fn test_samples_carry_bias_and_timestamps() {
        let config = TurntableConfig {
            bias: GyroBias::new(0.01, 0.02, 0.03),
            sample_rate_hz: 100.0,
            clock_frequency_hz: 1000.0,
            ..TurntableConfig::default()
        };
        let samples = generate_heading_samples(&config, 0.0, 3, 500);

        assert_eq!(
            samples.iter().map(|s| s.timestamp).collect::<Vec<_>>(),
            vec![500, 510, 520]
        );
        assert!((samples[0].gyro.x - 0.01).abs() < 1e-12);
        assert!((samples[0].gyro.y - 0.02 - config.horizontal_rate()).abs() < 1e-12);
    }

    #[test]
    fn test_run_blocks_do_not_overlap() {
        let config = TurntableConfig::default();
        let run = generate_turntable_run(&config, &[0.0, 120.0, 240.0], 10, &NoiseConfig::default());
        assert_eq!(run.len(), 3);
        assert!(run[1][0].timestamp > run[0][9].timestamp);
        assert!(run[2][0].timestamp > run[1][9].timestamp);
    }

    #[test]
    fn test_constant_rate_spacing() {
        let clock = ClockFrequency::from_hz(19_200_000.0).unwrap();
        let samples = constant_rate_samples(Vector3::new(0.01, 0.0, 0.0), clock, 0.01, 3, 0);
        assert_eq!(
            samples.iter().map(|s| s.timestamp).collect::<Vec<_>>(),
            vec![192_000, 384_000, 576_000]
        );
    }
}
