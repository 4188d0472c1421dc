use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::sensor::{RawSample, Vector3};

/// Gaussian sensor noise, per axis
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    /// Standard deviation of gyro noise (rad/s)
    #[serde(default)]
    pub gyro_std: f64,
    /// Standard deviation of accelerometer noise
    #[serde(default)]
    pub accel_std: f64,
    /// Standard deviation of temperature noise (°C)
    #[serde(default)]
    pub temperature_std: f64,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_gyro_std(mut self, std: f64) -> Self {
        self.gyro_std = std;
        self
    }

    pub fn with_accel_std(mut self, std: f64) -> Self {
        self.accel_std = std;
        self
    }

    pub fn is_silent(&self) -> bool {
        self.gyro_std <= 0.0 && self.accel_std <= 0.0 && self.temperature_std <= 0.0
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

fn normal(std: f64) -> Option<Normal<f64>> {
    if std > 0.0 { Normal::new(0.0, std).ok() } else { None }
}

fn perturb(value: Vector3, dist: &Option<Normal<f64>>, rng: &mut ChaCha8Rng) -> Vector3 {
    match dist {
        Some(d) => Vector3::new(
            value.x + d.sample(rng),
            value.y + d.sample(rng),
            value.z + d.sample(rng),
        ),
        None => value,
    }
}

/// Add noise to every sample in place.
pub fn apply_noise(samples: &mut [RawSample], config: &NoiseConfig) {
    if config.is_silent() {
        return;
    }

    let mut rng = create_rng(config.seed);
    let gyro = normal(config.gyro_std);
    let accel = normal(config.accel_std);
    let temperature = normal(config.temperature_std);

    for sample in samples.iter_mut() {
        sample.gyro = perturb(sample.gyro, &gyro, &mut rng);
        sample.accel = perturb(sample.accel, &accel, &mut rng);
        if let Some(d) = &temperature {
            sample.temperature += d.sample(&mut rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(count: usize) -> Vec<RawSample> {
        vec![RawSample::new(0, 25.0, Vector3::ZERO, Vector3::new(0.0, 0.0, 9.8)); count]
    }

    #[test]
    fn test_silent_config_is_noop() {
        let mut samples = flat(10);
        apply_noise(&mut samples, &NoiseConfig::default());
        assert_eq!(samples, flat(10));
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let config = NoiseConfig::default().with_seed(7).with_gyro_std(0.01);
        let mut a = flat(50);
        let mut b = flat(50);
        apply_noise(&mut a, &config);
        apply_noise(&mut b, &config);
        assert_eq!(a, b);
        assert!(a.iter().any(|s| s.gyro.x != 0.0));
        assert!(a.iter().all(|s| s.accel == Vector3::new(0.0, 0.0, 9.8)));
    }

    #[test]
    fn test_gyro_noise_spread() {
        let config = NoiseConfig::default().with_seed(11).with_gyro_std(0.02);
        let mut samples = flat(5000);
        apply_noise(&mut samples, &config);

        let mean = samples.iter().map(|s| s.gyro.y).sum::<f64>() / samples.len() as f64;
        let var = samples
            .iter()
            .map(|s| (s.gyro.y - mean).powi(2))
            .sum::<f64>()
            / samples.len() as f64;
        assert!(mean.abs() < 0.002, "mean {}", mean);
        assert!((var.sqrt() - 0.02).abs() < 0.002, "std {}", var.sqrt());
    }
}
