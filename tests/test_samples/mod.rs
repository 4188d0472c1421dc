#![allow(dead_code)]

use tempfile::NamedTempFile;

use gyrocompass::calibration::GyroBias;
use gyrocompass::sensor::{AveragedSample, RawSample, Vector3, write_records};

/// Averaged samples whose horizontal gyro lies on a circle of `radius`
/// around `bias`, one per heading, evenly spread from `start_deg`.
pub fn circle_samples(
    bias: GyroBias,
    radius: f64,
    count: usize,
    start_deg: f64,
) -> Vec<AveragedSample> {
    (0..count)
        .map(|i| {
            let angle = (start_deg + 360.0 * i as f64 / count as f64).to_radians();
            RawSample::new(
                i as u64,
                25.0,
                Vector3::new(
                    bias.x - radius * angle.sin(),
                    bias.y + radius * angle.cos(),
                    bias.z,
                ),
                Vector3::new(0.0, 0.0, 9.8),
            )
        })
        .collect()
}

/// Binary log holding `samples`, deleted when the handle drops.
pub fn log_file(samples: &[RawSample]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write_records(file.as_file_mut(), samples).unwrap();
    file
}
