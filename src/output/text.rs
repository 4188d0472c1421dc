use super::{Formatter, optional};
use crate::processing::OrientationRecord;

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &OrientationRecord) -> String {
        let heading = optional(record.heading, 1, "-");
        if self.verbose {
            let q = &record.quaternion;
            format!(
                "{:>12.6}s {} heading: {:>5}° {} q=[{:.6}, {:.6}, {:.6}, {:.6}] gyro=({:.6}, {:.6}, {:.6}) temp: {:.2}",
                record.timestamp_secs,
                record.euler,
                heading,
                if record.is_static { "static" } else { "moving" },
                q.q0,
                q.q1,
                q.q2,
                q.q3,
                record.gyro.x,
                record.gyro.y,
                record.gyro.z,
                record.temperature
            )
        } else {
            format!(
                "{:>12.6}s {} heading: {:>5}°",
                record.timestamp_secs, record.euler, heading
            )
        }
    }
}
