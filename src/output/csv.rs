use super::{Formatter, optional};
use crate::processing::OrientationRecord;

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, record: &OrientationRecord) -> String {
        let q = &record.quaternion;
        format!(
            "{:.6},{:.2},{:.8},{:.8},{:.8},{:.8},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{},{}",
            record.timestamp_secs,
            record.temperature,
            q.q0,
            q.q1,
            q.q2,
            q.q3,
            record.euler.roll,
            record.euler.pitch,
            record.euler.yaw,
            record.accel.x,
            record.accel.y,
            record.accel.z,
            optional(record.heading, 2, ""),
            record.is_static as u8
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some("ts,temp,q0,q1,q2,q3,roll,pitch,yaw,ax,ay,az,heading,static")
    }
}
