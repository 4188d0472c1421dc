//! Binary sample log layout.
//!
//! Each record is 32 bytes, little-endian:
//!
//! | offset | type  | field                   |
//! |--------|-------|-------------------------|
//! | 0      | `u32` | timestamp (clock ticks) |
//! | 4      | `f32` | temperature             |
//! | 8      | `f32` | gyro x, y, z (rad/s)    |
//! | 20     | `f32` | accel x, y, z           |

use std::io::Write;

use super::{RawSample, Vector3};
use crate::error::{ImuError, Result};

pub const RECORD_SIZE: usize = 32;

fn read_f32(bytes: &[u8], offset: usize) -> f64 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    f32::from_le_bytes(word) as f64
}

/// Decode one log record.
pub fn decode_record(bytes: &[u8]) -> Result<RawSample> {
    if bytes.len() != RECORD_SIZE {
        return Err(ImuError::InvalidRecord {
            expected: RECORD_SIZE,
            actual: bytes.len(),
        });
    }

    let timestamp = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64;

    Ok(RawSample {
        timestamp,
        temperature: read_f32(bytes, 4),
        gyro: Vector3::new(read_f32(bytes, 8), read_f32(bytes, 12), read_f32(bytes, 16)),
        accel: Vector3::new(read_f32(bytes, 20), read_f32(bytes, 24), read_f32(bytes, 28)),
    })
}

/// Encode a sample in the log layout.
///
/// The timestamp is truncated to 32 bits and the floating fields to single
/// precision, matching what the device writes.
pub fn encode_record(sample: &RawSample) -> [u8; RECORD_SIZE] {
    let mut out = [0u8; RECORD_SIZE];
    out[0..4].copy_from_slice(&(sample.timestamp as u32).to_le_bytes());

    let fields = [
        sample.temperature,
        sample.gyro.x,
        sample.gyro.y,
        sample.gyro.z,
        sample.accel.x,
        sample.accel.y,
        sample.accel.z,
    ];
    for (i, value) in fields.iter().enumerate() {
        let offset = 4 + i * 4;
        out[offset..offset + 4].copy_from_slice(&(*value as f32).to_le_bytes());
    }
    out
}

/// Write a run of samples to a log stream.
pub fn write_records<W: Write>(writer: &mut W, samples: &[RawSample]) -> Result<()> {
    for sample in samples {
        writer.write_all(&encode_record(sample))?;
    }
    writer.flush()?;
    Ok(())
}
