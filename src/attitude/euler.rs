use std::fmt;

use serde::{Deserialize, Serialize};

use super::Quaternion;

/// Roll, pitch and yaw in degrees
///
/// A read-only view of an attitude; integration always runs on the quaternion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    pub fn to_quaternion(&self) -> Quaternion {
        Quaternion::from_euler(
            self.roll.to_radians(),
            self.pitch.to_radians(),
            self.yaw.to_radians(),
        )
    }
}

impl fmt::Display for EulerAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "roll {:>8.3}° pitch {:>8.3}° yaw {:>8.3}°",
            self.roll, self.pitch, self.yaw
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrees_round_trip() {
        let angles = EulerAngles::new(10.0, -20.0, 150.0);
        let back = angles.to_quaternion().to_euler();
        assert!((back.roll - 10.0).abs() < 1e-9);
        assert!((back.pitch + 20.0).abs() < 1e-9);
        assert!((back.yaw - 150.0).abs() < 1e-9);
    }
}
