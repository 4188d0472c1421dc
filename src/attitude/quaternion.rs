use std::ops::Mul;

use serde::{Deserialize, Serialize};

use super::EulerAngles;
use crate::sensor::SampleStamp;

/// Scalar-first attitude quaternion
///
/// Rotation from the reference frame (sensor power-up) to the body frame.
/// Components are stored as given; call [`Quaternion::normalize`] to obtain a
/// unit quaternion. `stamp` is bookkeeping copied from the sample that
/// produced the value and takes no part in the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub q0: f64,
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    #[serde(default)]
    pub stamp: SampleStamp,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    pub const fn identity() -> Self {
        Self {
            q0: 1.0,
            q1: 0.0,
            q2: 0.0,
            q3: 0.0,
            stamp: SampleStamp {
                timestamp: 0,
                temperature: 0.0,
            },
        }
    }

    /// Build from raw components without normalizing.
    pub fn new(q0: f64, q1: f64, q2: f64, q3: f64) -> Self {
        Self {
            q0,
            q1,
            q2,
            q3,
            stamp: SampleStamp::default(),
        }
    }

    pub fn with_stamp(mut self, stamp: SampleStamp) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn components(&self) -> [f64; 4] {
        [self.q0, self.q1, self.q2, self.q3]
    }

    pub fn norm(&self) -> f64 {
        (self.q0 * self.q0 + self.q1 * self.q1 + self.q2 * self.q2 + self.q3 * self.q3).sqrt()
    }

    /// Scale to unit length in place. A zero quaternion becomes the identity.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm == 0.0 {
            let stamp = self.stamp;
            *self = Self::identity().with_stamp(stamp);
            return;
        }
        self.q0 /= norm;
        self.q1 /= norm;
        self.q2 /= norm;
        self.q3 /= norm;
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    pub fn conjugate(&self) -> Self {
        Self {
            q0: self.q0,
            q1: -self.q1,
            q2: -self.q2,
            q3: -self.q3,
            stamp: self.stamp,
        }
    }

    /// Hamilton product `self ⊗ other`.
    ///
    /// Applies `other` in the frame already rotated by `self`. The result
    /// carries `other`'s stamp.
    pub fn compose(&self, other: &Quaternion) -> Quaternion {
        let (a0, a1, a2, a3) = (self.q0, self.q1, self.q2, self.q3);
        let (b0, b1, b2, b3) = (other.q0, other.q1, other.q2, other.q3);
        Quaternion {
            q0: a0 * b0 - a1 * b1 - a2 * b2 - a3 * b3,
            q1: a0 * b1 + a1 * b0 + a2 * b3 - a3 * b2,
            q2: a0 * b2 - a1 * b3 + a2 * b0 + a3 * b1,
            q3: a0 * b3 + a1 * b2 - a2 * b1 + a3 * b0,
            stamp: other.stamp,
        }
    }

    /// Roll/pitch/yaw in degrees.
    ///
    /// Pitch is clamped to ±90° at gimbal lock instead of leaving the domain
    /// of `asin`.
    pub fn to_euler(&self) -> EulerAngles {
        let (q0, q1, q2, q3) = (self.q0, self.q1, self.q2, self.q3);

        let roll = (2.0 * (q0 * q1 + q2 * q3)).atan2(1.0 - 2.0 * (q1 * q1 + q2 * q2));

        let sin_pitch = 2.0 * (q0 * q2 - q3 * q1);
        let pitch = if sin_pitch.abs() >= 1.0 {
            90.0_f64.copysign(sin_pitch)
        } else {
            sin_pitch.asin().to_degrees()
        };

        let yaw = (2.0 * (q0 * q3 + q1 * q2)).atan2(1.0 - 2.0 * (q2 * q2 + q3 * q3));

        EulerAngles {
            roll: roll.to_degrees(),
            pitch,
            yaw: yaw.to_degrees(),
        }
    }

    /// ZYX construction from roll, pitch, yaw in radians, normalized.
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        let (sr, cr) = (roll * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sy, cy) = (yaw * 0.5).sin_cos();

        Self::new(
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        )
        .normalized()
    }

    /// Rotation of `angle` radians about `axis`; identity for a zero axis.
    pub fn from_axis_angle(axis: [f64; 3], angle: f64) -> Self {
        let norm = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
        if norm == 0.0 {
            return Self::identity();
        }
        let (s, c) = (angle * 0.5).sin_cos();
        let k = s / norm;
        Self::new(c, axis[0] * k, axis[1] * k, axis[2] * k)
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Quaternion {
        self.compose(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_quat_eq(a: &Quaternion, b: &Quaternion, eps: f64) {
        for (x, y) in a.components().iter().zip(b.components().iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = eps);
        }
    }

    #[test]
    fn test_identity() {
        let q = Quaternion::identity();
        assert_eq!(q.components(), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(Quaternion::default(), q);
    }

    #[test]
    fn test_new_is_not_normalized() {
        let q = Quaternion::new(2.0, 0.0, 0.0, 0.0);
        assert_eq!(q.norm(), 2.0);
    }

    #[test]
    fn test_normalize_unit_length() {
        for components in [
            [2.0, 0.0, 0.0, 0.0],
            [1.0, 2.0, 3.0, 4.0],
            [-0.3, 1e-4, 7.0, -2.5],
            [1e-8, 1e-8, 0.0, 1e-8],
        ] {
            let q = Quaternion::new(components[0], components[1], components[2], components[3])
                .normalized();
            assert_abs_diff_eq!(q.norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_normalize_zero_is_identity() {
        let stamp = SampleStamp {
            timestamp: 5,
            temperature: 21.0,
        };
        let q = Quaternion::new(0.0, 0.0, 0.0, 0.0)
            .with_stamp(stamp)
            .normalized();
        assert_eq!(q.components(), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(q.stamp, stamp);
    }

    #[test]
    fn test_compose_with_identity() {
        let q = Quaternion::from_euler(0.3, -0.2, 1.1);
        assert_quat_eq(&(q * Quaternion::identity()), &q, 1e-12);
        assert_quat_eq(&(Quaternion::identity() * q), &q, 1e-12);
    }

    #[test]
    fn test_compose_is_not_commutative() {
        let a = Quaternion::from_axis_angle([1.0, 0.0, 0.0], 0.5);
        let b = Quaternion::from_axis_angle([0.0, 1.0, 0.0], 0.5);
        let ab = a * b;
        let ba = b * a;
        assert!((ab.q3 - ba.q3).abs() > 1e-3);
    }

    #[test]
    fn test_compose_basis_products() {
        // i * j = k
        let i = Quaternion::new(0.0, 1.0, 0.0, 0.0);
        let j = Quaternion::new(0.0, 0.0, 1.0, 0.0);
        assert_eq!((i * j).components(), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!((j * i).components(), [0.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_compose_carries_right_stamp() {
        let left = Quaternion::identity().with_stamp(SampleStamp {
            timestamp: 1,
            temperature: 10.0,
        });
        let right = Quaternion::identity().with_stamp(SampleStamp {
            timestamp: 2,
            temperature: 20.0,
        });
        assert_eq!((left * right).stamp.timestamp, 2);
        assert_eq!((left * right).stamp.temperature, 20.0);
    }

    #[test]
    fn test_conjugate_inverts_unit_rotation() {
        let q = Quaternion::from_euler(0.4, 0.1, -2.0);
        assert_quat_eq(&(q * q.conjugate()), &Quaternion::identity(), 1e-12);
    }

    #[test]
    fn test_euler_round_trip() {
        for &roll in &[-170.0, -45.0, 0.0, 12.5, 90.0, 179.0] {
            for &pitch in &[-88.9, -30.0, 0.0, 45.0, 88.9] {
                for &yaw in &[-179.0, -90.0, 0.0, 33.0, 135.0] {
                    let q = Quaternion::from_euler(
                        f64::to_radians(roll),
                        f64::to_radians(pitch),
                        f64::to_radians(yaw),
                    );
                    assert_abs_diff_eq!(q.norm(), 1.0, epsilon = 1e-12);

                    let e = q.to_euler();
                    assert_abs_diff_eq!(e.roll, roll, epsilon = 1e-6);
                    assert_abs_diff_eq!(e.pitch, pitch, epsilon = 1e-6);
                    assert_abs_diff_eq!(e.yaw, yaw, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_gimbal_lock_clamps_pitch() {
        // Slightly denormalized quaternion whose pitch argument exceeds 1
        let q = Quaternion::new(0.7072, 0.0, 0.7072, 0.0);
        let e = q.to_euler();
        assert_eq!(e.pitch, 90.0);

        let q = Quaternion::new(0.7072, 0.0, -0.7072, 0.0);
        assert_eq!(q.to_euler().pitch, -90.0);
    }

    #[test]
    fn test_axis_angle_matches_euler() {
        let about_z = Quaternion::from_axis_angle([0.0, 0.0, 2.0], 1.0);
        let e = about_z.to_euler();
        assert_abs_diff_eq!(e.yaw, 1.0f64.to_degrees(), epsilon = 1e-9);
        assert_abs_diff_eq!(e.roll, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(e.pitch, 0.0, epsilon = 1e-9);

        assert_eq!(Quaternion::from_axis_angle([0.0; 3], 1.0), Quaternion::identity());
    }
}
