//! Numeric constants shared by the calibration and attitude code.

/// Upper bound on the number of raw samples folded into one average.
pub const MAX_AVERAGE_COUNT: usize = 1000;

/// Minimum number of horizontal gyro points for a circle fit.
pub const MIN_CALIBRATION_POINTS: usize = 3;

/// Relative threshold below which the circle-fit normal matrix is treated as
/// singular. Scaled by the magnitude of the centered second moments.
pub const SINGULAR_DETERMINANT_EPSILON: f64 = 1e-12;

/// Tick rate of the reference board's sample clock in Hz.
pub const DEFAULT_CLOCK_FREQUENCY_HZ: f64 = 19_200_000.0;

/// Sidereal rotation rate of the Earth in rad/s.
pub const EARTH_ROTATION_RATE: f64 = 7.292_115e-5;

/// Standard gravity in m/s².
pub const STANDARD_GRAVITY: f64 = 9.806_65;
