//! Gyro bias from a turntable rotation.
//!
//! While the body turns about the local vertical, the horizontal component of
//! a constant rotation rate (the Earth's, or the platform's) sweeps a circle in
//! gyro x/y space. The circle's center is the horizontal bias and its radius
//! the horizontal rate. The center comes from the algebraic (Kasa) fit
//!
//! ```text
//! x² + y² + D·x + E·y + F = 0
//! ```
//!
//! solved in the least-squares sense through its 3x3 normal equations. Points
//! are centered on their mean before the moments are formed; the fitted center
//! is shifted back afterwards.

use serde::{Deserialize, Serialize};

use super::solver::{Matrix3, solve_cramer};
use crate::config::CalibrationConfig;
use crate::constants::{MIN_CALIBRATION_POINTS, SINGULAR_DETERMINANT_EPSILON};
use crate::error::{ImuError, Result};
use crate::sensor::{AveragedSample, GyroVector2D, RawSample, Vector3};

/// Constant gyro offset, subtracted from raw readings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GyroBias {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GyroBias {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn as_vector(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn horizontal(&self) -> GyroVector2D {
        GyroVector2D::new(self.x, self.y)
    }

    /// Sample with this bias removed from its gyro axes
    pub fn correct(&self, sample: &RawSample) -> RawSample {
        sample.with_gyro_offset_removed(self.as_vector())
    }

    /// Parse a bias file (`x`, `y`, `z` keys, rad/s).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ImuError::Config(e.to_string()))
    }

    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ImuError::Config(e.to_string()))
    }
}

/// Result of the horizontal circle fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleFit {
    pub center: GyroVector2D,
    /// `cx² + cy² - F`; a genuine circle has this strictly positive
    pub radius_squared: f64,
}

/// Bias recovered from a calibration set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiasFit {
    pub bias: GyroBias,
    pub radius_squared: f64,
    pub points: usize,
}

impl BiasFit {
    pub fn is_valid(&self) -> bool {
        self.radius_squared > 0.0
    }

    /// Horizontal rotation rate seen by the gyro, NaN for an invalid fit
    pub fn radius(&self) -> f64 {
        if self.is_valid() {
            self.radius_squared.sqrt()
        } else {
            f64::NAN
        }
    }

    /// Turn an invalid fit into `DegenerateCalibration`, keeping the bias.
    pub fn validate(self) -> Result<Self> {
        if self.is_valid() {
            return Ok(self);
        }
        log::warn!(
            "Circle fit residual {:e} is not positive; bias ({:.6}, {:.6}, {:.6}) is unreliable",
            self.radius_squared,
            self.bias.x,
            self.bias.y,
            self.bias.z
        );
        Err(ImuError::DegenerateCalibration {
            reason: format!("non-positive fit residual {:e}", self.radius_squared),
            best_effort: Some(self.bias),
        })
    }
}

/// Centered second and third moments of a point set
#[derive(Debug, Clone, Copy, Default)]
struct CenteredMoments {
    n: f64,
    su: f64,
    sv: f64,
    suu: f64,
    svv: f64,
    suv: f64,
    suw: f64,
    svw: f64,
    sw: f64,
}

impl CenteredMoments {
    fn add(mut self, u: f64, v: f64) -> Self {
        let w = u * u + v * v;
        self.n += 1.0;
        self.su += u;
        self.sv += v;
        self.suu += u * u;
        self.svv += v * v;
        self.suv += u * v;
        self.suw += u * w;
        self.svw += v * w;
        self.sw += w;
        self
    }

    fn normal_matrix(&self) -> Matrix3 {
        [
            [self.suu, self.suv, self.su],
            [self.suv, self.svv, self.sv],
            [self.su, self.sv, self.n],
        ]
    }

    fn rhs(&self) -> [f64; 3] {
        [-self.suw, -self.svw, -self.sw]
    }

    fn singular_threshold(&self) -> f64 {
        let spread = self.suu + self.svv;
        SINGULAR_DETERMINANT_EPSILON * self.n * spread * spread
    }
}

fn mean_of(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    sum / count as f64
}

/// Least-squares circle through horizontal gyro points.
///
/// Needs at least three points; collinear or coincident points fail with
/// `DegenerateCalibration`. The radius check is left to the caller.
pub fn fit_circle(points: &[GyroVector2D]) -> Result<CircleFit> {
    if points.len() < MIN_CALIBRATION_POINTS {
        return Err(ImuError::InvalidArgument(format!(
            "circle fit needs at least {} points, got {}",
            MIN_CALIBRATION_POINTS,
            points.len()
        )));
    }

    let mx = mean_of(points.iter().map(|p| p.x));
    let my = mean_of(points.iter().map(|p| p.y));

    let moments = points
        .iter()
        .fold(CenteredMoments::default(), |m, p| m.add(p.x - mx, p.y - my));

    let Some(t) = solve_cramer(
        &moments.normal_matrix(),
        &moments.rhs(),
        moments.singular_threshold(),
    ) else {
        return Err(ImuError::DegenerateCalibration {
            reason: "points are collinear or coincident".to_string(),
            best_effort: None,
        });
    };

    let cu = -t[0] / 2.0;
    let cv = -t[1] / 2.0;
    let radius_squared = cu * cu + cv * cv - t[2];

    log::debug!(
        "Circle fit over {} points: center offset ({:e}, {:e}), r² = {:e}",
        points.len(),
        cu,
        cv,
        radius_squared
    );

    Ok(CircleFit {
        center: GyroVector2D::new(mx + cu, my + cv),
        radius_squared,
    })
}

/// Turntable gyro bias estimator
///
/// The calibration set should span a wide range of headings; three points
/// bunched within a few degrees fit a circle but a badly conditioned one.
#[derive(Debug, Clone, Copy)]
pub struct GyroBiasEstimator {
    min_points: usize,
}

impl GyroBiasEstimator {
    pub fn new(config: &CalibrationConfig) -> Self {
        Self {
            min_points: config.min_points.max(MIN_CALIBRATION_POINTS),
        }
    }

    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// Fit the bias from averaged samples taken at different headings.
    ///
    /// On a non-positive residual the error carries the computed bias (see
    /// [`ImuError::best_effort_bias`]).
    pub fn estimate(&self, samples: &[AveragedSample]) -> Result<BiasFit> {
        if samples.len() < self.min_points {
            return Err(ImuError::InvalidArgument(format!(
                "calibration needs at least {} averaged samples, got {}",
                self.min_points,
                samples.len()
            )));
        }

        let z = mean_of(samples.iter().map(|s| s.gyro.z));
        let points: Vec<GyroVector2D> = samples.iter().map(GyroVector2D::from).collect();

        let circle = fit_circle(&points).map_err(|e| match e {
            ImuError::DegenerateCalibration { reason, .. } => {
                log::warn!("Gyro bias fit failed: {}", reason);
                ImuError::DegenerateCalibration {
                    reason,
                    best_effort: None,
                }
            }
            other => other,
        })?;

        BiasFit {
            bias: GyroBias::new(circle.center.x, circle.center.y, z),
            radius_squared: circle.radius_squared,
            points: samples.len(),
        }
        .validate()
    }
}

impl Default for GyroBiasEstimator {
    fn default() -> Self {
        Self::new(&CalibrationConfig::default())
    }
}
