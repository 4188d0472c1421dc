pub mod accumulator;
pub mod bias;
pub mod solver;

pub use accumulator::{SampleAccumulator, average_from_source, average_samples};
pub use bias::{BiasFit, CircleFit, GyroBias, GyroBiasEstimator, fit_circle};
