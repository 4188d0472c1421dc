pub mod euler;
pub mod integrator;
pub mod motion;
pub mod quaternion;
pub mod tracker;

pub use euler::EulerAngles;
pub use integrator::OrientationIntegrator;
pub use motion::StaticDetector;
pub use quaternion::Quaternion;
pub use tracker::AttitudeTracker;
