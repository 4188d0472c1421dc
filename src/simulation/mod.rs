mod noise;
mod turntable;

pub use noise::{NoiseConfig, apply_noise};
pub use turntable::{
    TurntableConfig, constant_rate_samples, generate_heading_samples, generate_turntable_run,
};
