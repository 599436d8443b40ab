// IMU trajectory reconstruction
// Orientation + accelerometer recordings → world-frame velocity and position

pub mod compensation;
pub mod error;
pub mod filters;
pub mod integration;
pub mod pipeline;
pub mod rotation;
pub mod session;
pub mod storage;
pub mod types;

pub use error::{TrajResult, TrajectoryError};
pub use integration::IntegrationMethod;
pub use pipeline::{compute_trajectory, PipelineConfig, Trajectory};
pub use rotation::DegeneratePolicy;
pub use session::{Recorder, RecorderEvent, RecorderState};
pub use types::{RotationMatrix, Sample, Series, Vec3, VectorSeries};
