use thiserror::Error;

/// Trajectory pipeline error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrajectoryError {
    #[error("Degenerate orientation at sample {index}: quaternion norm is zero or not finite")]
    DegenerateOrientation { index: usize },

    #[error("Length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Timestamp at sample {index} is earlier than its predecessor or not finite")]
    NonMonotonicTimestamps { index: usize },

    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Recording already in progress")]
    AlreadyRecording,

    #[error("No recording in progress")]
    NotRecording,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for TrajectoryError {
    fn from(err: std::io::Error) -> Self {
        TrajectoryError::Io(err.to_string())
    }
}

/// Result type for library operations
pub type TrajResult<T> = Result<T, TrajectoryError>;
