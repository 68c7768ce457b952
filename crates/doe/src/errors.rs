use thiserror::Error;

/// A result type for Morris sampling
pub type Result<T> = std::result::Result<T, MorrisError>;

/// An error when generating or selecting Morris trajectories
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MorrisError {
    /// When a sampling parameter is invalid (levels, grid jump, number of trajectories...)
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
    /// When the group assignment does not match the number of input factors
    #[error("Invalid groups: {0}")]
    InvalidGroupsError(String),
    /// When a sample given to the trajectory selection is not scaled within [0, 1]
    #[error("Out of range: {0}")]
    OutOfRangeError(String),
    /// When a generated trajectory leaves the unit hypercube.
    /// This is a defect in the step or base point computation, not a user error.
    #[error("Trajectory out of bounds: {0}")]
    TrajectoryBoundsError(String),
    /// When the number of combinations C(n, k) cannot be enumerated
    #[error("Too many combinations of {1} trajectories among {0}")]
    TooManyCombinations(usize, usize),
}
