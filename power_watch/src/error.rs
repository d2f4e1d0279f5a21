use thiserror::Error;

/// Errors surfaced by the power_watch core.
///
/// Only precondition violations end up here. A non-monotonic clock is handled
/// inside the power estimator and never reaches the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PowerWatchError {
    #[error("frame is {found:?} but the session started with {expected:?} (width, height)")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("frame has no pixels ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for power_watch operations
pub type Result<T> = std::result::Result<T, PowerWatchError>;
