//! Error types for the primvar-refiner crate.

use thiserror::Error;

/// Main error type for primvar-refiner operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Element width outside the set a flat buffer can be dispatched to.
    #[error("Invalid number of elements per primvar: {0} (supported: 1, 2, 3, 4)")]
    InvalidWidth(usize),

    /// There is no refinement step starting at this level.
    #[error("Invalid refinement level {level} (max: {max})")]
    InvalidLevel { level: usize, max: usize },

    /// Face-varying channel does not exist in the topology.
    #[error("Invalid face-varying channel {channel} (channels: {count})")]
    InvalidChannel { channel: usize, count: usize },

    /// Index out of bounds.
    #[error("Index {index} out of bounds (max: {max})")]
    IndexOutOfBounds { index: usize, max: usize },

    /// Invalid buffer size.
    #[error("Invalid buffer size: expected {expected}, got {actual}")]
    InvalidBufferSize { expected: usize, actual: usize },

    /// Refinement tables that do not describe a consistent hierarchy.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns an error unless `actual == expected`.
    #[inline]
    pub(crate) fn check_buffer_size(expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Error::InvalidBufferSize { expected, actual })
        }
    }
}
