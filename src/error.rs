//! Error handling for voxelcast
//!
//! Out-of-range queries are not errors (they answer air or a miss). The
//! variants here cover caller precondition violations, bad configuration
//! and persistence failures.

use std::error::Error as StdError;
use std::fmt;

/// Main error type for voxelcast
#[derive(Debug)]
pub enum VoxelError {
    // World Errors
    InvalidExtent {
        size: (u32, u32, u32),
        reason: String,
    },
    DegenerateRay {
        direction: [f32; 3],
    },

    // Persistence Errors
    CorruptedData {
        reason: String,
    },
    EncodeFailed {
        reason: String,
    },
    IoError {
        path: String,
        error: String,
    },

    // Configuration Errors
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },
}

impl fmt::Display for VoxelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoxelError::InvalidExtent { size, reason } => {
                write!(f, "Invalid world extent {:?}: {}", size, reason)
            }
            VoxelError::DegenerateRay { direction } => {
                write!(f, "Degenerate ray direction {:?}", direction)
            }

            VoxelError::CorruptedData { reason } => write!(f, "Data corrupted: {}", reason),
            VoxelError::EncodeFailed { reason } => write!(f, "Encoding failed: {}", reason),
            VoxelError::IoError { path, error } => write!(f, "IO error for {}: {}", path, error),

            VoxelError::InvalidConfig {
                field,
                value,
                reason,
            } => write!(f, "Invalid config: {} = {} ({})", field, value, reason),
        }
    }
}

impl StdError for VoxelError {}

/// Type alias for Results in voxelcast
pub type VoxelResult<T> = Result<T, VoxelError>;

impl From<std::io::Error> for VoxelError {
    fn from(error: std::io::Error) -> Self {
        VoxelError::IoError {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<crate::persistence::PersistenceError> for VoxelError {
    fn from(err: crate::persistence::PersistenceError) -> Self {
        use crate::persistence::PersistenceError;
        match err {
            PersistenceError::Io { path, source } => VoxelError::IoError {
                path,
                error: source.to_string(),
            },
            PersistenceError::FarTableOverflow { .. } => VoxelError::EncodeFailed {
                reason: err.to_string(),
            },
            other => VoxelError::CorruptedData {
                reason: other.to_string(),
            },
        }
    }
}
