//! Error types for Lumen GFX
//!
//! One error enum covers both the layout engine (argument, format, feature
//! and limit failures) and backend adapters (device errors, allocation).

use std::fmt;

/// Result type for Lumen GFX operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen GFX errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed or empty top-level input (sizes, flags, declaration list)
    InvalidArgument(String),

    /// A data declaration violates an active buffer-type constraint set
    InvalidFormat(String),

    /// A required backend capability is absent
    UnsupportedFeature(String),

    /// A computed size or count exceeds a backend-reported limit
    ResourceLimitExceeded {
        /// What was being limited (e.g. "texel buffer values")
        resource: String,
        /// Value the request needed
        attempted: u64,
        /// Maximum the backend reported
        limit: u64,
    },

    /// Backend-specific error (Vulkan, Metal, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            Error::UnsupportedFeature(msg) => write!(f, "Unsupported feature: {}", msg),
            Error::ResourceLimitExceeded { resource, attempted, limit } => write!(
                f,
                "Resource limit exceeded: {} ({} requested, maximum {})",
                resource, attempted, limit
            ),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
        }
    }
}

impl std::error::Error for Error {}
