// src/error.rs
//! Error types for buffer operations with advanced conversion support

use std::fmt;

/// Errors that can occur during buffer operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// An index/length pair reaches past the addressable capacity
    OutOfBounds {
        /// First byte of the requested range
        offset: usize,
        /// Length of the requested range
        length: usize,
        /// Capacity the range was checked against
        capacity: usize,
    },
    /// A read asked for more bytes than are readable
    InsufficientData {
        /// Bytes the operation needed
        requested: usize,
        /// Bytes that were readable
        available: usize,
    },
    /// An offset update would break `reader <= writer <= capacity`
    InvalidOffset {
        /// Rejected offset value
        offset: usize,
        /// Lowest accepted value
        min: usize,
        /// Highest accepted value
        max: usize,
    },
    /// The buffer has been closed and its storage released
    Closed,
    /// `close` was called on an already closed buffer
    DoubleClose,
    /// Storage could not be expanded; the buffer is left as it was
    Growth {
        /// Capacity that was asked for
        requested: usize,
        /// Why the expansion failed
        reason: String,
    },
    /// Requested size exceeds the configured maximum
    SizeTooBig {
        /// Requested size in bytes
        requested: usize,
        /// Configured maximum in bytes
        max: usize,
    },
    /// Constituents cannot be combined into one composite buffer
    Composition(String),
    /// I/O error (for compatibility)
    Io(String),
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds {
                offset,
                length,
                capacity,
            } => write!(
                f,
                "Range {}..{} out of bounds for capacity {}",
                offset,
                offset.saturating_add(*length),
                capacity
            ),
            Self::InsufficientData {
                requested,
                available,
            } => write!(
                f,
                "Insufficient data: needed {} bytes, {} readable",
                requested, available
            ),
            Self::InvalidOffset { offset, min, max } => {
                write!(f, "Offset {} outside of {}..={}", offset, min, max)
            }
            Self::Closed => write!(f, "Buffer is closed"),
            Self::DoubleClose => write!(f, "Buffer was already closed"),
            Self::Growth { requested, reason } => {
                write!(f, "Cannot grow buffer to {} bytes: {}", requested, reason)
            }
            Self::SizeTooBig { requested, max } => {
                write!(f, "Buffer size {} exceeds maximum {}", requested, max)
            }
            Self::Composition(msg) => write!(f, "Invalid composition: {}", msg),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for BufferError {}

// ============================================================================
// ADVANCED ERROR CONVERSION - Makes buffer library compatible with any error type
// ============================================================================

/// Convert BufferError to std::io::Error
impl From<BufferError> for std::io::Error {
    fn from(err: BufferError) -> Self {
        use std::io::ErrorKind;
        match err {
            BufferError::InsufficientData { .. } => std::io::Error::new(ErrorKind::UnexpectedEof, err),
            BufferError::OutOfBounds { .. }
            | BufferError::Growth { .. }
            | BufferError::SizeTooBig { .. } => std::io::Error::new(ErrorKind::WriteZero, err),
            BufferError::Io(msg) => std::io::Error::other(msg),
            _ => std::io::Error::other(err),
        }
    }
}

/// Convert std::io::Error to BufferError
impl From<std::io::Error> for BufferError {
    fn from(err: std::io::Error) -> Self {
        BufferError::Io(err.to_string())
    }
}

/// Convert BufferError to anyhow::Error
#[cfg(feature = "anyhow")]
impl From<BufferError> for anyhow::Error {
    fn from(err: BufferError) -> Self {
        anyhow::anyhow!("{}", err)
    }
}

/// Allow using ? with anyhow::Error
#[cfg(feature = "anyhow")]
impl From<anyhow::Error> for BufferError {
    fn from(err: anyhow::Error) -> Self {
        BufferError::Io(err.to_string())
    }
}

// ============================================================================
// RESULT TYPE ALIASES
// ============================================================================

/// Result type alias for buffer operations
///
/// Note: When using with other Result types (like anyhow::Result),
/// either qualify the type (`segbuf::Result<T>`) or use the conversion traits.
pub type Result<T> = std::result::Result<T, BufferError>;

// ============================================================================
// EXTENSION TRAIT FOR EASY CONVERSION
// ============================================================================

/// Extension trait for converting Results between different error types
pub trait ResultExt<T> {
    /// Convert to anyhow::Result
    #[cfg(feature = "anyhow")]
    fn into_anyhow(self) -> anyhow::Result<T>;

    /// Convert to io::Result
    fn into_io(self) -> std::io::Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    #[cfg(feature = "anyhow")]
    fn into_anyhow(self) -> anyhow::Result<T> {
        self.map_err(|e| e.into())
    }

    fn into_io(self) -> std::io::Result<T> {
        self.map_err(|e| e.into())
    }
}

// ============================================================================
// HELPER MACROS FOR ERROR HANDLING
// ============================================================================

/// Convenience macro for converting buffer operations to any Result type.
///
/// Takes an optional target error type as the second argument. Without it the
/// error is converted to `std::io::Error`, which has no overlapping `From`
/// impls.
///
/// # Example
/// ```ignore
/// use segbuf::prelude::*;
/// use segbuf::buffer_op;
///
/// fn handler_function() -> anyhow::Result<()> {
///     let mut buf = BufferAllocator::on_heap().allocate(16)?;
///     buffer_op!(buf.write_u32(42), anyhow::Error)?;
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! buffer_op {
    ($expr:expr, $target:ty) => {
        $expr.map_err(|e: $crate::BufferError| -> $target { e.into() })
    };
    ($expr:expr) => {
        $expr.map_err(|e: $crate::BufferError| -> std::io::Error { e.into() })
    };
}

/// Try a buffer operation with automatic error conversion
#[macro_export]
macro_rules! buffer_try {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => return Err(e.into()),
        }
    };
}
