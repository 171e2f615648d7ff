//! Collector errors

use crate::handle::Handle;
use thiserror::Error;

/// Errors returned by collector operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GcError {
    /// An argument was rejected before any work was done
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A bounded root or edge table is full
    #[error("{table} table is full (limit {limit})")]
    CapacityExceeded {
        /// Which table overflowed
        table: &'static str,
        /// Configured limit
        limit: usize,
    },

    /// The underlying allocator could not provide memory
    #[error("Out of memory allocating {requested} bytes")]
    OutOfMemory {
        /// Bytes requested
        requested: usize,
    },

    /// Handle does not name a live allocation, root or edge
    #[error("Not found: {0}")]
    NotFound(Handle),

    /// Array size computation overflowed
    #[error("Array size overflow: {count} x {element_size}")]
    Overflow {
        /// Element count
        count: usize,
        /// Size of one element in bytes
        element_size: usize,
    },
}

/// Result type for collector operations
pub type Result<T> = std::result::Result<T, GcError>;
