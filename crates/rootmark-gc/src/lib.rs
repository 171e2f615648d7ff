//! # Rootmark Garbage Collector
//!
//! Manually rooted, non-generational mark/sweep collector for embedding in
//! interpreters.
//!
//! ## Design
//!
//! - **Explicit graph**: The host registers roots and `from -> to` edges;
//!   payloads are opaque bytes and are never scanned
//! - **Handles**: Allocations are named by generational handles, so a handle
//!   to a freed allocation resolves to `NotFound` instead of dangling
//! - **Courtesy threshold**: Allocation collects first once occupancy passes
//!   the trigger ratio, but the heap budget is never a hard cap
//! - **Iterative marking**: Explicit work stack, safe on deep and cyclic graphs

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod allocator;
pub mod collector;
pub mod config;
pub mod edges;
pub mod error;
pub mod handle;
pub mod marker;
pub mod object;
pub mod roots;
pub mod stats;
pub mod sweeper;

pub use collector::Collector;
pub use config::{DEFAULT_HEAP_BUDGET, DEFAULT_TRIGGER_RATIO, GcConfig};
pub use edges::Edge;
pub use error::{GcError, Result};
pub use handle::Handle;
pub use stats::GcStats;
