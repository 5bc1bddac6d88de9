//! Batch-level failures: malformed input or a scheduler bookkeeping bug.
//!
//! Item-level failures never surface here; they are recorded per item and
//! reported through the aggregate counts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    /// The batch was submitted with an initial capacity of zero.
    #[error("initial capacity must be at least 1")]
    ZeroCapacity,

    /// Two outcomes were recorded for the same item index. Items hand their
    /// payload to exactly one executor task, so this indicates a scheduler
    /// bug rather than bad input.
    #[error("duplicate outcome recorded for item {index}")]
    DuplicateOutcome { index: usize },
}
