//! Executor seam: the scheduler only sees one async operation per item.
//!
//! The scheduler does not know whether an item is a YouTube search, a track
//! download, or a test stub; it only observes the `Ok`/`Err` discriminant.
//! Implementations must return failures as values rather than panicking —
//! a panic is still caught and turned into a failed outcome, but the error
//! text is then the task failure, not the executor's own diagnosis.

use anyhow::Result;
use async_trait::async_trait;

/// Performs the asynchronous operation for a single work item.
///
/// `index` is the item's stable 0-based position in the submitted batch and
/// is provided for logging/naming only; it must not influence bookkeeping.
#[async_trait]
pub trait WorkExecutor: Send + Sync + 'static {
    /// Per-item work descriptor, moved into the executor on admission.
    type Payload: Send + 'static;
    /// Result carried in a successful outcome.
    type Value: Send + 'static;

    async fn execute(&self, index: usize, payload: Self::Payload) -> Result<Self::Value>;
}
