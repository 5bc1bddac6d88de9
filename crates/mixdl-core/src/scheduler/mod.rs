//! Bounded-concurrency batch scheduler with staggered admission.
//!
//! One `run_batch` call owns one batch: a FIFO backlog of work items, a set
//! of armed admission timers, and a set of in-flight executor tasks. Items
//! are admitted up to a live-mutable capacity with a fixed stagger delay
//! between admissions so a rate-limited remote service never sees a burst.
//! Capacity can be raised or lowered while the batch runs; lowering pulls
//! back scheduled-but-unstarted admissions, never in-flight work.

mod batch;
mod capacity;
mod error;
mod executor;
mod outcome;
mod progress;

pub use batch::run_batch;
pub use capacity::CapacityHandle;
pub use error::BatchError;
pub use executor::WorkExecutor;
pub use outcome::{BatchReport, ItemState, Outcome, OutcomeSet};
pub use progress::{LogReporter, NoopReporter, ProgressReporter};
