//! Per-item lifecycle states, terminal outcomes, and completion aggregation.

use std::fmt;

use super::error::BatchError;

/// Lifecycle of one work item. Transitions are monotonic except
/// `Scheduled -> Backlog`, which happens only when a capacity decrease
/// pulls back an admission whose stagger timer has not yet fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    /// Submitted, not yet admitted.
    Backlog,
    /// Admission timer armed, executor not yet started.
    Scheduled,
    /// Executor running.
    Active,
    /// Terminal outcome recorded.
    Done,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemState::Backlog => "backlog",
            ItemState::Scheduled => "scheduled",
            ItemState::Active => "active",
            ItemState::Done => "done",
        };
        f.write_str(s)
    }
}

/// Terminal result of one work item, tagged with its submission index.
#[derive(Debug)]
pub struct Outcome<T> {
    pub index: usize,
    pub result: Result<T, anyhow::Error>,
}

impl<T> Outcome<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything a caller gets back from a completed batch. Partial failure is
/// the expected common case; the batch itself only errors on malformed input.
#[derive(Debug)]
pub struct BatchReport<T> {
    /// One outcome per submitted item, sorted by submission index.
    pub outcomes: Vec<Outcome<T>>,
    pub succeeded: usize,
    pub failed: usize,
}

impl<T> BatchReport<T> {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Collects outcomes as they arrive, in any order, slotted by index.
///
/// Owned by the scheduler loop, so no locking is needed; it still refuses to
/// overwrite a recorded outcome instead of assuming callers behave.
pub struct OutcomeSet<T> {
    slots: Vec<Option<Result<T, anyhow::Error>>>,
    succeeded: usize,
    failed: usize,
}

impl<T> OutcomeSet<T> {
    pub fn new(total: usize) -> Self {
        let mut slots = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        Self {
            slots,
            succeeded: 0,
            failed: 0,
        }
    }

    /// Store the terminal result for `index` and bump the running counts.
    pub fn record(&mut self, index: usize, result: Result<T, anyhow::Error>) -> Result<(), BatchError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(BatchError::DuplicateOutcome { index })?;
        if slot.is_some() {
            return Err(BatchError::DuplicateOutcome { index });
        }
        if result.is_ok() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        *slot = Some(result);
        Ok(())
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// True once every submitted index has a stored outcome.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Consume the set, yielding outcomes sorted by submission index.
    ///
    /// Panics if called before `is_complete()`; the scheduler only finalizes
    /// after its backlog, scheduled, and active sets are all empty.
    pub fn finalize(self) -> BatchReport<T> {
        let succeeded = self.succeeded;
        let failed = self.failed;
        let outcomes = self
            .slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| Outcome {
                index,
                result: slot.expect("outcome recorded for every item"),
            })
            .collect();
        BatchReport {
            outcomes,
            succeeded,
            failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn records_out_of_order_and_finalizes_sorted() {
        let mut set: OutcomeSet<&'static str> = OutcomeSet::new(3);
        assert!(!set.is_complete());
        set.record(2, Ok("c")).unwrap();
        set.record(0, Ok("a")).unwrap();
        set.record(1, Err(anyhow!("boom"))).unwrap();
        assert!(set.is_complete());
        assert_eq!(set.succeeded(), 2);
        assert_eq!(set.failed(), 1);

        let report = set.finalize();
        let indices: Vec<usize> = report.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(report.outcomes[0].is_ok());
        assert!(!report.outcomes[1].is_ok());
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn duplicate_record_is_rejected() {
        let mut set: OutcomeSet<u8> = OutcomeSet::new(1);
        set.record(0, Ok(7)).unwrap();
        let err = set.record(0, Ok(8)).unwrap_err();
        assert!(matches!(err, BatchError::DuplicateOutcome { index: 0 }));
        // The first result and its count are untouched.
        assert_eq!(set.succeeded(), 1);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mut set: OutcomeSet<u8> = OutcomeSet::new(2);
        assert!(set.record(2, Ok(1)).is_err());
    }

    #[test]
    fn empty_set_is_complete() {
        let set: OutcomeSet<u8> = OutcomeSet::new(0);
        assert!(set.is_complete());
        let report = set.finalize();
        assert_eq!(report.total(), 0);
        assert_eq!(report.succeeded, 0);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn item_state_display() {
        assert_eq!(ItemState::Backlog.to_string(), "backlog");
        assert_eq!(ItemState::Scheduled.to_string(), "scheduled");
        assert_eq!(ItemState::Active.to_string(), "active");
        assert_eq!(ItemState::Done.to_string(), "done");
    }
}
