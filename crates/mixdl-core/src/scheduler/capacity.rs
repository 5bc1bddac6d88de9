//! Live-mutable concurrency limit shared between a running batch and its
//! controller (CLI flag, control socket, test harness).
//!
//! The scheduler never caches the value across scheduling decisions: it
//! calls `get()` fresh each time and additionally subscribes to changes so
//! a capacity bump wakes a parked scheduler immediately instead of waiting
//! for the next completion.

use tokio::sync::watch;

/// Cloneable handle to a batch's concurrency limit.
///
/// `set(0)` is accepted and stalls new admissions until the value is raised
/// again; in-flight work is unaffected. An *initial* capacity of zero is
/// rejected by `run_batch` before anything is scheduled.
#[derive(Debug, Clone)]
pub struct CapacityHandle {
    tx: watch::Sender<usize>,
}

impl CapacityHandle {
    pub fn new(initial: usize) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Current limit. Read freshly on every scheduling decision.
    pub fn get(&self) -> usize {
        *self.tx.borrow()
    }

    /// Update the limit; takes effect on the scheduler's next decision.
    pub fn set(&self, capacity: usize) {
        self.tx.send_replace(capacity);
    }

    /// Receiver used by the scheduler to wake on changes.
    pub(crate) fn subscribe(&self) -> watch::Receiver<usize> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_reflects_set() {
        let cap = CapacityHandle::new(5);
        assert_eq!(cap.get(), 5);
        cap.set(2);
        assert_eq!(cap.get(), 2);
        cap.set(0);
        assert_eq!(cap.get(), 0);
    }

    #[test]
    fn clones_share_the_value() {
        let cap = CapacityHandle::new(3);
        let other = cap.clone();
        other.set(8);
        assert_eq!(cap.get(), 8);
    }

    #[tokio::test]
    async fn subscriber_sees_changes() {
        let cap = CapacityHandle::new(1);
        let mut rx = cap.subscribe();
        cap.set(4);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 4);
    }
}
