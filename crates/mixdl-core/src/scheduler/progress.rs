//! Progress observation: fire-and-forget state-transition hooks.
//!
//! Reporters are side-effect only. The scheduler calls them synchronously on
//! every item transition and ignores whatever they do; an implementation
//! that needs to do slow I/O should hand off (channel, `try_send`) rather
//! than block the scheduling loop.

use super::outcome::ItemState;

/// Observer invoked on every work-item state transition.
///
/// `detail` carries human-readable context when available: the resolved
/// title for a search hit, an error summary for a failure.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, index: usize, state: ItemState, detail: Option<&str>);
}

/// Discards all progress events.
#[derive(Debug, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _index: usize, _state: ItemState, _detail: Option<&str>) {}
}

/// Emits each transition as a tracing event.
#[derive(Debug, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn report(&self, index: usize, state: ItemState, detail: Option<&str>) {
        match detail {
            Some(detail) => tracing::debug!(index, %state, detail, "item transition"),
            None => tracing::debug!(index, %state, "item transition"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_reporter_accepts_all_states() {
        let reporter = NoopReporter;
        reporter.report(0, ItemState::Backlog, None);
        reporter.report(1, ItemState::Scheduled, Some("queued"));
        reporter.report(2, ItemState::Active, None);
        reporter.report(3, ItemState::Done, Some("ok"));
    }
}
