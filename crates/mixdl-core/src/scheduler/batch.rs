//! The batch run loop: staggered admission under a live capacity limit.
//!
//! One call to [`run_batch`] owns all queue state for one batch. The loop is
//! event-driven: it sleeps until the earliest armed admission timer, an
//! active item finishing, or a capacity change, whichever comes first. No
//! polling interval, no shared module state across batches.
//!
//! Admission policy: the first admission of a batch fires immediately; every
//! later one fires at `max(previous_fire, now) + stagger`. For a fresh batch
//! of capacity C this produces the initial wave at `0, d, 2*d, ...`; after a
//! slot frees at time T the next item fires at `T + d`. The chain keeps
//! admissions at least one stagger apart even when several slots free at
//! once, which is the whole point of the stagger: a rate-limited remote
//! service sees a smooth request rate instead of bursts.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tokio::time::{sleep_until, Instant};

use super::capacity::CapacityHandle;
use super::error::BatchError;
use super::executor::WorkExecutor;
use super::outcome::{BatchReport, ItemState, OutcomeSet};
use super::progress::ProgressReporter;

/// An admission whose stagger timer is armed but has not fired yet.
struct Scheduled {
    index: usize,
    fire_at: Instant,
}

/// What woke the run loop. Resolved first, acted on after, so the join set
/// is not borrowed while new tasks are spawned into it.
enum Wake<V> {
    TimerFired,
    ItemDone(Result<(tokio::task::Id, (usize, anyhow::Result<V>)), tokio::task::JoinError>),
    CapacityChanged,
}

/// Fire time for the next admission. The first admission of a batch is
/// immediate; all later ones keep at least one stagger behind the previous
/// fire time, measured from now if the chain has fallen behind.
fn next_fire_at(last_fire: Option<Instant>, now: Instant, stagger: Duration) -> Instant {
    match last_fire {
        None => now,
        Some(prev) => prev.max(now) + stagger,
    }
}

/// A deadline far enough out to stand in for "no timer armed". Never
/// reached: the select branch guarding it is disabled when unused.
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86400)
}

/// Run every payload through `executor` with at most `capacity.get()` items
/// in flight, a `stagger` delay between admissions, and `reporter` observing
/// each state transition.
///
/// Resolves once every item has a terminal outcome; per-item failures are
/// recorded, counted, and returned in the report, never raised. The only
/// errors are malformed input (initial capacity 0) and internal bookkeeping
/// violations.
///
/// Capacity is re-read on every scheduling decision, so `capacity.set(n)`
/// from another task takes effect mid-run: raising it admits more backlog,
/// lowering it pulls back scheduled-but-unstarted admissions (newest first,
/// preserving relative order at the backlog front) and otherwise just waits
/// for active items to drain. Active work is never interrupted.
pub async fn run_batch<E: WorkExecutor>(
    executor: Arc<E>,
    payloads: Vec<E::Payload>,
    capacity: &CapacityHandle,
    stagger: Duration,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<BatchReport<E::Value>, BatchError> {
    if capacity.get() == 0 {
        return Err(BatchError::ZeroCapacity);
    }

    let total = payloads.len();
    let mut payloads: Vec<Option<E::Payload>> = payloads.into_iter().map(Some).collect();
    let mut backlog: VecDeque<usize> = (0..total).collect();
    let mut scheduled: VecDeque<Scheduled> = VecDeque::new();
    let mut active: JoinSet<(usize, anyhow::Result<E::Value>)> = JoinSet::new();
    let mut active_index: HashMap<tokio::task::Id, usize> = HashMap::new();
    let mut outcomes: OutcomeSet<E::Value> = OutcomeSet::new(total);
    let mut capacity_rx = capacity.subscribe();
    let mut last_fire: Option<Instant> = None;

    loop {
        let cap = capacity.get();
        let now = Instant::now();

        // A capacity drop pulls back scheduled admissions until the armed
        // count fits again. Popping from the back and pushing to the backlog
        // front keeps the items' original relative order.
        while !scheduled.is_empty() && active.len() + scheduled.len() > cap.max(active.len()) {
            let s = scheduled.pop_back().expect("scheduled nonempty");
            backlog.push_front(s.index);
            reporter.report(s.index, ItemState::Backlog, None);
        }

        // Top up: arm admission timers while free slots and backlog remain.
        while active.len() + scheduled.len() < cap {
            let Some(index) = backlog.pop_front() else {
                break;
            };
            let fire_at = next_fire_at(last_fire, now, stagger);
            last_fire = Some(fire_at);
            scheduled.push_back(Scheduled { index, fire_at });
            reporter.report(index, ItemState::Scheduled, None);
        }

        if backlog.is_empty() && scheduled.is_empty() && active.is_empty() {
            break;
        }

        // Fire times are armed in nondecreasing order, so the front of the
        // scheduled queue is always the earliest.
        let next_fire = scheduled.front().map(|s| s.fire_at);
        let fire_deadline = next_fire.unwrap_or_else(far_future);

        // The capacity branch wakes the loop when the limit changes, so a
        // raise admits new work immediately and a drop cancels unfired
        // timers before they fire. It is also the only wait when capacity
        // is zero with nothing in flight.
        let wake = tokio::select! {
            () = sleep_until(fire_deadline), if next_fire.is_some() => Wake::TimerFired,
            Some(joined) = active.join_next_with_id(), if !active.is_empty() => {
                Wake::ItemDone(joined)
            }
            changed = capacity_rx.changed() => {
                if changed.is_err() {
                    // Sender kept alive by `capacity`; unreachable in
                    // practice, but fall back to completion-driven wakeups.
                    tracing::warn!("capacity channel closed during batch run");
                }
                Wake::CapacityChanged
            }
        };

        match wake {
            Wake::TimerFired => {
                let s = scheduled.pop_front().expect("timer fired for scheduled item");
                let payload = payloads[s.index]
                    .take()
                    .expect("payload admitted exactly once");
                let exec = Arc::clone(&executor);
                let index = s.index;
                reporter.report(index, ItemState::Active, None);
                let handle = active.spawn(async move {
                    let result = exec.execute(index, payload).await;
                    (index, result)
                });
                active_index.insert(handle.id(), index);
            }
            Wake::ItemDone(joined) => {
                let (index, result) = match joined {
                    Ok((id, (index, result))) => {
                        active_index.remove(&id);
                        (index, result)
                    }
                    // A panicking executor still yields a terminal outcome;
                    // nothing is dropped silently.
                    Err(join_err) => {
                        let index = active_index
                            .remove(&join_err.id())
                            .expect("every active task is registered");
                        (index, Err(anyhow!("executor task failed: {join_err}")))
                    }
                };
                let detail = match &result {
                    Ok(_) => "ok".to_string(),
                    Err(e) => format!("{e:#}"),
                };
                outcomes.record(index, result)?;
                reporter.report(index, ItemState::Done, Some(&detail));
            }
            Wake::CapacityChanged => {}
        }
    }

    debug_assert!(outcomes.is_complete());
    Ok(outcomes.finalize())
}
