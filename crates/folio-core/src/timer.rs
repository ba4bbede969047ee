#![forbid(unsafe_code)]

//! Delayed callbacks driven by host-supplied time.
//!
//! [`Scheduler`] is the capability controllers use to run a task after a
//! delay and to cancel it. [`TimerQueue`] implements it without a real
//! clock: the host calls [`TimerQueue::advance`] (typically once per
//! animation frame with the elapsed frame time) and due tasks run in
//! deadline order. Tests drive the same queue with exact durations, which
//! makes every timing scenario deterministic.
//!
//! # Invariants
//!
//! 1. Tasks fire in deadline order; equal deadlines fire in scheduling order.
//! 2. A cancelled task never fires; cancelling a fired or unknown id is a
//!    no-op returning `false`.
//! 3. Tasks may schedule or cancel other tasks. A task scheduled during
//!    `advance` whose deadline falls inside the advanced window fires in the
//!    same call.
//! 4. `now()` never goes backwards.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use web_time::Duration;

/// Identifier of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw numeric value (for logging).
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Run a task after a delay, with cancellation.
pub trait Scheduler {
    /// Schedule `task` to run once after `delay`.
    fn schedule(&self, delay: Duration, task: Task) -> TimerId;

    /// Cancel a pending task. Returns `true` if it was pending.
    fn cancel(&self, id: TimerId) -> bool;
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        (**self).schedule(delay, task)
    }

    fn cancel(&self, id: TimerId) -> bool {
        (**self).cancel(id)
    }
}

#[derive(Default)]
struct QueueInner {
    now: Duration,
    next_id: u64,
    /// Keyed by (deadline, id) so iteration order is fire order.
    entries: BTreeMap<(Duration, u64), Task>,
    deadlines: AHashMap<TimerId, Duration>,
    fired_total: u64,
}

/// Host-advanced timer queue.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct TimerQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TimerQueue")
            .field("now", &inner.now)
            .field("pending", &inner.entries.len())
            .field("fired_total", &inner.fired_total)
            .finish()
    }
}

impl TimerQueue {
    /// Create an empty queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the queue was created, as seen by its tasks.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of tasks waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Whether `id` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.inner.borrow().deadlines.contains_key(&id)
    }

    /// Deadline of the earliest pending task.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner
            .borrow()
            .entries
            .keys()
            .next()
            .map(|(deadline, _)| *deadline)
    }

    /// Total tasks fired since creation.
    #[must_use]
    pub fn fired_total(&self) -> u64 {
        self.inner.borrow().fired_total
    }

    /// Advance time by `dt`, running every task that comes due.
    ///
    /// Returns the number of tasks that ran. The internal borrow is released
    /// before each task runs, so tasks may freely schedule and cancel.
    pub fn advance(&self, dt: Duration) -> usize {
        let target = self.inner.borrow().now.saturating_add(dt);
        let mut fired = 0;
        loop {
            let task = {
                let mut inner = self.inner.borrow_mut();
                let next = inner.entries.keys().next().copied();
                match next {
                    Some(key) if key.0 <= target => {
                        inner.deadlines.remove(&TimerId(key.1));
                        inner.now = inner.now.max(key.0);
                        inner.fired_total += 1;
                        inner.entries.remove(&key)
                    }
                    _ => break,
                }
            };
            if let Some(task) = task {
                task();
                fired += 1;
            }
        }
        let mut inner = self.inner.borrow_mut();
        inner.now = inner.now.max(target);
        fired
    }

    /// Drop every pending task without running it.
    pub fn clear(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        let dropped = inner.entries.len();
        inner.entries.clear();
        inner.deadlines.clear();
        dropped
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = TimerId(inner.next_id);
        let deadline = inner.now.saturating_add(delay);
        inner.entries.insert((deadline, id.0), task);
        inner.deadlines.insert(id, deadline);
        id
    }

    fn cancel(&self, id: TimerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.deadlines.remove(&id) {
            Some(deadline) => inner.entries.remove(&(deadline, id.0)).is_some(),
            None => false,
        }
    }
}
