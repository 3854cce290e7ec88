//! Cancellable fixed-interval tasks.
//!
//! A [`Scheduler`] only tracks *when* tasks are due. The owner drains due
//! firings with [`Scheduler::take_due`] and runs the work itself, so nothing
//! executes behind the owner's back and at most the tasks it scheduled fire.

use std::collections::BTreeMap;
use std::time::Duration;

use campaign_model::Timestamp;

/// Most runs of one task reported by a single [`Scheduler::take_due`]. Older
/// missed runs are skipped.
pub const MAX_CATCH_UP: usize = 64;

/// Handle to a scheduled task, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// One due run of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub handle: TaskHandle,
    /// The time the run was due, in epoch milliseconds.
    pub at: Timestamp,
}

/// A source of time and fixed-interval tasks.
pub trait Scheduler {
    /// Current time in epoch milliseconds.
    fn now_ms(&self) -> Timestamp;

    /// Schedule a task that first fires one `interval` from now, then every
    /// `interval` after that until cancelled.
    fn schedule(&mut self, interval: Duration) -> TaskHandle;

    /// Cancel a task. Returns `false` if it was not scheduled.
    fn cancel(&mut self, handle: TaskHandle) -> bool;

    fn is_scheduled(&self, handle: TaskHandle) -> bool;

    /// Number of scheduled tasks.
    fn active_tasks(&self) -> usize;

    /// Drain the firings due at or before now, oldest first, at most
    /// [`MAX_CATCH_UP`] per task.
    fn take_due(&mut self) -> Vec<Firing>;
}

#[derive(Debug, Clone)]
struct Task {
    interval_ms: i64,
    next_at: Timestamp,
}

/// Task table shared by both scheduler implementations.
#[derive(Debug, Clone, Default)]
struct TaskTable {
    tasks: BTreeMap<TaskHandle, Task>,
    next_id: u64,
}

impl TaskTable {
    fn schedule(&mut self, now: Timestamp, interval: Duration) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;

        let interval_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX).max(1);
        self.tasks.insert(
            handle,
            Task {
                interval_ms,
                next_at: now.saturating_add(interval_ms),
            },
        );
        handle
    }

    fn take_due(&mut self, now: Timestamp) -> Vec<Firing> {
        let mut due = Vec::new();
        let mut exhausted = Vec::new();

        for (handle, task) in self.tasks.iter_mut() {
            let mut fired = 0;
            while task.next_at <= now {
                if fired == MAX_CATCH_UP {
                    // Drop the missed runs beyond the cap and resume after `now`.
                    let skipped = now.saturating_sub(task.next_at) / task.interval_ms + 1;
                    match skipped
                        .checked_mul(task.interval_ms)
                        .and_then(|d| task.next_at.checked_add(d))
                    {
                        Some(next) => {
                            tracing::debug!(?handle, skipped, "coalesced missed runs");
                            task.next_at = next;
                        }
                        None => exhausted.push(*handle),
                    }
                    break;
                }

                due.push(Firing {
                    handle: *handle,
                    at: task.next_at,
                });
                fired += 1;

                match task.next_at.checked_add(task.interval_ms) {
                    Some(next) => task.next_at = next,
                    None => {
                        exhausted.push(*handle);
                        break;
                    }
                }
            }
        }

        // Their next run lies past the end of representable time.
        for handle in exhausted {
            tracing::warn!(?handle, "task ran out of clock and was dropped");
            self.tasks.remove(&handle);
        }

        due.sort_by_key(|f| (f.at, f.handle));
        due
    }
}

/// Scheduler driven by simulated time. Time only moves when
/// [`VirtualScheduler::advance`] is called.
#[derive(Debug, Clone)]
pub struct VirtualScheduler {
    now: Timestamp,
    table: TaskTable,
}

impl VirtualScheduler {
    /// Create a scheduler whose clock starts at `start` (epoch ms).
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: start,
            table: TaskTable::default(),
        }
    }

    /// Move the clock forward.
    pub fn advance(&mut self, by: Duration) {
        let by = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.now = self.now.saturating_add(by);
    }
}

impl Default for VirtualScheduler {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Scheduler for VirtualScheduler {
    fn now_ms(&self) -> Timestamp {
        self.now
    }

    fn schedule(&mut self, interval: Duration) -> TaskHandle {
        self.table.schedule(self.now, interval)
    }

    fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.table.tasks.remove(&handle).is_some()
    }

    fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.table.tasks.contains_key(&handle)
    }

    fn active_tasks(&self) -> usize {
        self.table.tasks.len()
    }

    fn take_due(&mut self) -> Vec<Firing> {
        self.table.take_due(self.now)
    }
}

/// Scheduler backed by the wall clock. The host loop polls
/// [`Scheduler::take_due`] and receives every run that came due since the
/// last poll.
#[derive(Debug, Clone, Default)]
pub struct SystemScheduler {
    table: TaskTable,
}

impl SystemScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for SystemScheduler {
    fn now_ms(&self) -> Timestamp {
        chrono::Utc::now().timestamp_millis()
    }

    fn schedule(&mut self, interval: Duration) -> TaskHandle {
        let now = self.now_ms();
        self.table.schedule(now, interval)
    }

    fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.table.tasks.remove(&handle).is_some()
    }

    fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.table.tasks.contains_key(&handle)
    }

    fn active_tasks(&self) -> usize {
        self.table.tasks.len()
    }

    fn take_due(&mut self) -> Vec<Firing> {
        let now = self.now_ms();
        self.table.take_due(now)
    }
}
