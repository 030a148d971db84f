//! Control-thread delayed task queue.
//!
//! Every piece of delayed work in the panel (confirmation polls, recorder
//! timers, torch readiness checks, tile refreshes) is a [`TimerTask`] value
//! queued here against a virtual monotonic millisecond clock.  The owner
//! drains due tasks with [`TimerQueue::pop_due`] and dispatches them itself,
//! so the queue knows nothing about what a task does.
//!
//! Ordering: earliest deadline first; tasks with equal deadlines run in the
//! order they were scheduled.

use log::debug;

use crate::registry::ToggleKind;

/// A unit of delayed work.  Carries the generation/epoch it was armed with
/// so a firing that has been superseded can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Confirmation poll for a reconciliation job.
    ReconcileTick { kind: ToggleKind, generation: u32 },
    /// Quick-record auto-stop.
    RecorderAutoStop { epoch: u32 },
    /// Quick-record JustRecorded → Idle.
    RecorderRevert { epoch: u32 },
    /// Torch readiness check.
    TorchConfirm { epoch: u32 },
    /// One-shot re-read of a tile's backing state.
    TileRefresh(ToggleKind),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due_ms: u64,
    seq: u64,
    task: TimerTask,
}

/// Deadline-ordered queue of [`TimerTask`]s.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to run `delay_ms` after `now_ms`.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u32, task: TimerTask) {
        let due_ms = now_ms.saturating_add(u64::from(delay_ms));
        let seq = self.next_seq;
        self.next_seq += 1;
        debug!("timers: {:?} due at {} ms", task, due_ms);
        self.entries.push(Entry { due_ms, seq, task });
    }

    /// Remove and return the next task due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<TimerTask> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.seq))
            .map(|(i, _)| i)?;
        Some(self.entries.swap_remove(idx).task)
    }

    /// Drop every queued task matching `pred`.  Returns how many were removed.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&TimerTask) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(&e.task));
        before - self.entries.len()
    }

    /// Deadline of the earliest queued task.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of queued tasks matching `pred`.
    pub fn count_where(&self, mut pred: impl FnMut(&TimerTask) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.task)).count()
    }
}
