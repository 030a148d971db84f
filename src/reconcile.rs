//! Confirmation polling engine.
//!
//! After a user action on a toggle whose platform gives no reliable
//! "changed" notification, the panel schedules a bounded run of delayed
//! polls until the subsystem confirms or the budget is spent.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  user tap ──▶ request_confirmation(kind)                     │
//! │                    │                                         │
//! │                    ▼                                         │
//! │   TimerQueue ── ReconcileTick{kind, generation} ──┐          │
//! │        ▲                                          ▼          │
//! │        └──── reschedule ◀── on_tick: poll ─▶ TileStateStore  │
//! │                                   │                          │
//! │   authoritative ControlMsg ──▶ on_authoritative: cancel job  │
//! │                                   └──▶ push value immediately│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! At most one job per kind exists.  A new request replaces the in-flight
//! job and bumps the generation so its queued tick is dropped as stale.

use log::{debug, info};

use crate::app::ports::StatePoller;
use crate::config::PanelConfig;
use crate::registry::ToggleKind;
use crate::tiles::{ExternalValue, TileStateStore, render};
use crate::timers::{TimerQueue, TimerTask};

// ═══════════════════════════════════════════════════════════════
//  Job types
// ═══════════════════════════════════════════════════════════════

/// One in-flight confirmation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationJob {
    pub kind: ToggleKind,
    /// Polls left before the job retires.
    pub ticks_remaining: u8,
    pub interval_ms: u32,
    /// Identifies this job's ticks; replaced jobs get a new one.
    pub generation: u32,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Superseded or cancelled job; nothing happened.
    Stale,
    /// Polled and rescheduled.
    Polled,
    /// Polled for the last time; the job is gone.
    Retired,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Per-kind confirmation jobs.
///
/// Decoupled from the platform: polling goes through a [`StatePoller`],
/// results go to the [`TileStateStore`], and ticks go through the
/// caller's [`TimerQueue`].
pub struct ReconciliationScheduler {
    jobs: [Option<ReconciliationJob>; ToggleKind::COUNT],
    window_ticks: u8,
    interval_ms: u32,
    next_generation: u32,
}

impl ReconciliationScheduler {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            jobs: [None; ToggleKind::COUNT],
            window_ticks: config.confirm_window_ticks,
            interval_ms: config.tick_interval_ms,
            next_generation: 1,
        }
    }

    /// Start a confirmation window for `kind`, replacing any in flight.
    /// Returns the new job's generation.
    pub fn request_confirmation(&mut self, kind: ToggleKind, now_ms: u64, timers: &mut TimerQueue) -> u32 {
        if self.cancel(kind, timers) {
            debug!("reconcile: {} job replaced", kind);
        }
        debug_assert_eq!(
            timers.count_where(|t| matches!(t, TimerTask::ReconcileTick { kind: k, .. } if *k == kind)),
            0,
            "orphaned tick for {kind}"
        );

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);

        if self.window_ticks == 0 {
            return generation;
        }

        self.jobs[kind.index()] = Some(ReconciliationJob {
            kind,
            ticks_remaining: self.window_ticks,
            interval_ms: self.interval_ms,
            generation,
        });
        timers.schedule(now_ms, self.interval_ms, TimerTask::ReconcileTick { kind, generation });
        info!(
            "reconcile: {} confirming ({} x {} ms)",
            kind, self.window_ticks, self.interval_ms
        );
        generation
    }

    /// Handle a fired `ReconcileTick`.
    pub fn on_tick(
        &mut self,
        kind: ToggleKind,
        generation: u32,
        now_ms: u64,
        timers: &mut TimerQueue,
        poller: &mut impl StatePoller,
        store: &TileStateStore,
    ) -> TickOutcome {
        let slot = &mut self.jobs[kind.index()];
        let job = match slot.as_mut() {
            Some(job) if job.generation == generation => job,
            _ => {
                debug!("reconcile: stale tick for {} (gen {})", kind, generation);
                return TickOutcome::Stale;
            }
        };

        match poller.poll(kind) {
            Some(value) => {
                debug!("reconcile: {} polled {:?}", kind, value);
                store.update(kind, render(kind, &value));
            }
            None => debug!("reconcile: {} poll returned nothing", kind),
        }

        job.ticks_remaining = job.ticks_remaining.saturating_sub(1);
        if job.ticks_remaining == 0 {
            info!("reconcile: {} window exhausted, keeping last poll", kind);
            *slot = None;
            return TickOutcome::Retired;
        }

        timers.schedule(now_ms, job.interval_ms, TimerTask::ReconcileTick { kind, generation });
        TickOutcome::Polled
    }

    /// An authoritative report for `kind` arrived: end any job early and
    /// show the value.  Returns `true` if a job was cancelled.
    pub fn on_authoritative(
        &mut self,
        kind: ToggleKind,
        value: &ExternalValue,
        timers: &mut TimerQueue,
        store: &TileStateStore,
    ) -> bool {
        let cancelled = self.cancel(kind, timers);
        if cancelled {
            info!("reconcile: {} confirmed by notification", kind);
        }
        store.update(kind, render(kind, value));
        cancelled
    }

    /// Drop the job for `kind` and its queued tick.
    pub fn cancel(&mut self, kind: ToggleKind, timers: &mut TimerQueue) -> bool {
        let Some(job) = self.jobs[kind.index()].take() else {
            return false;
        };
        timers.cancel_where(|t| {
            matches!(t, TimerTask::ReconcileTick { kind: k, generation: g }
                if *k == kind && *g == job.generation)
        });
        true
    }

    /// Drop every job.
    pub fn cancel_all(&mut self, timers: &mut TimerQueue) {
        for kind in ToggleKind::ALL {
            self.cancel(kind, timers);
        }
    }

    pub fn job(&self, kind: ToggleKind) -> Option<&ReconciliationJob> {
        self.jobs[kind.index()].as_ref()
    }

    pub fn is_pending(&self, kind: ToggleKind) -> bool {
        self.jobs[kind.index()].is_some()
    }

    /// Number of jobs in flight.
    pub fn pending_count(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_some()).count()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
