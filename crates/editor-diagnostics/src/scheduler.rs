//! Evaluation scheduling.
//!
//! Evaluation is debounced: every edit pushes the earliest allowed run time to
//! `now + delay`, but the single pending timer is only re-armed when it actually fires too
//! early. Hosts drive timers by calling `poll` with the current time; nothing here sleeps or
//! spawns.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

/// Quiet period after the last edit before evaluation runs.
pub const DEFAULT_EVAL_DELAY: Duration = Duration::from_millis(750);

/// Slack allowed when a timer fires slightly before the requested run time.
pub const TIMER_TOLERANCE: Duration = Duration::from_millis(10);

/// Identifies one evaluation run and the document version it read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunTicket {
    /// Monotonic run counter, starting at 1.
    pub run: u64,
    /// Document version the run evaluated.
    pub version: u64,
}

/// Debounce state of one attached document.
#[derive(Debug, Clone)]
pub struct EvalScheduler {
    delay: Duration,
    next_run_at: Instant,
    timer: Option<Instant>,
    attached: bool,
    runs: u64,
}

impl EvalScheduler {
    /// Attach at `now` and arm the initial timer.
    pub fn attach(delay: Duration, now: Instant) -> Self {
        let next_run_at = now + delay;
        Self {
            delay,
            next_run_at,
            timer: Some(next_run_at),
            attached: true,
            runs: 0,
        }
    }

    /// Configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the delay. Counts as a change, so the next run is pushed back.
    pub fn set_delay(&mut self, delay: Duration, now: Instant) {
        self.delay = delay;
        self.note_change(now);
    }

    /// Record a document or configuration change at `now`.
    pub fn note_change(&mut self, now: Instant) {
        if !self.attached {
            return;
        }
        self.next_run_at = now + self.delay;
        if self.timer.is_none() {
            self.timer = Some(self.next_run_at);
        }
    }

    /// Earliest time evaluation may run.
    pub fn next_run_at(&self) -> Instant {
        self.next_run_at
    }

    /// When the pending timer fires, if one is armed.
    pub fn timer_deadline(&self) -> Option<Instant> {
        self.timer
    }

    /// Returns `true` while a timer is armed.
    pub fn is_pending(&self) -> bool {
        self.timer.is_some()
    }

    /// Returns `true` until [`EvalScheduler::detach`] is called.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Number of runs started so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Fire the timer if it is due. Returns a ticket when a run should start now.
    pub fn poll(&mut self, now: Instant, version: u64) -> Option<RunTicket> {
        let due = self.timer?;
        if now < due {
            return None;
        }
        if now + TIMER_TOLERANCE < self.next_run_at {
            trace!(
                early_by_ms = (self.next_run_at - now).as_millis() as u64,
                "evaluation timer re-armed"
            );
            self.timer = Some(self.next_run_at);
            return None;
        }
        self.timer = None;
        Some(self.start_run(version))
    }

    /// Run immediately if a run is pending.
    pub fn force(&mut self, now: Instant, version: u64) -> Option<RunTicket> {
        self.timer?;
        self.next_run_at = now;
        self.timer = None;
        Some(self.start_run(version))
    }

    /// Cancel the pending timer and ignore further changes.
    pub fn detach(&mut self) {
        self.timer = None;
        self.attached = false;
    }

    fn start_run(&mut self, version: u64) -> RunTicket {
        self.runs += 1;
        debug!(run = self.runs, version, "starting evaluation run");
        RunTicket {
            run: self.runs,
            version,
        }
    }
}

/// Fan-in of the results of several report sources for one run.
///
/// The run's reports are applied only once every source has resolved.
#[derive(Debug, Clone)]
pub struct PendingRun<T> {
    ticket: RunTicket,
    slots: Vec<Option<T>>,
}

impl<T> PendingRun<T> {
    /// Wait for `sources` results for `ticket`.
    pub fn new(ticket: RunTicket, sources: usize) -> Self {
        Self {
            ticket,
            slots: std::iter::repeat_with(|| None).take(sources).collect(),
        }
    }

    /// The run this fan-in belongs to.
    pub fn ticket(&self) -> RunTicket {
        self.ticket
    }

    /// Record the result of source `index`. Returns `false` for an unknown or already resolved
    /// source.
    pub fn resolve(&mut self, index: usize, result: T) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(result);
                true
            }
            _ => false,
        }
    }

    /// Number of sources still outstanding.
    pub fn outstanding(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    /// Returns `true` once every source has resolved.
    pub fn is_complete(&self) -> bool {
        self.outstanding() == 0
    }

    /// All results in source order, or `self` back if some are still outstanding.
    pub fn into_results(self) -> Result<Vec<T>, Self> {
        if !self.is_complete() {
            return Err(self);
        }
        Ok(self.slots.into_iter().flatten().collect())
    }
}
