//! Deferred work on a virtual clock.
//!
//! The engine never sleeps. The host advances time explicitly and due
//! timers are handed back one at a time, earliest deadline first, so a
//! handler can arm or cancel other timers before the next one is examined.

use std::collections::VecDeque;
use std::time::Duration;

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Render the pending tooltip.
    ShowTooltip,
    /// Hover-leave grace period ended.
    HoverLeaveGrace,
    /// Mutation batch quiet period ended.
    MutationDebounce,
    /// Flash guard gave up waiting for the first discovery pass.
    FlashFallback,
    /// Flash guard re-hides freshly inserted descriptions.
    FlashWatch,
}

/// A pending timer.
#[derive(Debug, Clone)]
pub struct PendingTimer {
    /// Unique timer ID.
    pub id: u64,
    /// What to do on fire.
    pub kind: TimerKind,
    /// When this timer should fire.
    pub fire_at: Duration,
    /// For tickers: interval between firings.
    pub interval: Option<Duration>,
    /// Whether this timer has been cancelled.
    pub cancelled: bool,
}

/// Timer queue plus the current virtual time.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    timers: VecDeque<PendingTimer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    fn push(&mut self, kind: TimerKind, delay: Duration, interval: Option<Duration>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.timers.push_back(PendingTimer {
            id,
            kind,
            fire_at: self.now + delay,
            interval,
            cancelled: false,
        });
        id
    }

    /// Arm a one-shot timer.
    pub fn schedule(&mut self, kind: TimerKind, delay: Duration) -> u64 {
        self.push(kind, delay, None)
    }

    /// Arm a repeating timer; the first firing is one interval from now.
    pub fn schedule_ticker(&mut self, kind: TimerKind, interval: Duration) -> u64 {
        // A zero interval would fire forever within a single advance.
        let interval = interval.max(Duration::from_millis(1));
        self.push(kind, interval, Some(interval))
    }

    /// Cancel a timer by ID. Unknown or already fired IDs are ignored.
    pub fn cancel(&mut self, timer_id: u64) {
        if let Some(timer) = self.timers.iter_mut().find(|t| t.id == timer_id) {
            timer.cancelled = true;
        }
    }

    /// Cancel the timer in `slot`, if any, and clear the slot.
    pub fn cancel_slot(&mut self, slot: &mut Option<u64>) {
        if let Some(id) = slot.take() {
            self.cancel(id);
        }
    }

    /// Whether a timer is still waiting to fire.
    pub fn is_pending(&self, timer_id: u64) -> bool {
        self.timers.iter().any(|t| t.id == timer_id && !t.cancelled)
    }

    /// Number of live timers.
    pub fn pending_count(&self) -> usize {
        self.timers.iter().filter(|t| !t.cancelled).count()
    }

    /// Pop the earliest timer due at or before `deadline`, moving the clock
    /// to its fire time. Tickers are re-armed before being returned.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<(u64, TimerKind)> {
        self.timers.retain(|t| !t.cancelled);
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.fire_at <= deadline)
            .min_by_key(|(i, t)| (t.fire_at, *i))
            .map(|(i, _)| i)?;
        let mut timer = self.timers.remove(index)?;
        self.now = self.now.max(timer.fire_at);
        let fired = (timer.id, timer.kind);
        if let Some(interval) = timer.interval {
            timer.fire_at += interval;
            self.timers.push_back(timer);
        }
        Some(fired)
    }

    /// Move the clock forward to `deadline` once every due timer has been popped.
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    /// Drop every timer.
    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
