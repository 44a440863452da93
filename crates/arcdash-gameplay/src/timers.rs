//! Cooldown/duration countdowns and the cancellable charge continuation.

use serde::{Deserialize, Serialize};

/// Cooldown and dash-duration countdowns, both in ability time.
///
/// Both counters are clamped at zero and only move through [`TimerSet::arm`],
/// [`TimerSet::tick`] and [`TimerSet::clear_duration`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimerSet {
    cooldown_remaining: f32,
    duration_remaining: f32,
}

impl TimerSet {
    /// Creates a timer set with both counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts both countdowns. Negative or NaN totals are armed as zero.
    pub fn arm(&mut self, cooldown_total: f32, duration_total: f32) {
        self.cooldown_remaining = cooldown_total.max(0.0);
        self.duration_remaining = duration_total.max(0.0);
    }

    /// Advances both countdowns by `scaled_dt` (already multiplied by the
    /// ability's time multiplier).
    pub fn tick(&mut self, scaled_dt: f32) {
        let step = scaled_dt.max(0.0);
        self.cooldown_remaining = (self.cooldown_remaining - step).max(0.0);
        self.duration_remaining = (self.duration_remaining - step).max(0.0);
    }

    /// Drops whatever is left of the dash duration (early exit).
    pub fn clear_duration(&mut self) {
        self.duration_remaining = 0.0;
    }

    /// Whether a new dash may start.
    #[must_use]
    pub fn is_cooldown_ready(&self) -> bool {
        self.cooldown_remaining <= 0.0
    }

    /// Whether the dash has run its full duration.
    #[must_use]
    pub fn is_duration_expired(&self) -> bool {
        self.duration_remaining <= 0.0
    }

    /// Remaining cooldown in ability time.
    #[must_use]
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    /// Remaining dash duration in ability time.
    #[must_use]
    pub fn duration_remaining(&self) -> f32 {
        self.duration_remaining
    }
}

/// Handle returned when a continuation is scheduled.
///
/// Handles are never reused, so a stale handle cannot match a newer schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResumeHandle(u64);

impl ResumeHandle {
    /// Returns the raw generation number.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Pending {
    handle: ResumeHandle,
    deadline: f64,
}

/// A "wait, then resume" step stored as data.
///
/// The owner polls it once per update with its own clock. At most one
/// continuation is outstanding; cancelling removes it, so a cancelled
/// continuation can never be returned by [`ChargeContinuation::poll`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeContinuation {
    pending: Option<Pending>,
    next_generation: u64,
}

impl ChargeContinuation {
    /// Creates an empty continuation slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a resume `delay` seconds after `now`, replacing any pending one.
    pub fn schedule(&mut self, now: f64, delay: f32) -> ResumeHandle {
        self.next_generation += 1;
        let handle = ResumeHandle(self.next_generation);
        self.pending = Some(Pending {
            handle,
            deadline: now + f64::from(delay.max(0.0)),
        });
        handle
    }

    /// Cancels the pending resume, returning its handle if there was one.
    pub fn cancel(&mut self) -> Option<ResumeHandle> {
        self.pending.take().map(|p| p.handle)
    }

    /// Returns and consumes the pending handle once `now` reaches its deadline.
    pub fn poll(&mut self, now: f64) -> Option<ResumeHandle> {
        match self.pending {
            Some(p) if now >= p.deadline => {
                self.pending = None;
                Some(p.handle)
            },
            _ => None,
        }
    }

    /// Whether a resume is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the outstanding resume on the owner's clock.
    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        self.pending.map(|p| p.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_start_ready() {
        let timers = TimerSet::new();
        assert!(timers.is_cooldown_ready());
        assert!(timers.is_duration_expired());
    }

    #[test]
    fn test_tick_decrements_and_clamps() {
        let mut timers = TimerSet::new();
        timers.arm(1.0, 0.5);
        assert!(!timers.is_cooldown_ready());
        assert!(!timers.is_duration_expired());

        timers.tick(0.25);
        assert!((timers.cooldown_remaining() - 0.75).abs() < 1e-6);
        assert!((timers.duration_remaining() - 0.25).abs() < 1e-6);

        timers.tick(0.5);
        assert_eq!(timers.duration_remaining(), 0.0);
        assert!(timers.is_duration_expired());
        assert!(!timers.is_cooldown_ready());

        timers.tick(10.0);
        assert_eq!(timers.cooldown_remaining(), 0.0);
        assert!(timers.is_cooldown_ready());
    }

    #[test]
    fn test_negative_tick_is_ignored() {
        let mut timers = TimerSet::new();
        timers.arm(1.0, 1.0);
        timers.tick(-5.0);
        assert_eq!(timers.cooldown_remaining(), 1.0);
    }

    #[test]
    fn test_clear_duration_keeps_cooldown() {
        let mut timers = TimerSet::new();
        timers.arm(2.0, 1.0);
        timers.clear_duration();
        assert!(timers.is_duration_expired());
        assert_eq!(timers.cooldown_remaining(), 2.0);
    }

    #[test]
    fn test_continuation_fires_once_at_deadline() {
        let mut cont = ChargeContinuation::new();
        let handle = cont.schedule(1.0, 0.5);

        assert!(cont.is_pending());
        assert_eq!(cont.poll(1.25), None);
        assert_eq!(cont.poll(1.5), Some(handle));
        assert!(!cont.is_pending());
        assert_eq!(cont.poll(2.0), None);
    }

    #[test]
    fn test_cancelled_continuation_never_fires() {
        let mut cont = ChargeContinuation::new();
        let handle = cont.schedule(0.0, 0.1);

        assert_eq!(cont.cancel(), Some(handle));
        assert_eq!(cont.poll(100.0), None);
        assert_eq!(cont.cancel(), None);
    }

    #[test]
    fn test_handles_are_not_reused() {
        let mut cont = ChargeContinuation::new();
        let first = cont.schedule(0.0, 1.0);
        cont.cancel();
        let second = cont.schedule(0.0, 1.0);
        assert_ne!(first, second);
        assert_eq!(cont.poll(1.0), Some(second));
    }
}
