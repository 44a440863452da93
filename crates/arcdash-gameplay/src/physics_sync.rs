//! Deferred velocity corrections for the fixed physics step.
//!
//! Velocity written during the variable-rate update is overwritten when the
//! physics integrator runs. Corrections are therefore queued here and applied
//! as a velocity-change impulse at the start of the next fixed step, which
//! makes them the last write before integration.

use arcdash_common::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capability::KinematicBody;

/// A one-shot request to bring the body to `target_velocity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityCorrection {
    /// Velocity the body should have right after the correction
    pub target_velocity: Vec3,
}

impl VelocityCorrection {
    /// Correction that stops the body.
    pub const STOP: Self = Self {
        target_velocity: Vec3::ZERO,
    };

    /// Creates a correction toward `target_velocity`.
    #[must_use]
    pub const fn new(target_velocity: Vec3) -> Self {
        Self { target_velocity }
    }

    /// Velocity change needed from `current`.
    #[must_use]
    pub fn delta(&self, current: Vec3) -> Vec3 {
        self.target_velocity - current
    }
}

/// Holds at most one queued correction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSync {
    pending: Option<VelocityCorrection>,
}

impl PhysicsSync {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a correction for the next fixed step, replacing any unapplied one.
    pub fn schedule(&mut self, target_velocity: Vec3) {
        self.pending = Some(VelocityCorrection::new(target_velocity));
    }

    /// The queued correction, if any.
    #[must_use]
    pub fn pending(&self) -> Option<VelocityCorrection> {
        self.pending
    }

    /// Whether a correction is waiting for the next fixed step.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the queued correction and applies it to `body`.
    ///
    /// Returns the velocity change that was applied.
    pub fn fixed_update(&mut self, body: &mut dyn KinematicBody) -> Option<Vec3> {
        let correction = self.pending.take()?;
        let delta = correction.delta(body.velocity());
        body.apply_velocity_change(delta);
        debug!(
            "Applied velocity correction {:?} (target {:?})",
            delta, correction.target_velocity
        );
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::MockBody;

    #[test]
    fn test_nothing_pending() {
        let mut sync = PhysicsSync::new();
        let mut body = MockBody::default();
        assert_eq!(sync.fixed_update(&mut body), None);
        assert!(body.velocity_changes.is_empty());
    }

    #[test]
    fn test_correction_cancels_velocity() {
        let mut sync = PhysicsSync::new();
        let mut body = MockBody {
            velocity: Vec3::new(4.0, -2.0, 1.0),
            ..MockBody::default()
        };

        sync.schedule(Vec3::ZERO);
        // Queued corrections do not touch the body until the fixed step
        assert_eq!(body.velocity(), Vec3::new(4.0, -2.0, 1.0));

        let delta = sync.fixed_update(&mut body);
        assert_eq!(delta, Some(Vec3::new(-4.0, 2.0, -1.0)));
        assert_eq!(body.velocity(), Vec3::ZERO);
    }

    #[test]
    fn test_correction_applied_exactly_once() {
        let mut sync = PhysicsSync::new();
        let mut body = MockBody::default();

        sync.schedule(Vec3::new(1.0, 0.0, 0.0));
        sync.fixed_update(&mut body);
        sync.fixed_update(&mut body);

        assert_eq!(body.velocity_changes.len(), 1);
        assert_eq!(body.velocity(), Vec3::X);
        assert!(!sync.has_pending());
    }

    #[test]
    fn test_later_schedule_replaces_earlier() {
        let mut sync = PhysicsSync::new();
        sync.schedule(Vec3::X);
        sync.schedule(Vec3::Z);
        assert_eq!(sync.pending(), Some(VelocityCorrection::new(Vec3::Z)));
    }

    #[test]
    fn test_stop_delta() {
        let delta = VelocityCorrection::STOP.delta(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(delta, Vec3::new(-2.0, -3.0, -4.0));
    }
}
