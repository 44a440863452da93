//! Capabilities a host entity exposes to the dash ability.
//!
//! The ability never inspects concrete entity types. A host implements
//! [`DashHost`] to hand out its body and locomotion gate, and opts in to the
//! optional capabilities ([`Grounded`], [`SpeedReceiver`]) by overriding the
//! matching accessor. [`Capabilities::probe`] records which ones are present
//! once, at ability setup.

use arcdash_common::Vec3;
use serde::{Deserialize, Serialize};

/// The simulated body the dash moves.
pub trait KinematicBody {
    /// Current position.
    fn position(&self) -> Vec3;

    /// Teleports the body (used while dashing, when the ability owns motion).
    fn set_position(&mut self, position: Vec3);

    /// Current velocity as seen by the physics integrator.
    fn velocity(&self) -> Vec3;

    /// Instantaneous velocity change, applied during the fixed physics step.
    fn apply_velocity_change(&mut self, delta: Vec3);
}

/// The locomotion subsystem the dash suspends while it owns the body.
pub trait LocomotionGate {
    /// Suspends (`true`) or resumes (`false`) normal movement.
    fn set_suspended(&mut self, suspended: bool);

    /// Whether movement is currently suspended.
    fn is_suspended(&self) -> bool;
}

/// Hosts that know whether they stand on a supporting surface.
pub trait Grounded {
    /// Whether the entity is in contact with the ground.
    fn is_grounded(&self) -> bool;
}

/// Hosts that want the current dash speed (for animation blending, HUD, ...).
pub trait SpeedReceiver {
    /// Receives the effective dash speed in world units per second.
    fn receive_speed(&mut self, speed: f32);
}

/// Entity that can carry a dash ability.
pub trait DashHost {
    /// The body moved by the dash.
    fn body(&self) -> &dyn KinematicBody;

    /// Mutable access to the body.
    fn body_mut(&mut self) -> &mut dyn KinematicBody;

    /// The locomotion gate suspended during a dash.
    fn locomotion_mut(&mut self) -> &mut dyn LocomotionGate;

    /// Grounded capability, if the host has one.
    fn grounded(&self) -> Option<&dyn Grounded> {
        None
    }

    /// Speed receiver capability, if the host has one.
    fn speed_receiver(&mut self) -> Option<&mut dyn SpeedReceiver> {
        None
    }
}

/// Which optional capabilities a host offered at setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Host reports ground contact; activation requires it
    pub grounded: bool,
    /// Host receives dash speed each update
    pub speed_receiver: bool,
}

impl Capabilities {
    /// Queries a host for its optional capabilities.
    pub fn probe<H: DashHost + ?Sized>(host: &mut H) -> Self {
        Self {
            grounded: host.grounded().is_some(),
            speed_receiver: host.speed_receiver().is_some(),
        }
    }
}

/// In-memory body that records every velocity change.
#[derive(Debug, Clone, Default)]
pub struct MockBody {
    /// Position
    pub position: Vec3,
    /// Velocity
    pub velocity: Vec3,
    /// Every delta passed to `apply_velocity_change`, in order
    pub velocity_changes: Vec<Vec3>,
}

impl KinematicBody for MockBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn apply_velocity_change(&mut self, delta: Vec3) {
        self.velocity += delta;
        self.velocity_changes.push(delta);
    }
}

/// Mock host for testing.
///
/// `ground` set to `None` means the host has no grounded capability at all.
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    /// The body
    pub body: MockBody,
    /// Current locomotion suspension
    pub suspended: bool,
    /// Every `set_suspended` call, in order
    pub suspend_calls: Vec<bool>,
    /// Grounded capability and its current answer
    pub ground: Option<MockGround>,
    /// Speed capability and every speed received
    pub speeds: Option<Vec<f32>>,
}

/// Grounded capability of [`MockHost`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGround {
    /// Reported ground contact
    pub on_ground: bool,
}

impl Grounded for MockGround {
    fn is_grounded(&self) -> bool {
        self.on_ground
    }
}

impl LocomotionGate for MockHost {
    fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
        self.suspend_calls.push(suspended);
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }
}

impl SpeedReceiver for Vec<f32> {
    fn receive_speed(&mut self, speed: f32) {
        self.push(speed);
    }
}

impl MockHost {
    /// Creates a mock host at `position` with no optional capabilities.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            body: MockBody {
                position,
                ..MockBody::default()
            },
            ..Self::default()
        }
    }

    /// Adds the grounded capability.
    #[must_use]
    pub fn with_ground(mut self, on_ground: bool) -> Self {
        self.ground = Some(MockGround { on_ground });
        self
    }

    /// Adds the speed receiver capability.
    #[must_use]
    pub fn with_speed_receiver(mut self) -> Self {
        self.speeds = Some(Vec::new());
        self
    }
}

impl DashHost for MockHost {
    fn body(&self) -> &dyn KinematicBody {
        &self.body
    }

    fn body_mut(&mut self) -> &mut dyn KinematicBody {
        &mut self.body
    }

    fn locomotion_mut(&mut self) -> &mut dyn LocomotionGate {
        self
    }

    fn grounded(&self) -> Option<&dyn Grounded> {
        self.ground.as_ref().map(|g| g as &dyn Grounded)
    }

    fn speed_receiver(&mut self) -> Option<&mut dyn SpeedReceiver> {
        self.speeds.as_mut().map(|s| s as &mut dyn SpeedReceiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_without_optional_capabilities() {
        let mut host = MockHost::new(Vec3::ZERO);
        assert_eq!(Capabilities::probe(&mut host), Capabilities::default());
    }

    #[test]
    fn test_probe_with_all_capabilities() {
        let mut host = MockHost::new(Vec3::ZERO)
            .with_ground(true)
            .with_speed_receiver();
        let caps = Capabilities::probe(&mut host);
        assert!(caps.grounded);
        assert!(caps.speed_receiver);
    }

    #[test]
    fn test_mock_body_records_changes() {
        let mut body = MockBody::default();
        body.apply_velocity_change(Vec3::X);
        body.apply_velocity_change(Vec3::Y);
        assert_eq!(body.velocity(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(body.velocity_changes.len(), 2);
    }

    #[test]
    fn test_mock_locomotion_gate() {
        let mut host = MockHost::new(Vec3::ZERO);
        host.locomotion_mut().set_suspended(true);
        assert!(host.is_suspended());
        host.locomotion_mut().set_suspended(false);
        assert_eq!(host.suspend_calls, vec![true, false]);
    }
}
