//! Dash telemetry: events published on every transition and rejection.

use arcdash_common::{EntityId, Vec3};
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use crate::dash::DashPhase;

/// Why an activation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// Ability is toggled off
    Disabled,
    /// Already charging or dashing
    AlreadyActive,
    /// Cooldown still running
    CooldownActive,
    /// Host reports it is airborne
    NotGrounded,
    /// No usable arc to the target
    InvalidTrajectory,
}

/// Events emitted by a dash ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DashEvent {
    /// Activation accepted, charge started
    ChargeStarted {
        /// Owning entity
        entity_id: EntityId,
        /// Requested landing point
        target: Vec3,
        /// Solved flight time (ability time)
        flight_time: f32,
    },
    /// Activation refused
    Rejected {
        /// Owning entity
        entity_id: EntityId,
        /// Why
        reason: RejectReason,
    },
    /// Charge finished, body is on the arc
    Launched {
        /// Owning entity
        entity_id: EntityId,
        /// Initial arc velocity
        launch_velocity: Vec3,
    },
    /// Arc ran its full duration
    Landed {
        /// Owning entity
        entity_id: EntityId,
        /// Body position at landing
        position: Vec3,
    },
    /// Charge or dash cut short
    Interrupted {
        /// Owning entity
        entity_id: EntityId,
        /// Phase that was cut short
        from: DashPhase,
        /// Velocity the body is corrected to
        velocity_after: Vec3,
    },
    /// Mid-air deflection
    Flipped {
        /// Owning entity
        entity_id: EntityId,
        /// Yaw applied to the remaining velocity
        angle_degrees: f32,
        /// Velocity the body is corrected to
        velocity_after: Vec3,
    },
    /// Queued velocity correction applied on a fixed step
    CorrectionApplied {
        /// Owning entity
        entity_id: EntityId,
        /// Velocity change applied
        delta: Vec3,
    },
    /// Ability toggled on or off
    EnabledChanged {
        /// Owning entity
        entity_id: EntityId,
        /// New state
        enabled: bool,
    },
}

impl DashEvent {
    /// Entity the event belongs to.
    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        match self {
            Self::ChargeStarted { entity_id, .. }
            | Self::Rejected { entity_id, .. }
            | Self::Launched { entity_id, .. }
            | Self::Landed { entity_id, .. }
            | Self::Interrupted { entity_id, .. }
            | Self::Flipped { entity_id, .. }
            | Self::CorrectionApplied { entity_id, .. }
            | Self::EnabledChanged { entity_id, .. } => *entity_id,
        }
    }
}

/// Bounded event bus for dash telemetry.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<DashEvent>,
    receiver: Receiver<DashEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: DashEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<DashEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<DashEvent> {
        self.sender.clone()
    }
}
