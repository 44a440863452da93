//! Dash ability state machine.
//!
//! A dash goes `Idle -> Charging -> Dashing -> Idle`:
//! - `activate` solves the arc, suspends locomotion, arms the timers and
//!   schedules the end of the charge.
//! - `update` (variable rate) ticks the timers, launches when the charge is
//!   due and integrates the arc while dashing.
//! - `fixed_update` (fixed rate) applies the queued velocity correction.
//!
//! Every exit from `Charging`/`Dashing` (landing, `interrupt`, `flip`,
//! `set_enabled(false)`) resumes locomotion and queues a correction.

use arcdash_common::{yaw_rotated, ConfigError, EntityId, Vec3};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::capability::{Capabilities, DashHost};
use crate::config::DashConfig;
use crate::events::{DashEvent, RejectReason};
use crate::physics_sync::{PhysicsSync, VelocityCorrection};
use crate::timers::{ChargeContinuation, TimerSet};
use crate::trajectory::{solve_arc, ArcSolution, TrajectoryError};

/// Fraction of the remaining speed kept by a flip.
pub const FLIP_DAMPING: f32 = 0.18;

/// Lifecycle phase of a dash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DashPhase {
    /// Ready (subject to cooldown)
    #[default]
    Idle,
    /// Committed, waiting for the charge delay
    Charging,
    /// On the arc
    Dashing,
}

impl DashPhase {
    /// Whether the dash owns the body in this phase.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, DashPhase::Charging | DashPhase::Dashing)
    }
}

/// Why `activate` refused to start a dash. None of these change any state.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ActivationError {
    /// Ability is toggled off
    #[error("dash ability is disabled")]
    DisabledAbility,

    /// A dash is already charging or in flight
    #[error("dash already active ({0:?})")]
    AlreadyActive(DashPhase),

    /// Cooldown has not run out
    #[error("dash on cooldown ({remaining:.2} ability-seconds left)")]
    CooldownActive {
        /// Remaining cooldown in ability time
        remaining: f32,
    },

    /// Host is airborne
    #[error("entity is not grounded")]
    NotGrounded,

    /// No usable arc to the target
    #[error("invalid trajectory: {0}")]
    InvalidTrajectory(#[from] TrajectoryError),
}

impl ActivationError {
    /// Telemetry reason for this error.
    #[must_use]
    pub fn reason(&self) -> RejectReason {
        match self {
            Self::DisabledAbility => RejectReason::Disabled,
            Self::AlreadyActive(_) => RejectReason::AlreadyActive,
            Self::CooldownActive { .. } => RejectReason::CooldownActive,
            Self::NotGrounded => RejectReason::NotGrounded,
            Self::InvalidTrajectory(_) => RejectReason::InvalidTrajectory,
        }
    }
}

/// Read-only view of a dash for HUD and debug output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashSnapshot {
    /// Current phase
    pub phase: DashPhase,
    /// Whether activation is allowed at all
    pub enabled: bool,
    /// Cooldown left in ability time
    pub cooldown_remaining: f32,
    /// Cooldown left in real seconds
    pub real_cooldown: f32,
    /// Real seconds until the arc ends, while dashing
    pub time_to_land: Option<f32>,
    /// Arc velocity, while charging or dashing
    pub launch_velocity: Option<Vec3>,
    /// A velocity correction waits for the next fixed step
    pub correction_pending: bool,
}

/// The dash ability of one entity.
#[derive(Debug, Clone)]
pub struct DashAbility {
    entity_id: EntityId,
    config: DashConfig,
    capabilities: Capabilities,
    enabled: bool,
    phase: DashPhase,
    launch_velocity: Vec3,
    timers: TimerSet,
    charge: ChargeContinuation,
    physics: PhysicsSync,
    /// Unscaled seconds since setup; the charge deadline lives on this clock
    clock: f64,
    events: Option<Sender<DashEvent>>,
}

impl DashAbility {
    /// Builds an enabled, idle ability for `host`.
    ///
    /// The host's optional capabilities are probed here, once.
    pub fn setup<H: DashHost + ?Sized>(config: DashConfig, host: &mut H) -> Result<Self, ConfigError> {
        config.validate()?;
        let capabilities = Capabilities::probe(host);
        debug!(
            "Dash setup: grounded={}, speed_receiver={}",
            capabilities.grounded, capabilities.speed_receiver
        );

        Ok(Self {
            entity_id: EntityId::new(),
            config,
            capabilities,
            enabled: true,
            phase: DashPhase::Idle,
            launch_velocity: Vec3::ZERO,
            timers: TimerSet::new(),
            charge: ChargeContinuation::new(),
            physics: PhysicsSync::new(),
            clock: 0.0,
            events: None,
        })
    }

    /// Tags telemetry with a host-assigned entity ID.
    #[must_use]
    pub fn with_entity_id(mut self, entity_id: EntityId) -> Self {
        self.entity_id = entity_id;
        self
    }

    /// Publishes [`DashEvent`]s to `sender`.
    #[must_use]
    pub fn with_event_sender(mut self, sender: Sender<DashEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Requests a dash to `target`.
    ///
    /// On success the ability is `Charging` and the solved arc is returned.
    /// On error nothing changed.
    pub fn activate<H: DashHost + ?Sized>(
        &mut self,
        host: &mut H,
        target: Vec3,
    ) -> Result<ArcSolution, ActivationError> {
        let result = self.try_activate(host, target);
        if let Err(err) = &result {
            debug!("{} rejected dash to {:?}: {}", self.entity_id, target, err);
            self.publish(DashEvent::Rejected {
                entity_id: self.entity_id,
                reason: err.reason(),
            });
        }
        result
    }

    fn try_activate<H: DashHost + ?Sized>(
        &mut self,
        host: &mut H,
        target: Vec3,
    ) -> Result<ArcSolution, ActivationError> {
        if !self.enabled {
            return Err(ActivationError::DisabledAbility);
        }
        if self.phase.is_active() {
            return Err(ActivationError::AlreadyActive(self.phase));
        }
        if !self.timers.is_cooldown_ready() {
            return Err(ActivationError::CooldownActive {
                remaining: self.timers.cooldown_remaining(),
            });
        }
        if self.capabilities.grounded {
            if let Some(ground) = host.grounded() {
                if !ground.is_grounded() {
                    return Err(ActivationError::NotGrounded);
                }
            }
        }

        let start = host.body().position();
        let arc = solve_arc(
            start,
            target,
            self.config.base_arc_height,
            self.config.gravity_up(),
            self.config.gravity_down(),
        )?;

        let tm = self.config.time_multiplier;
        host.locomotion_mut().set_suspended(true);
        // Stop whatever momentum the body had for the charge
        self.physics.schedule(Vec3::ZERO);
        self.timers.arm(
            self.config.cooldown_seconds * tm + arc.flight_time,
            arc.flight_time + self.config.charge_time_seconds * tm,
        );
        self.charge
            .schedule(self.clock, self.config.charge_time_seconds);
        self.launch_velocity = arc.launch_velocity;
        self.phase = DashPhase::Charging;

        info!(
            "{} charging dash to {:?} (flight {:.3}s)",
            self.entity_id, target, arc.flight_time
        );
        self.publish(DashEvent::ChargeStarted {
            entity_id: self.entity_id,
            target,
            flight_time: arc.flight_time,
        });
        Ok(arc)
    }

    /// Variable-rate update. `dt` is unscaled frame time in seconds.
    pub fn update<H: DashHost + ?Sized>(&mut self, host: &mut H, dt: f32) {
        let dt = dt.max(0.0);
        let tm = self.config.time_multiplier;
        let scaled = dt * tm;
        let duration_before = self.timers.duration_remaining();

        // Timers first, so expiry is seen this tick
        self.timers.tick(scaled);
        self.clock += f64::from(dt);

        let mut step = 0.0;
        match self.phase {
            DashPhase::Charging => {
                let deadline = self.charge.deadline();
                if self.charge.poll(self.clock).is_some() {
                    let overshoot = deadline.map_or(0.0, |d| (self.clock - d) as f32);
                    step = (overshoot * tm).clamp(0.0, scaled);
                    self.launch();
                }
            },
            DashPhase::Dashing => step = scaled,
            DashPhase::Idle => {},
        }

        if self.phase == DashPhase::Dashing {
            // Part of this tick may have been charge time
            let flight_left = (duration_before - (scaled - step)).max(0.0);
            self.integrate(host, step.min(flight_left));

            if self.timers.is_duration_expired() {
                self.land(host);
            }
        }
    }

    /// Fixed-rate physics step. Applies the queued correction, if any.
    pub fn fixed_update<H: DashHost + ?Sized>(&mut self, host: &mut H) -> Option<Vec3> {
        let delta = self.physics.fixed_update(host.body_mut())?;
        self.publish(DashEvent::CorrectionApplied {
            entity_id: self.entity_id,
            delta,
        });
        Some(delta)
    }

    /// Cuts a charge or dash short.
    ///
    /// The body is corrected to `velocity_after` (zero when `None`) on the next
    /// fixed step. Returns `false` and does nothing when idle.
    pub fn interrupt<H: DashHost + ?Sized>(
        &mut self,
        host: &mut H,
        velocity_after: Option<Vec3>,
    ) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        let from = self.phase;
        let velocity_after = velocity_after.unwrap_or(Vec3::ZERO);
        self.finish(host, velocity_after);

        info!("{} dash interrupted while {:?}", self.entity_id, from);
        self.publish(DashEvent::Interrupted {
            entity_id: self.entity_id,
            from,
            velocity_after,
        });
        true
    }

    /// Deflects a dash in flight: the remaining velocity is rotated about the
    /// vertical axis by `angle_degrees`, damped by [`FLIP_DAMPING`], and the
    /// dash ends with that as the velocity after.
    ///
    /// Returns `false` and does nothing unless dashing.
    pub fn flip<H: DashHost + ?Sized>(&mut self, host: &mut H, angle_degrees: f32) -> bool {
        if self.phase != DashPhase::Dashing {
            return false;
        }
        let velocity_after = yaw_rotated(self.launch_velocity, angle_degrees) * FLIP_DAMPING;
        self.finish(host, velocity_after);

        info!("{} dash flipped by {}°", self.entity_id, angle_degrees);
        self.publish(DashEvent::Flipped {
            entity_id: self.entity_id,
            angle_degrees,
            velocity_after,
        });
        true
    }

    /// Toggles the ability. Disabling an active dash interrupts it.
    pub fn set_enabled<H: DashHost + ?Sized>(&mut self, host: &mut H, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        debug!("{} dash enabled={}", self.entity_id, enabled);
        self.publish(DashEvent::EnabledChanged {
            entity_id: self.entity_id,
            enabled,
        });

        if !enabled {
            self.interrupt(host, None);
        }
    }

    fn launch(&mut self) {
        self.phase = DashPhase::Dashing;
        info!("{} launched at {:?}", self.entity_id, self.launch_velocity);
        self.publish(DashEvent::Launched {
            entity_id: self.entity_id,
            launch_velocity: self.launch_velocity,
        });
    }

    fn integrate<H: DashHost + ?Sized>(&mut self, host: &mut H, step: f32) {
        if step > 0.0 {
            self.launch_velocity.y += self.config.gravity_for(self.launch_velocity.y) * step;
            let body = host.body_mut();
            let position = body.position() + self.launch_velocity * step;
            body.set_position(position);
        }

        if self.capabilities.speed_receiver {
            let speed = self.launch_velocity.length() * self.config.time_multiplier;
            if let Some(receiver) = host.speed_receiver() {
                receiver.receive_speed(speed);
            }
        }
    }

    fn land<H: DashHost + ?Sized>(&mut self, host: &mut H) {
        self.finish(host, Vec3::ZERO);
        let position = host.body().position();

        info!("{} landed at {:?}", self.entity_id, position);
        self.publish(DashEvent::Landed {
            entity_id: self.entity_id,
            position,
        });
    }

    /// Shared exit path back to `Idle`.
    fn finish<H: DashHost + ?Sized>(&mut self, host: &mut H, velocity_after: Vec3) {
        self.charge.cancel();
        self.timers.clear_duration();
        self.phase = DashPhase::Idle;
        host.locomotion_mut().set_suspended(false);
        self.physics.schedule(velocity_after);
    }

    fn publish(&self, event: DashEvent) {
        if let Some(sender) = &self.events {
            // Non-blocking send - if full, event is dropped
            let _ = sender.try_send(event);
        }
    }

    /// Owning entity.
    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    /// Capabilities probed at setup.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> DashPhase {
        self.phase
    }

    /// Whether the charge delay is running.
    #[must_use]
    pub fn is_charging(&self) -> bool {
        self.phase == DashPhase::Charging
    }

    /// Whether the body is on the arc.
    #[must_use]
    pub fn is_dashing(&self) -> bool {
        self.phase == DashPhase::Dashing
    }

    /// Whether activation is allowed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Arc velocity while charging or dashing.
    #[must_use]
    pub fn launch_velocity(&self) -> Option<Vec3> {
        self.phase.is_active().then_some(self.launch_velocity)
    }

    /// The countdowns.
    #[must_use]
    pub fn timers(&self) -> &TimerSet {
        &self.timers
    }

    /// Cooldown left in ability time.
    ///
    /// While dashing this includes the rest of the flight.
    #[must_use]
    pub fn cooldown_remaining(&self) -> f32 {
        self.timers.cooldown_remaining()
    }

    /// Cooldown left in real seconds (ability time / time multiplier).
    #[must_use]
    pub fn real_cooldown(&self) -> f32 {
        (self.timers.cooldown_remaining() / self.config.time_multiplier).max(0.0)
    }

    /// Real seconds until the arc ends, while dashing.
    #[must_use]
    pub fn time_to_land(&self) -> Option<f32> {
        self.is_dashing()
            .then(|| (self.timers.duration_remaining() / self.config.time_multiplier).max(0.0))
    }

    /// Correction waiting for the next fixed step.
    #[must_use]
    pub fn pending_correction(&self) -> Option<VelocityCorrection> {
        self.physics.pending()
    }

    /// HUD/debug view.
    #[must_use]
    pub fn snapshot(&self) -> DashSnapshot {
        DashSnapshot {
            phase: self.phase,
            enabled: self.enabled,
            cooldown_remaining: self.cooldown_remaining(),
            real_cooldown: self.real_cooldown(),
            time_to_land: self.time_to_land(),
            launch_velocity: self.launch_velocity(),
            correction_pending: self.physics.has_pending(),
        }
    }
}
