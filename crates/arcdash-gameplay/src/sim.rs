//! Headless frame loop and a reference host.
//!
//! Each frame runs the variable-rate update first, then as many fixed physics
//! steps as the accumulator allows. A fixed step applies the dash's queued
//! correction before the host integrates its own body.

use arcdash_common::Vec3;
use serde::{Deserialize, Serialize};

use crate::capability::{DashHost, Grounded, KinematicBody, LocomotionGate, SpeedReceiver};
use crate::dash::DashAbility;

/// Upper bound on fixed steps per frame.
pub const MAX_FIXED_STEPS: u32 = 10;

/// Height above the ground that still counts as standing on it.
pub const GROUND_TOLERANCE: f32 = 0.05;

/// Fixed timestep accumulator.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    fixed_dt: f32,
    accumulator: f32,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(1.0 / 50.0)
    }
}

impl FixedTimestep {
    /// Creates an accumulator stepping at `fixed_dt` seconds.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt: fixed_dt.max(0.001), // Minimum 1ms
            accumulator: 0.0,
        }
    }

    /// Fixed step length in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Unconsumed time.
    #[must_use]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Accumulates frame time. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_FIXED_STEPS {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind: drop the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Clears the accumulator.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// A host that owns a physics integrator.
pub trait PhysicsStep {
    /// Advances the host's body by one fixed step.
    fn integrate(&mut self, fixed_dt: f32);
}

/// Reference host: a point body that falls and rests on a flat ground plane.
///
/// Its own gravity and ground handling only run while locomotion is not
/// suspended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Walker {
    /// Position
    pub position: Vec3,
    /// Velocity
    pub velocity: Vec3,
    /// Height of the ground plane
    pub ground_height: f32,
    /// Gravity magnitude used by the walker's own integrator
    pub gravity: f32,
    /// Horizontal speed lost per second while on the ground
    pub ground_friction: f32,
    /// Last dash speed reported to this host
    pub last_speed: f32,
    suspended: bool,
}

impl Walker {
    /// Creates a walker standing at `position` on a ground plane at its height.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            ground_height: position.y,
            gravity: 9.81,
            ground_friction: 8.0,
            last_speed: 0.0,
            suspended: false,
        }
    }

    /// Same walker with a different ground height.
    #[must_use]
    pub fn with_ground_height(mut self, ground_height: f32) -> Self {
        self.ground_height = ground_height;
        self
    }

    /// Whether the walker stands on the ground.
    #[must_use]
    pub fn on_ground(&self) -> bool {
        self.position.y <= self.ground_height + GROUND_TOLERANCE
    }
}

impl PhysicsStep for Walker {
    fn integrate(&mut self, fixed_dt: f32) {
        if self.suspended {
            return;
        }

        self.velocity.y -= self.gravity * fixed_dt;
        self.position += self.velocity * fixed_dt;

        if self.position.y <= self.ground_height {
            self.position.y = self.ground_height;
            self.velocity.y = self.velocity.y.max(0.0);

            let speed = self.velocity.x.hypot(self.velocity.z);
            if speed > 0.0 {
                let kept = (speed - self.ground_friction * fixed_dt).max(0.0) / speed;
                self.velocity.x *= kept;
                self.velocity.z *= kept;
            }
        }
    }
}

impl KinematicBody for Walker {
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
    }
}

impl LocomotionGate for Walker {
    fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }
}

impl Grounded for Walker {
    fn is_grounded(&self) -> bool {
        self.on_ground()
    }
}

impl SpeedReceiver for Walker {
    fn receive_speed(&mut self, speed: f32) {
        self.last_speed = speed;
    }
}

impl DashHost for Walker {
    fn body(&self) -> &dyn KinematicBody {
        self
    }

    fn body_mut(&mut self) -> &mut dyn KinematicBody {
        self
    }

    fn locomotion_mut(&mut self) -> &mut dyn LocomotionGate {
        self
    }

    fn grounded(&self) -> Option<&dyn Grounded> {
        Some(self as &dyn Grounded)
    }

    fn speed_receiver(&mut self) -> Option<&mut dyn SpeedReceiver> {
        Some(self as &mut dyn SpeedReceiver)
    }
}

/// Drives one ability and its host frame by frame.
#[derive(Debug, Clone, Default)]
pub struct SimulationLoop {
    timestep: FixedTimestep,
    time: f64,
    frames: u64,
    fixed_steps: u64,
}

impl SimulationLoop {
    /// Creates a loop with the given fixed step.
    #[must_use]
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            timestep: FixedTimestep::new(fixed_dt),
            ..Self::default()
        }
    }

    /// Runs one frame of `dt` seconds. Returns the fixed steps taken.
    pub fn frame<H>(&mut self, dt: f32, ability: &mut DashAbility, host: &mut H) -> u32
    where
        H: DashHost + PhysicsStep + ?Sized,
    {
        ability.update(host, dt);

        let steps = self.timestep.accumulate(dt);
        let fixed_dt = self.timestep.fixed_dt();
        for _ in 0..steps {
            ability.fixed_update(host);
            host.integrate(fixed_dt);
        }

        self.time += f64::from(dt);
        self.frames += 1;
        self.fixed_steps += u64::from(steps);
        steps
    }

    /// Simulated seconds so far.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Frames run so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Fixed steps run so far.
    #[must_use]
    pub fn fixed_steps(&self) -> u64 {
        self.fixed_steps
    }

    /// The fixed timestep.
    #[must_use]
    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashConfig;
    use crate::dash::{DashPhase, FLIP_DAMPING};
    use arcdash_common::approx_eq;

    fn dash_config() -> DashConfig {
        DashConfig {
            gravity_base: 9.8,
            gravity_multiplier_up: 1.0,
            gravity_multiplier_down: 1.0,
            ..DashConfig::default()
        }
    }

    #[test]
    fn test_accumulate_counts_steps() {
        let mut timestep = FixedTimestep::new(0.02);
        assert_eq!(timestep.accumulate(0.01), 0);
        assert_eq!(timestep.accumulate(0.01), 1);
        assert_eq!(timestep.accumulate(0.05), 2);
        assert!(timestep.accumulator() < 0.02);
    }

    #[test]
    fn test_accumulate_drops_backlog() {
        let mut timestep = FixedTimestep::new(0.01);
        assert_eq!(timestep.accumulate(1.0), MAX_FIXED_STEPS);
        assert_eq!(timestep.accumulator(), 0.0);
    }

    #[test]
    fn test_accumulate_ignores_negative_dt() {
        let mut timestep = FixedTimestep::new(0.02);
        assert_eq!(timestep.accumulate(-1.0), 0);
        assert_eq!(timestep.accumulator(), 0.0);
    }

    #[test]
    fn test_walker_falls_to_ground() {
        let mut walker = Walker::new(Vec3::new(0.0, 3.0, 0.0)).with_ground_height(0.0);
        assert!(!walker.on_ground());
        for _ in 0..200 {
            walker.integrate(0.02);
        }
        assert!(walker.on_ground());
        assert_eq!(walker.position.y, 0.0);
        assert_eq!(walker.velocity.y, 0.0);
    }

    #[test]
    fn test_walker_frozen_while_suspended() {
        let mut walker = Walker::new(Vec3::new(0.0, 3.0, 0.0)).with_ground_height(0.0);
        walker.set_suspended(true);
        walker.integrate(0.5);
        assert_eq!(walker.position, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn test_dash_lands_on_target() {
        let mut walker = Walker::new(Vec3::ZERO);
        let mut ability = DashAbility::setup(dash_config(), &mut walker).expect("valid");
        let mut sim = SimulationLoop::new(1.0 / 50.0);

        let arc = ability
            .activate(&mut walker, Vec3::new(10.0, 0.0, 0.0))
            .expect("activates");
        let frames = ((0.2 + arc.flight_time + 0.2) * 300.0) as usize;
        let mut peak: f32 = 0.0;
        for _ in 0..frames {
            sim.frame(1.0 / 300.0, &mut ability, &mut walker);
            peak = peak.max(walker.position.y);
        }

        assert_eq!(ability.phase(), DashPhase::Idle);
        assert!(!walker.is_suspended());
        assert!((peak - 2.0).abs() < 0.05, "peak {peak}");
        assert!(
            approx_eq(walker.position, Vec3::new(10.0, 0.0, 0.0), 0.05),
            "landed at {:?}",
            walker.position
        );
        assert_eq!(walker.velocity, Vec3::ZERO);
        assert!(walker.last_speed > 0.0);
    }

    #[test]
    fn test_airborne_walker_cannot_dash() {
        let mut walker = Walker::new(Vec3::new(0.0, 5.0, 0.0)).with_ground_height(0.0);
        let mut ability = DashAbility::setup(dash_config(), &mut walker).expect("valid");
        assert!(ability.activate(&mut walker, Vec3::X * 4.0).is_err());
    }

    #[test]
    fn test_correction_waits_for_frame_with_fixed_step() {
        let mut walker = Walker::new(Vec3::ZERO);
        let mut ability = DashAbility::setup(dash_config(), &mut walker).expect("valid");
        let mut sim = SimulationLoop::new(0.02);
        walker.velocity = Vec3::new(3.0, 0.0, 0.0);

        ability
            .activate(&mut walker, Vec3::new(5.0, 0.0, 0.0))
            .expect("activates");

        // Too short for a fixed step
        assert_eq!(sim.frame(0.005, &mut ability, &mut walker), 0);
        assert!(ability.pending_correction().is_some());
        assert_eq!(walker.velocity, Vec3::new(3.0, 0.0, 0.0));

        // Crosses the fixed boundary: correction lands exactly once
        assert_eq!(sim.frame(0.016, &mut ability, &mut walker), 1);
        assert!(ability.pending_correction().is_none());
        assert_eq!(walker.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_flip_hands_velocity_back_to_walker() {
        let mut walker = Walker::new(Vec3::ZERO);
        let mut ability = DashAbility::setup(dash_config(), &mut walker).expect("valid");
        let mut sim = SimulationLoop::new(0.02);
        ability
            .activate(&mut walker, Vec3::new(10.0, 0.0, 0.0))
            .expect("activates");

        for _ in 0..30 {
            sim.frame(0.02, &mut ability, &mut walker);
        }
        let v = ability.launch_velocity().expect("dashing");
        assert!(ability.flip(&mut walker, 180.0));

        sim.frame(0.02, &mut ability, &mut walker);
        // Horizontal part is untouched by the walker's gravity
        assert!((walker.velocity.x + v.x * FLIP_DAMPING).abs() < 1e-3);
        assert!(walker.velocity.z.abs() < 1e-3);
        assert!(!walker.is_suspended());
    }

    #[test]
    fn test_loop_counters() {
        let mut walker = Walker::new(Vec3::ZERO);
        let mut ability = DashAbility::setup(dash_config(), &mut walker).expect("valid");
        let mut sim = SimulationLoop::new(0.02);
        for _ in 0..10 {
            sim.frame(0.01, &mut ability, &mut walker);
        }
        assert_eq!(sim.frames(), 10);
        assert_eq!(sim.fixed_steps(), 5);
        assert!((sim.time() - 0.1).abs() < 1e-6);
    }
}
