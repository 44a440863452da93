//! Runs one configured dash scenario and summarises it.

use arcdash_common::{ConfigError, Vec3};
use arcdash_gameplay::{
    ArcSolution, DashAbility, DashEvent, DashPhase, DashSnapshot, EventBus, SimulationLoop, Walker,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SimConfig;

/// Position sample along the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since activation
    pub time: f32,
    /// Dash phase at that time
    pub phase: DashPhase,
    /// Walker position
    pub position: Vec3,
}

/// Outcome of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    /// Solved arc, if activation succeeded
    pub arc: Option<ArcSolution>,
    /// Why activation failed, if it did
    pub rejection: Option<String>,
    /// Requested target
    pub target: Vec3,
    /// Walker position at the end
    pub final_position: Vec3,
    /// Walker velocity at the end
    pub final_velocity: Vec3,
    /// Distance between the final position and the target
    pub landing_error: f32,
    /// Highest walker position reached
    pub peak_height: f32,
    /// Frames simulated
    pub frames: u64,
    /// Fixed steps simulated
    pub fixed_steps: u64,
    /// Ability state at the end
    pub final_state: DashSnapshot,
    /// Trajectory samples
    pub samples: Vec<Sample>,
    /// Every dash event, in order
    pub events: Vec<DashEvent>,
}

/// Runs the scenario in `config`. Activation happens on the first frame.
pub fn run(config: &SimConfig) -> Result<SimReport, ConfigError> {
    let scenario = &config.scenario;
    let bus = EventBus::new(1024);
    let mut walker = Walker::new(scenario.start);
    let mut ability =
        DashAbility::setup(config.dash.clone(), &mut walker)?.with_event_sender(bus.sender());
    let mut sim = SimulationLoop::new(scenario.fixed_dt);

    let (arc, rejection) = match ability.activate(&mut walker, scenario.target) {
        Ok(arc) => {
            info!(
                "Dash to {:?}: flight {:.3}s, apex {:.2}",
                scenario.target, arc.flight_time, arc.apex_height
            );
            (Some(arc), None)
        },
        Err(e) => {
            warn!("Dash rejected: {e}");
            (None, Some(e.to_string()))
        },
    };

    let mut interrupt_at = scenario.interrupt_at;
    let mut flip_at = scenario.flip_at;
    let mut samples = Vec::new();
    let mut peak_height = walker.position.y;

    for frame in 0..config.frame_count() {
        let elapsed = sim.time() as f32;
        if interrupt_at.is_some_and(|t| elapsed >= t) {
            interrupt_at = None;
            ability.interrupt(&mut walker, None);
        }
        if flip_at.is_some_and(|t| elapsed >= t) {
            flip_at = None;
            ability.flip(&mut walker, scenario.flip_angle);
        }

        sim.frame(scenario.frame_dt, &mut ability, &mut walker);
        peak_height = peak_height.max(walker.position.y);

        if scenario.sample_every > 0 && frame % u64::from(scenario.sample_every) == 0 {
            samples.push(Sample {
                time: sim.time() as f32,
                phase: ability.phase(),
                position: walker.position,
            });
        }
    }

    let report = SimReport {
        arc,
        rejection,
        target: scenario.target,
        final_position: walker.position,
        final_velocity: walker.velocity,
        landing_error: walker.position.distance(scenario.target),
        peak_height,
        frames: sim.frames(),
        fixed_steps: sim.fixed_steps(),
        final_state: ability.snapshot(),
        samples,
        events: bus.drain(),
    };
    info!(
        "Scenario done after {} frames: ended at {:?} ({:.3} from target)",
        report.frames, report.final_position, report.landing_error
    );
    Ok(report)
}
