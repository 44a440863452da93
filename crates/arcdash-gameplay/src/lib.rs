//! # Arcdash Gameplay
//!
//! The dash ability and everything it needs:
//! - Two-phase ballistic arc solver
//! - Cooldown/duration timers and the charge continuation
//! - Dash state machine (`Idle -> Charging -> Dashing`)
//! - Deferred velocity corrections for the fixed physics step
//! - Host capabilities (body, locomotion gate, grounded, speed receiver)
//! - Telemetry events
//! - A headless frame loop with a reference host

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod capability;
pub mod config;
pub mod dash;
pub mod events;
pub mod physics_sync;
pub mod sim;
pub mod timers;
pub mod trajectory;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::capability::*;
    pub use crate::config::*;
    pub use crate::dash::*;
    pub use crate::events::*;
    pub use crate::physics_sync::*;
    pub use crate::sim::*;
    pub use crate::timers::*;
    pub use crate::trajectory::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use arcdash_common::Vec3;

    #[test]
    fn test_second_dash_after_cooldown() {
        let mut walker = Walker::new(Vec3::ZERO);
        let mut ability = DashAbility::setup(DashConfig::default(), &mut walker).expect("valid");
        let mut sim = SimulationLoop::new(1.0 / 60.0);

        ability
            .activate(&mut walker, Vec3::new(4.0, 0.0, 0.0))
            .expect("first dash");
        for _ in 0..(3 * 120) {
            sim.frame(1.0 / 120.0, &mut ability, &mut walker);
        }
        assert_eq!(ability.phase(), DashPhase::Idle);
        assert!(ability.timers().is_cooldown_ready());

        assert!(ability
            .activate(&mut walker, Vec3::new(4.0, 0.0, 4.0))
            .is_ok());
    }

    #[test]
    fn test_events_through_bus() {
        let bus = EventBus::default();
        let mut walker = Walker::new(Vec3::ZERO);
        let mut ability = DashAbility::setup(DashConfig::default(), &mut walker)
            .expect("valid")
            .with_event_sender(bus.sender());

        ability
            .activate(&mut walker, Vec3::new(0.0, 1.0, 3.0))
            .expect("activates");
        ability.interrupt(&mut walker, None);

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            DashEvent::Interrupted {
                from: DashPhase::Charging,
                ..
            }
        ));
    }
}
