//! # Arcdash Common
//!
//! Shared types used by every Arcdash crate:
//! - Entity identifiers for telemetry
//! - Y-up vector helpers on top of `glam`
//! - Error types shared by gameplay and the harness
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod space;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::space::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.is_valid());
    }

    #[test]
    fn test_up_is_y() {
        assert_eq!(UP, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(horizontal(Vec3::new(1.0, 5.0, -2.0)), Vec3::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_config_error_wraps() {
        let err: ArcdashError = ConfigError::NotPositive {
            field: "time_multiplier",
            value: 0.0,
        }
        .into();
        assert!(err.to_string().contains("time_multiplier"));
    }
}
