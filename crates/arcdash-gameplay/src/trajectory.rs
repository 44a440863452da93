//! Closed-form ballistic arc solver.
//!
//! A dash arc has two phases with independent gravity: the ascent (from the
//! start to the apex) and the descent (from the apex to the landing point).
//! The apex sits `arc_height` above the target, so the ascent climbs
//! `arc_height + dy` and the descent always drops exactly `arc_height`.

use arcdash_common::{horizontal, Vec3, UP};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flight times at or below this are treated as zero.
pub const MIN_FLIGHT_TIME: f32 = 1e-4;

/// Errors from the trajectory solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrajectoryError {
    /// Start and end coincide and the arc has no height, so there is no flight
    #[error("degenerate arc: zero flight time")]
    Degenerate,

    /// An input was NaN or infinite
    #[error("non-finite trajectory input")]
    NonFinite,

    /// A gravity value was zero or negative
    #[error("gravity must be positive")]
    InvalidGravity,
}

/// Result of [`solve_arc`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSolution {
    /// Total time in the air (ascent + descent), in ability time
    pub flight_time: f32,
    /// Time from launch to apex
    pub ascend_time: f32,
    /// Time from apex to landing
    pub descend_time: f32,
    /// Apex height relative to the start position
    pub apex_height: f32,
    /// Initial velocity that follows the arc
    pub launch_velocity: Vec3,
    /// Gravity magnitude during the ascent
    pub gravity_up: f32,
    /// Gravity magnitude during the descent
    pub gravity_down: f32,
}

impl ArcSolution {
    /// Horizontal speed along the arc (constant for the whole flight).
    #[must_use]
    pub fn horizontal_speed(&self) -> f32 {
        horizontal(self.launch_velocity).length()
    }

    /// Evaluates the arc at time `t` after launch, relative to `start`.
    ///
    /// `t` is clamped to `[0, flight_time]`.
    #[must_use]
    pub fn position_at(&self, start: Vec3, t: f32) -> Vec3 {
        let t = t.clamp(0.0, self.flight_time);
        let mut pos = start + horizontal(self.launch_velocity) * t;

        let rise = if t <= self.ascend_time {
            self.launch_velocity.y * t - 0.5 * self.gravity_up * t * t
        } else {
            let fall = t - self.ascend_time;
            self.apex_height - 0.5 * self.gravity_down * fall * fall
        };
        pos.y += rise;
        pos
    }

    /// Where the arc ends when launched from `start`.
    #[must_use]
    pub fn landing_point(&self, start: Vec3) -> Vec3 {
        self.position_at(start, self.flight_time)
    }
}

/// Time to fall `height` from rest (or rise `height` to rest) under `gravity`.
///
/// Zero when `height <= 0`.
#[must_use]
pub fn fall_time(height: f32, gravity: f32) -> f32 {
    if height > 0.0 {
        (2.0 * height / gravity).sqrt()
    } else {
        0.0
    }
}

/// Vertical speed needed to rise exactly `height` under `gravity`.
///
/// Zero when `height <= 0`.
#[must_use]
pub fn launch_speed(height: f32, gravity: f32) -> f32 {
    if height > 0.0 {
        (2.0 * gravity * height).sqrt()
    } else {
        0.0
    }
}

/// Solves the two-phase arc from `start` to `end`.
///
/// When the target lies more than `arc_height` below the start there is no
/// ascent, and the descent covers only `arc_height`; the arc then ends above
/// the target and normal locomotion finishes the fall.
pub fn solve_arc(
    start: Vec3,
    end: Vec3,
    arc_height: f32,
    gravity_up: f32,
    gravity_down: f32,
) -> Result<ArcSolution, TrajectoryError> {
    if !start.is_finite()
        || !end.is_finite()
        || !arc_height.is_finite()
        || !gravity_up.is_finite()
        || !gravity_down.is_finite()
    {
        return Err(TrajectoryError::NonFinite);
    }
    if gravity_up <= 0.0 || gravity_down <= 0.0 {
        return Err(TrajectoryError::InvalidGravity);
    }

    let delta = end - start;
    let planar = horizontal(delta);
    let distance = planar.length();
    let direction = planar.normalize_or_zero();

    let h_up = arc_height + delta.y;
    let h_down = arc_height;

    let ascend_time = fall_time(h_up, gravity_up);
    let descend_time = fall_time(h_down, gravity_down);
    let flight_time = ascend_time + descend_time;

    if flight_time <= MIN_FLIGHT_TIME {
        return Err(TrajectoryError::Degenerate);
    }

    let horizontal_speed = distance / flight_time;
    let vertical_speed = launch_speed(h_up, gravity_up);
    let launch_velocity = direction * horizontal_speed + UP * vertical_speed;

    if !launch_velocity.is_finite() {
        return Err(TrajectoryError::NonFinite);
    }

    Ok(ArcSolution {
        flight_time,
        ascend_time,
        descend_time,
        apex_height: h_up.max(0.0),
        launch_velocity,
        gravity_up,
        gravity_down,
    })
}
