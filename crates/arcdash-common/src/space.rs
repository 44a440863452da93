//! World-space conventions: Y is up, the XZ plane is horizontal.

use glam::Quat;
pub use glam::Vec3;

/// World up axis.
pub const UP: Vec3 = Vec3::Y;

/// Drops the vertical component.
#[must_use]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Rotates `v` about the vertical axis by `degrees`, counter-clockwise when
/// seen from above.
#[must_use]
pub fn yaw_rotated(v: Vec3, degrees: f32) -> Vec3 {
    Quat::from_rotation_y(degrees.to_radians()) * v
}

/// Component-wise comparison with an absolute tolerance.
#[must_use]
pub fn approx_eq(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    (a - b).abs().max_element() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_yaw_half_turn_reverses_horizontal() {
        let v = Vec3::new(3.0, 2.0, -1.0);
        let r = yaw_rotated(v, 180.0);
        assert!(approx_eq(r, Vec3::new(-3.0, 2.0, 1.0), 1e-5));
    }

    #[test]
    fn test_yaw_quarter_turn() {
        // +X turns toward -Z when rotating counter-clockwise from above
        let r = yaw_rotated(Vec3::X, 90.0);
        assert!(approx_eq(r, Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    proptest! {
        #[test]
        fn yaw_keeps_length_and_height(
            x in -100.0f32..100.0,
            y in -100.0f32..100.0,
            z in -100.0f32..100.0,
            angle in -720.0f32..720.0,
        ) {
            let v = Vec3::new(x, y, z);
            let r = yaw_rotated(v, angle);
            prop_assert!((r.length() - v.length()).abs() < 1e-3);
            prop_assert!((r.y - v.y).abs() < 1e-3);
        }
    }
}
