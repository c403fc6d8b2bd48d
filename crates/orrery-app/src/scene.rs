//! Sun and earth transforms.
//!
//! The sun sits at the origin. The earth spins about its own axis and
//! orbits the sun; both angles advance by a fixed step every frame, so
//! animation speed follows frame rate.

use std::f32::consts::TAU;

use glam::{Mat4, Vec3};

pub const SUN_RADIUS: f32 = 5.0;
pub const EARTH_RADIUS: f32 = 1.0;
/// Distance from the sun's centre to the earth's.
pub const ORBIT_DISTANCE: f32 = 10.0;

/// Sphere tessellation shared by both bodies.
pub const SPHERE_SLICES: u32 = 36;
pub const SPHERE_STACKS: u32 = 18;

/// Radians of earth spin per frame.
pub const SPIN_STEP: f32 = 0.001;
/// Radians of orbit per frame.
pub const ORBIT_STEP: f32 = 0.000_01;

/// Accumulated animation angles, each kept in `[0, TAU)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneState {
    spin: f32,
    orbit: f32,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one frame.
    pub fn advance(&mut self) {
        self.spin = wrap_angle(self.spin + SPIN_STEP);
        self.orbit = wrap_angle(self.orbit + ORBIT_STEP);
    }

    pub fn spin(&self) -> f32 {
        self.spin
    }

    pub fn orbit(&self) -> f32 {
        self.orbit
    }

    /// The sun never moves.
    pub fn sun_model(&self) -> Mat4 {
        Mat4::IDENTITY
    }

    /// `rotate_y(spin) * translate(ORBIT_DISTANCE, 0, 0) * rotate_y(orbit)`.
    ///
    /// Applied to a point, the orbit rotation runs first (about the earth's
    /// own centre), then the offset, then the spin (about the sun).
    pub fn earth_model(&self) -> Mat4 {
        Mat4::from_rotation_y(self.spin)
            * Mat4::from_translation(Vec3::new(ORBIT_DISTANCE, 0.0, 0.0))
            * Mat4::from_rotation_y(self.orbit)
    }

    /// World-space centre of the earth.
    pub fn earth_position(&self) -> Vec3 {
        self.earth_model().transform_point3(Vec3::ZERO)
    }
}

fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let scene = SceneState::new();
        assert_eq!(scene.spin(), 0.0);
        assert_eq!(scene.orbit(), 0.0);
        assert_eq!(scene.sun_model(), Mat4::IDENTITY);
    }

    #[test]
    fn test_advance_steps() {
        let mut scene = SceneState::new();
        scene.advance();
        assert!((scene.spin() - SPIN_STEP).abs() < 1e-9);
        assert!((scene.orbit() - ORBIT_STEP).abs() < 1e-12);

        for _ in 0..99 {
            scene.advance();
        }
        assert!((scene.spin() - 100.0 * SPIN_STEP).abs() < 1e-5);
    }

    #[test]
    fn test_angles_stay_in_range() {
        let mut scene = SceneState::new();
        // Enough frames for the spin to wrap several times.
        for _ in 0..20_000 {
            scene.advance();
            assert!((0.0..TAU).contains(&scene.spin()));
            assert!((0.0..TAU).contains(&scene.orbit()));
        }
        // 20 rad of spin wraps to 20 - 3 * TAU.
        assert!((scene.spin() - (20.0 - 3.0 * TAU)).abs() < 1e-2);
    }

    #[test]
    fn test_wrap_angle() {
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(-0.5) - (TAU - 0.5)).abs() < 1e-6);
        assert!(wrap_angle(-f32::EPSILON * 0.1) < TAU);
    }

    #[test]
    fn test_earth_starts_on_positive_x() {
        let scene = SceneState::new();
        let pos = scene.earth_position();
        assert!((pos - Vec3::new(ORBIT_DISTANCE, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_earth_stays_at_orbit_distance() {
        let mut scene = SceneState::new();
        for _ in 0..5_000 {
            scene.advance();
            let pos = scene.earth_position();
            assert!((pos.length() - ORBIT_DISTANCE).abs() < 1e-4);
            assert!(pos.y.abs() < 1e-6);
        }
    }

    #[test]
    fn test_earth_moves_with_spin() {
        // A quarter turn of spin swings the earth from +X to -Z.
        let scene = SceneState {
            spin: TAU / 4.0,
            orbit: 0.0,
        };
        let pos = scene.earth_position();
        assert!((pos - Vec3::new(0.0, 0.0, -ORBIT_DISTANCE)).length() < 1e-4);
    }

    #[test]
    fn test_orbit_rotates_about_earth_centre() {
        let scene = SceneState {
            spin: 0.0,
            orbit: TAU / 4.0,
        };
        // The centre is unaffected by the orbit angle alone.
        let centre = scene.earth_position();
        assert!((centre - Vec3::new(ORBIT_DISTANCE, 0.0, 0.0)).length() < 1e-5);

        // A surface point on +X of the unit earth ends up on -Z of the centre.
        let surface = scene.earth_model().transform_point3(Vec3::X * EARTH_RADIUS);
        let expected = Vec3::new(ORBIT_DISTANCE, 0.0, -EARTH_RADIUS);
        assert!((surface - expected).length() < 1e-5);
    }
}
