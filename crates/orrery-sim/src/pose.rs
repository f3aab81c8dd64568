//! Camera position and orientation.
//!
//! Simulation space is Y-up with +Z pointing away from the start camera, into
//! the scene. Rotation is stored as Euler angles in degrees:
//! `x` pitches the view down, `y` yaws it to the right, `z` is roll.

use glam::Vec3;

/// Where the camera is and which way it faces.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    /// Euler angles in degrees: (pitch, yaw, roll).
    pub rotation: Vec3,
}

impl CameraPose {
    pub const fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    /// Linear interpolation of position and rotation, each component
    /// independently. `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(&self, target: &CameraPose, t: f32) -> CameraPose {
        let t = t.clamp(0.0, 1.0);
        CameraPose {
            position: self.position.lerp(target.position, t),
            rotation: self.rotation.lerp(target.rotation, t),
        }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        let (sin_p, cos_p) = self.rotation.x.to_radians().sin_cos();
        let (sin_y, cos_y) = self.rotation.y.to_radians().sin_cos();
        Vec3::new(sin_y * cos_p, -sin_p, cos_y * cos_p)
    }

    /// Unit up vector, perpendicular to [`forward`](Self::forward).
    pub fn up(&self) -> Vec3 {
        let (sin_p, cos_p) = self.rotation.x.to_radians().sin_cos();
        let (sin_y, cos_y) = self.rotation.y.to_radians().sin_cos();
        Vec3::new(sin_y * sin_p, cos_p, cos_y * sin_p)
    }

    /// Unit vector to the camera's right, always horizontal.
    pub fn right(&self) -> Vec3 {
        let (sin_y, cos_y) = self.rotation.y.to_radians().sin_cos();
        Vec3::new(cos_y, 0.0, -sin_y)
    }

    /// Turn to face `target` with zero roll. A target at the camera position
    /// leaves the rotation unchanged.
    pub fn look_at(&mut self, target: Vec3) {
        let d = target - self.position;
        if d.length_squared() <= f32::EPSILON {
            return;
        }
        let horizontal = (d.x * d.x + d.z * d.z).sqrt();
        self.rotation = Vec3::new(
            (-d.y).atan2(horizontal).to_degrees(),
            d.x.atan2(d.z).to_degrees(),
            0.0,
        );
    }

    /// Move along the view direction. Negative distances back away.
    pub fn dolly(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_identity_faces_positive_z() {
        let pose = CameraPose::default();
        assert!(approx(pose.forward(), Vec3::Z));
        assert!(approx(pose.up(), Vec3::Y));
        assert!(approx(pose.right(), Vec3::X));
    }

    #[test]
    fn test_pitch_ninety_looks_straight_down() {
        let pose = CameraPose::new(Vec3::new(0.0, 50.0, 0.0), Vec3::new(90.0, 0.0, 0.0));
        assert!(approx(pose.forward(), Vec3::NEG_Y));
        assert!(approx(pose.up(), Vec3::Z));
    }

    #[test]
    fn test_basis_is_orthonormal() {
        for (p, y) in [(10.0, 0.0), (-35.0, 120.0), (80.0, -45.0)] {
            let pose = CameraPose::new(Vec3::ZERO, Vec3::new(p, y, 0.0));
            let (f, u, r) = (pose.forward(), pose.up(), pose.right());
            assert!(f.dot(u).abs() < 1e-5);
            assert!(f.dot(r).abs() < 1e-5);
            assert!(u.dot(r).abs() < 1e-5);
            assert!((f.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let mut pose = CameraPose::new(Vec3::new(3.0, 4.0, -10.0), Vec3::ZERO);
        let target = Vec3::new(10.0, 0.0, 2.0);
        pose.look_at(target);
        let expected = (target - pose.position).normalize();
        assert!(approx(pose.forward(), expected));
        assert_eq!(pose.rotation.z, 0.0);
    }

    #[test]
    fn test_look_at_self_keeps_rotation() {
        let mut pose = CameraPose::new(Vec3::ONE, Vec3::new(12.0, 34.0, 0.0));
        pose.look_at(Vec3::ONE);
        assert_eq!(pose.rotation, Vec3::new(12.0, 34.0, 0.0));
    }

    #[test]
    fn test_lerp_endpoints_and_clamp() {
        let a = CameraPose::new(Vec3::new(0.0, 0.0, -40.0), Vec3::ZERO);
        let b = CameraPose::new(Vec3::new(10.0, 1.0, -20.0), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 3.0), b);
        assert_eq!(a.lerp(&b, -1.0), a);
        let mid = a.lerp(&b, 0.5);
        assert!(approx(mid.position, Vec3::new(5.0, 0.5, -30.0)));
        assert!(approx(mid.rotation, Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_dolly_moves_along_forward() {
        let mut pose = CameraPose::new(Vec3::new(0.0, 0.0, -40.0), Vec3::ZERO);
        pose.dolly(2.5);
        assert!(approx(pose.position, Vec3::new(0.0, 0.0, -37.5)));

        let mut tilted = CameraPose::new(Vec3::ZERO, Vec3::new(90.0, 0.0, 0.0));
        tilted.dolly(-3.0);
        assert!(approx(tilted.position, Vec3::new(0.0, 3.0, 0.0)));
    }
}
