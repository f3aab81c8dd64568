//! View and projection matrices for the scene camera.
//!
//! Scene space is left-handed with Y up and +Z forward, so the view uses
//! `look_to_lh` and the projection `perspective_lh` with near and far
//! swapped for reverse-Z.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Camera data uploaded once per frame (bind group 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
}

#[derive(Debug, Clone)]
pub struct SceneCamera {
    pub eye: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    /// Must enclose the sky sphere.
    pub far: f32,
}

impl SceneCamera {
    pub const DEFAULT_NEAR: f32 = 0.1;
    pub const DEFAULT_FAR: f32 = 5000.0;

    #[must_use]
    pub fn new(fov_y_degrees: f32, aspect_ratio: f32) -> Self {
        Self {
            eye: Vec3::ZERO,
            forward: Vec3::Z,
            up: Vec3::Y,
            fov_y: fov_y_degrees.clamp(1.0, 179.0).to_radians(),
            aspect_ratio,
            near: Self::DEFAULT_NEAR,
            far: Self::DEFAULT_FAR,
        }
    }

    /// Place the camera. Degenerate directions keep the previous basis.
    pub fn set_pose(&mut self, eye: Vec3, forward: Vec3, up: Vec3) {
        self.eye = eye;
        if let (Some(f), Some(u)) = (forward.try_normalize(), up.try_normalize())
            && f.cross(u).length_squared() > 1e-8
        {
            self.forward = f;
            self.up = u;
        }
    }

    /// Zero-height windows (minimized) keep the previous ratio.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_lh(self.eye, self.forward, self.up)
    }

    /// Reverse-Z: near maps to 1, far to 0.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_lh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    #[must_use]
    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            camera_pos: self.eye.extend(1.0).to_array(),
        }
    }
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self::new(60.0, 16.0 / 9.0)
    }
}
