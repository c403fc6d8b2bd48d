//! Fixed-eye camera with scroll zoom.
//!
//! The eye sits at (0, 0, 20) looking at the origin with +Y up. Only the
//! vertical field of view ("zoom") and the aspect ratio change at runtime;
//! the projection matrix is recomputed whenever either does.

use crate::pipeline::CameraUniform;
use crate::skybox::SkyboxUniform;
use glam::{Mat3, Mat4, Vec3};

/// Narrowest field of view, in degrees.
pub const ZOOM_MIN: f32 = 1.0;
/// Widest field of view and the starting zoom, in degrees.
pub const ZOOM_MAX: f32 = 45.0;
/// Degrees of field of view removed per scroll line.
pub const ZOOM_STEP: f32 = 5.0;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

pub const EYE: Vec3 = Vec3::new(0.0, 0.0, 20.0);
pub const TARGET: Vec3 = Vec3::ZERO;
pub const UP: Vec3 = Vec3::Y;

#[derive(Debug, Clone)]
pub struct Camera {
    /// Vertical field of view in degrees, always within [`ZOOM_MIN`, `ZOOM_MAX`].
    zoom: f32,
    /// Width / height.
    aspect_ratio: f32,
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    /// Camera at full zoom-out for a viewport of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let aspect_ratio = aspect(width, height);
        Self {
            zoom: ZOOM_MAX,
            aspect_ratio,
            view: Mat4::look_at_rh(EYE, TARGET, UP),
            projection: perspective(ZOOM_MAX, aspect_ratio),
        }
    }

    /// Apply a scroll of `delta` lines: positive zooms in. Returns the new zoom.
    pub fn on_scroll(&mut self, delta: f32) -> f32 {
        self.zoom = (self.zoom - ZOOM_STEP * delta).clamp(ZOOM_MIN, ZOOM_MAX);
        self.projection = perspective(self.zoom, self.aspect_ratio);
        self.zoom
    }

    /// Track a new framebuffer size. Zero dimensions are clamped to 1.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect_ratio = aspect(width, height);
        self.projection = perspective(self.zoom, self.aspect_ratio);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// View matrix with the translation stripped, so the skybox stays at infinity.
    pub fn skybox_view_matrix(&self) -> Mat4 {
        Mat4::from_mat3(Mat3::from_mat4(self.view))
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    /// Uniform for the planet shader's camera group.
    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
        }
    }

    /// Uniform for the skybox shader.
    pub fn to_skybox_uniform(&self) -> SkyboxUniform {
        SkyboxUniform {
            view: self.skybox_view_matrix().to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
        }
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

fn perspective(zoom_degrees: f32, aspect_ratio: f32) -> Mat4 {
    Mat4::perspective_rh(zoom_degrees.to_radians(), aspect_ratio, NEAR_PLANE, FAR_PLANE)
}
