//! Camera and orbit controls for the topology view

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use std::f32::consts::PI;

/// Maps nalgebra's OpenGL clip space (z in -1..1) to wgpu's (z in 0..1)
#[rustfmt::skip]
fn opengl_to_wgpu() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// A perspective camera looking at a target
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far);
        perspective.into_inner()
    }

    /// Combined view-projection in wgpu clip space
    pub fn view_projection(&self) -> Matrix4<f32> {
        opengl_to_wgpu() * self.projection_matrix() * self.view_matrix()
    }

    /// Update the aspect ratio from a surface size; zero sizes are ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    /// Project a world point to pixel coordinates (origin top-left).
    ///
    /// Returns `None` for points behind the camera.
    pub fn project_to_screen(&self, point: &Point3<f32>, size: [f32; 2]) -> Option<[f32; 2]> {
        let clip = self.view_projection() * point.to_homogeneous();
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        Some([
            (ndc_x + 1.0) * 0.5 * size[0],
            (1.0 - ndc_y) * 0.5 * size[1],
        ])
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Point3::new(0.0, 20.0, 40.0),
            Point3::origin(),
            Vector3::y(),
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
            0.1,
            500.0,
        )
    }
}

/// Orbit controller: drag rotates around the target, wheel zooms.
///
/// Input accumulates into angular velocity which decays by `damping` each
/// update, so the view keeps gliding briefly after the pointer stops.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    /// Angle around the Y axis
    pub azimuth: f32,
    /// Angle from the +Y axis
    pub polar: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of velocity dropped per update, 0..1
    pub damping: f32,
    /// Radians per pixel of drag
    pub rotate_speed: f32,
    /// Relative distance change per wheel line
    pub zoom_speed: f32,
    azimuth_velocity: f32,
    polar_velocity: f32,
}

const MIN_POLAR: f32 = 0.05;
const MAX_POLAR: f32 = PI - 0.05;

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Point3::origin(),
            azimuth: 0.0,
            polar: 1.1,
            distance: 45.0,
            min_distance: 5.0,
            max_distance: 200.0,
            damping: 0.1,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            azimuth_velocity: 0.0,
            polar_velocity: 0.0,
        }
    }
}

impl OrbitControls {
    /// Feed a pointer drag in pixels
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.azimuth_velocity -= dx * self.rotate_speed;
        self.polar_velocity -= dy * self.rotate_speed;
    }

    /// Zoom by wheel lines; positive moves closer
    pub fn zoom(&mut self, lines: f32) {
        let factor = (1.0 - lines * self.zoom_speed).max(0.1);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Integrate velocity, apply damping and write the camera position
    pub fn update(&mut self, camera: &mut Camera) {
        self.azimuth += self.azimuth_velocity;
        self.polar = (self.polar + self.polar_velocity).clamp(MIN_POLAR, MAX_POLAR);

        let keep = 1.0 - self.damping.clamp(0.0, 1.0);
        self.azimuth_velocity *= keep;
        self.polar_velocity *= keep;

        camera.target = self.target;
        camera.position = self.target + self.offset();
    }

    fn offset(&self) -> Vector3<f32> {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        Vector3::new(
            self.distance * sin_polar * sin_azimuth,
            self.distance * cos_polar,
            self.distance * sin_polar * cos_azimuth,
        )
    }
}
