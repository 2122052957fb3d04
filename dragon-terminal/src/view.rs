/// Camera and orbit controls for viewing a mesh in the terminal
use dragon_core::Aabb;
use nalgebra::{Matrix4, Point3, Vector3};

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 0.5;

/// Extra room around the framed mesh
const FRAMING_MARGIN: f32 = 1.2;

/// View rotation around the framed mesh (in radians)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orbit {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Orbit {
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, d_pitch: f32, d_yaw: f32, d_roll: f32) {
        self.pitch += d_pitch;
        self.yaw += d_yaw;
        self.roll += d_roll;
    }

    /// Model matrix rotating the scene about `pivot`
    pub fn model_matrix(&self, pivot: &Point3<f32>) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(self.pitch, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, self.yaw, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.roll));

        // Apply rotations in order: Z, Y, X
        Matrix4::new_translation(&pivot.coords)
            * rz
            * ry
            * rx
            * Matrix4::new_translation(&-pivot.coords)
    }
}

/// Perspective camera looking down -Z at its target
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 * CELL_ASPECT / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Move the camera back far enough to see all of `bounds` from any orbit
    pub fn frame_bounds(&mut self, bounds: &Aabb) {
        let radius = (bounds.extent().norm() * 0.5).max(1e-3);
        let half_fov = (self.fov * 0.5).min(self.fov * 0.5 * self.aspect);
        let distance = radius * FRAMING_MARGIN / half_fov.sin();

        self.target = bounds.center();
        self.position = self.target + Vector3::z() * distance;
        self.near = (distance - radius * 2.0).max(0.01);
        self.far = distance + radius * 2.0;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Project a world point through `mvp` to screen space.
    ///
    /// Returns `(x, y, depth)` or `None` when the point leaves the view volume.
    pub fn project(
        mvp: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = mvp * point.to_homogeneous();

        // Prevent division by near-zero depth values
        if clip.w.abs() < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
