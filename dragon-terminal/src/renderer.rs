/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use dragon_core::MeshBuffers;
use nalgebra::{Matrix4, Vector3};
use std::io::Write;

use crate::view::Camera;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Projected vertex: screen x, screen y, depth, brightness
type ScreenVertex = (f32, f32, f32, f32);

/// ASCII renderer that converts indexed meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    light_dir: Vector3<f32>,
    projected: Vec<Option<ScreenVertex>>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            light_dir: Vector3::new(0.3, 0.5, 1.0).normalize(),
            projected: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
    }

    /// Character at a cell, for inspection
    pub fn cell(&self, x: usize, y: usize) -> char {
        self.char_buffer[y * self.width + x]
    }

    pub fn render_mesh(&mut self, mesh: &MeshBuffers, model_matrix: &Matrix4<f32>, camera: &Camera) {
        let mvp = camera.projection_matrix() * camera.view_matrix() * model_matrix;
        let (width, height) = (self.width as u32, self.height as u32);
        let light_dir = self.light_dir;

        // Project and light each shared vertex once
        self.projected.clear();
        self.projected.extend(mesh.positions.iter().zip(&mesh.normals).map(
            |(position, normal)| {
                let (x, y, z) = Camera::project(&mvp, position, width, height)?;
                let world_normal = model_matrix.transform_vector(normal);
                let brightness = world_normal.dot(&light_dir).max(0.0);
                Some((x, y, z, brightness))
            },
        ));

        for triangle in mesh.indices.chunks_exact(3) {
            let corners = [
                self.projected[triangle[0] as usize],
                self.projected[triangle[1] as usize],
                self.projected[triangle[2] as usize],
            ];
            // Triangle is clipped if any corner left the view volume
            if let [Some(v0), Some(v1), Some(v2)] = corners {
                self.rasterize_triangle([v0, v1, v2]);
            }
        }
    }

    fn rasterize_triangle(&mut self, coords: [ScreenVertex; 3]) {
        let [v0, v1, v2] = coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    // Zero-area on screen
                    return;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    let brightness = w0 * v0.3 + w1 * v1.3 + w2 * v2.3;
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = shade(brightness);
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let c = self.char_buffer[y * self.width + x];

                // Color based on character intensity
                let color = match c {
                    ' ' | '.' | ':' => Color::DarkGreen,
                    '-' | '=' => Color::Green,
                    '+' | '*' => Color::Yellow,
                    '#' | '%' | '@' => Color::Red,
                    _ => Color::White,
                };

                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Map a brightness in `[0, 1]` to a ramp character; lit surfaces never use blank
fn shade(brightness: f32) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = 1 + (brightness.clamp(0.0, 1.0) * (last - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(last)]
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dragon_core::{build_ring_angles, generate, ShapeParameters};

    #[test]
    fn test_barycentric_corners() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (0.0, 0.0)).unwrap();
        assert!((w0 - 1.0).abs() < 1e-6);
        assert!(w1.abs() < 1e-6 && w2.abs() < 1e-6);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }

    #[test]
    fn test_shade_range() {
        assert_eq!(shade(0.0), '.');
        assert_eq!(shade(1.0), '@');
        assert_eq!(shade(7.0), '@');
    }

    #[test]
    fn test_dragon_covers_screen_center() {
        let params = ShapeParameters::default();
        let ring = build_ring_angles(params.points, params.spine_width);
        let dragon = generate(&params, &ring, 0.0).unwrap();

        let mut camera = Camera::new(60, 30);
        camera.frame_bounds(&dragon.buffers.bounds().unwrap());

        let mut renderer = AsciiRenderer::new(60, 30);
        renderer.clear();
        renderer.render_mesh(&dragon.buffers, &Matrix4::identity(), &camera);

        let drawn = renderer.char_buffer.iter().filter(|&&c| c != ' ').count();
        assert!(drawn > 0);
        assert_ne!(renderer.cell(30, 15), ' ');

        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        assert!(!out.is_empty());
    }
}
