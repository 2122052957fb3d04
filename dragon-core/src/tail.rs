/// Tail cap: shrinking rings closing the open end of the body in a fan
use std::f32::consts::FRAC_PI_2;

use crate::centerline::Frame;
use crate::geometry::MeshBuffers;
use crate::ring::RingAngles;
use crate::sweep::stitch_rings;

/// Rings in the cap, before the apex
pub const TAIL_RINGS: usize = 5;

/// Vertex count of a tail for a ring of `ring_len` points
pub fn tail_vertex_count(ring_len: usize) -> usize {
    ring_len * TAIL_RINGS + 1
}

/// Index count of a tail for a ring of `ring_len` points
pub fn tail_index_count(ring_len: usize) -> usize {
    (TAIL_RINGS - 1) * ring_len * 6 + ring_len * 3
}

/// Generate the cap at `end` into `out` with indices local to `out`.
///
/// Ring `j` sits at `phi = j / 5 * pi/2` on a quarter circle of `end_radius`,
/// so the rings follow a hemisphere before the apex at
/// `center + tangent * end_radius`.
pub fn generate_tail(end: &Frame, ring: &RingAngles, end_radius: f32, out: &mut MeshBuffers) {
    let ring_len = ring.len();
    out.reserve(tail_vertex_count(ring_len), tail_index_count(ring_len));
    let base = out.vertex_count() as u32;

    for j in 0..TAIL_RINGS {
        let phi = j as f32 / TAIL_RINGS as f32 * FRAC_PI_2;
        let radius = end_radius * phi.cos();
        let center = end.center + end.tangent * (end_radius * phi.sin());

        for &angle in ring.iter() {
            // Hemisphere normal: tilts from radial towards the tangent
            let normal = (end.radial(angle) * phi.cos() + end.tangent * phi.sin()).normalize();
            out.push_vertex(end.ring_point(&center, angle, radius), normal);
        }
    }

    let apex = out.push_vertex(end.center + end.tangent * end_radius, end.tangent);

    let ring_len = ring_len as u32;
    for j in 0..TAIL_RINGS as u32 - 1 {
        let from = base + j * ring_len;
        stitch_rings(out, from, from + ring_len, ring_len);
    }

    let last = base + (TAIL_RINGS as u32 - 1) * ring_len;
    for i in 0..ring_len {
        let a = last + i;
        let b = last + (i + 1) % ring_len;
        out.push_triangle(a, apex, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::build_ring_angles;
    use nalgebra::{Point3, Vector3};

    fn end_frame() -> Frame {
        Frame {
            center: Point3::new(1.0, 0.0, 0.0),
            tangent: Vector3::x(),
            normal: Vector3::y(),
            binormal: -Vector3::z(),
        }
    }

    #[test]
    fn test_tail_counts() {
        let ring = build_ring_angles(10, 0.01);
        let mut out = MeshBuffers::new();
        generate_tail(&end_frame(), &ring, 0.5, &mut out);

        assert_eq!(out.vertex_count(), 61);
        assert_eq!(out.vertex_count(), tail_vertex_count(ring.len()));
        assert_eq!(out.indices.len(), 4 * 12 * 6 + 12 * 3);
        assert_eq!(out.indices.len(), tail_index_count(ring.len()));
    }

    #[test]
    fn test_apex_and_rings_on_hemisphere() {
        let frame = end_frame();
        let ring = build_ring_angles(8, 0.05);
        let mut out = MeshBuffers::new();
        generate_tail(&frame, &ring, 0.5, &mut out);

        let apex = out.vertex_count() - 1;
        assert!((out.positions[apex] - Point3::new(1.5, 0.0, 0.0)).norm() < 1e-6);
        assert_eq!(out.normals[apex], Vector3::x());

        for p in &out.positions {
            assert!(((p - frame.center).norm() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rings_shrink() {
        let frame = end_frame();
        let ring = build_ring_angles(6, 0.05);
        let mut out = MeshBuffers::new();
        generate_tail(&frame, &ring, 1.0, &mut out);

        let ring_len = ring.len();
        let radius_of = |j: usize| {
            let p = out.positions[j * ring_len + 4];
            Vector3::new(0.0, p.y, p.z).norm()
        };
        for j in 0..TAIL_RINGS - 1 {
            assert!(radius_of(j + 1) < radius_of(j));
        }
    }

    #[test]
    fn test_fan_closes_on_apex() {
        let ring = build_ring_angles(10, 0.01);
        let mut out = MeshBuffers::new();
        generate_tail(&end_frame(), &ring, 0.5, &mut out);

        let apex = (out.vertex_count() - 1) as u32;
        let fan = &out.indices[4 * 12 * 6..];
        assert_eq!(fan.len(), 36);
        for triangle in fan.chunks(3) {
            assert_eq!(triangle[1], apex);
        }
        assert_eq!(&fan[33..], &[59, apex, 48]);
    }

    #[test]
    fn test_local_indices_start_at_existing_vertices() {
        let ring = build_ring_angles(4, 0.1);
        let mut out = MeshBuffers::new();
        out.push_vertex(Point3::origin(), Vector3::x());
        generate_tail(&end_frame(), &ring, 0.5, &mut out);
        assert_eq!(out.indices[0], 1);
    }
}
