/// Centerline sweep: places ring profiles along the curve and stitches them
use crate::centerline::{Centerline, Frame};
use crate::config::ShapeParameters;
use crate::geometry::MeshBuffers;
use crate::ring::RingAngles;

/// Radius every ring point tapers towards at the last segment
pub const TAPER_FLOOR: f32 = 0.5;

/// Where the body ends, for attaching the tail cap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepEnd {
    pub frame: Frame,
    /// Radius of the ordinary (non-spine) ring points at the last segment
    pub radius: f32,
    /// Frames that needed the degeneracy fallback
    pub degenerate_frames: usize,
}

/// Linearly taper `start` towards [`TAPER_FLOOR`] over `segment_count` rings.
///
/// `segment_count` must be at least 2.
#[inline]
pub fn taper_radius(start: f32, segment: usize, segment_count: usize) -> f32 {
    debug_assert!(segment_count > 1);
    start - (start - TAPER_FLOOR) / (segment_count - 1) as f32 * segment as f32
}

/// Starting radius for ring point `index`
#[inline]
pub fn base_radius(params: &ShapeParameters, index: usize) -> f32 {
    if RingAngles::is_spine_peak(index) {
        params.radius * params.spine_height
    } else {
        params.radius
    }
}

/// Emit two triangles per quad between ring `from` and ring `to`.
///
/// Both rings start at vertex offsets `from`/`to` and hold `ring_len` points.
/// The ring wraps around; the strip itself does not.
pub(crate) fn stitch_rings(out: &mut MeshBuffers, from: u32, to: u32, ring_len: u32) {
    for i in 0..ring_len {
        let next = (i + 1) % ring_len;
        let a = from + i;
        let b = from + next;
        let a_next = to + i;
        let b_next = to + next;

        out.push_triangle(a, a_next, b);
        out.push_triangle(b, a_next, b_next);
    }
}

/// Sweep the ring along the centerline into `out`.
///
/// Vertex `s * ring.len() + p` is ring point `p` of segment `s`. The caller
/// has already validated `params`.
pub fn sweep_body(
    params: &ShapeParameters,
    ring: &RingAngles,
    phase: f32,
    out: &mut MeshBuffers,
) -> SweepEnd {
    let curve: Centerline = params.centerline();
    let segment_count = params.segment_count();
    let ring_len = ring.len();

    out.reserve(
        segment_count * ring_len,
        (segment_count - 1) * ring_len * 6,
    );

    let mut previous: Option<Frame> = None;
    let mut degenerate_frames = 0;

    for segment in 0..segment_count {
        let x = params.segment_position(segment);
        let (frame, degenerate) = curve.frame(x, phase, previous.as_ref());
        if degenerate {
            degenerate_frames += 1;
            tracing::warn!(segment, x, phase, "Degenerate centerline frame, reusing previous basis");
        }

        for (index, &angle) in ring.iter().enumerate() {
            let radius = taper_radius(base_radius(params, index), segment, segment_count);
            out.push_vertex(
                frame.ring_point(&frame.center, angle, radius),
                frame.radial(angle),
            );
        }

        previous = Some(frame);
    }

    for segment in 0..segment_count - 1 {
        let from = (segment * ring_len) as u32;
        stitch_rings(out, from, from + ring_len as u32, ring_len as u32);
    }

    SweepEnd {
        // segment_count >= 2, so the loop ran
        frame: previous.unwrap_or_else(|| Frame::fallback(curve.center(0.0, phase))),
        radius: taper_radius(params.radius, segment_count - 1, segment_count),
        degenerate_frames,
    }
}
