/// Cross-section ring layout with the dorsal spine fin
use std::f32::consts::TAU;
use std::ops::Deref;

/// Samples closer than this to angle zero are treated as the seam and dropped
const ZERO_ANGLE_TOLERANCE: f32 = 1e-6;

/// Ordered angles (radians) around one ring.
///
/// The first three entries are always `-spine_width`, `0.0` and `+spine_width`;
/// index [`RingAngles::SPINE_PEAK`] is the raised spine point.
#[derive(Debug, Clone, PartialEq)]
pub struct RingAngles {
    angles: Vec<f32>,
}

impl RingAngles {
    /// Index of the spine peak, which receives the height-multiplied radius
    pub const SPINE_PEAK: usize = 1;

    pub fn is_spine_peak(index: usize) -> bool {
        index == Self::SPINE_PEAK
    }
}

impl Deref for RingAngles {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.angles
    }
}

/// Build the ring angles for `point_count` evenly spaced samples.
///
/// Samples landing on zero are discarded and the three spine angles are
/// inserted at the front. Downstream sizing must use the returned length,
/// never `point_count`. Counts below three are accepted and yield a
/// degenerate (fin-only) ring.
pub fn build_ring_angles(point_count: usize, spine_width: f32) -> RingAngles {
    let mut angles = Vec::with_capacity(point_count + 2);
    angles.extend_from_slice(&[-spine_width, 0.0, spine_width]);

    angles.extend(
        (0..point_count)
            .map(|i| TAU * i as f32 / point_count as f32)
            .filter(|angle| angle.abs() > ZERO_ANGLE_TOLERANCE),
    );

    RingAngles { angles }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spine_angles_lead() {
        let ring = build_ring_angles(10, 0.01);
        assert!((ring[0] + 0.01).abs() < 1e-6);
        assert_eq!(ring[RingAngles::SPINE_PEAK], 0.0);
        assert!((ring[2] - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_length_drops_seam_sample() {
        for points in 3..40 {
            let ring = build_ring_angles(points, 0.05);
            assert_eq!(ring.len(), points - 1 + 3);
        }
    }

    #[test]
    fn test_remaining_angles_evenly_spaced() {
        let ring = build_ring_angles(8, 0.02);
        let step = TAU / 8.0;
        for (k, angle) in ring[3..].iter().enumerate() {
            assert!((angle - step * (k + 1) as f32).abs() < 1e-5);
        }
    }

    #[test]
    fn test_single_point_is_fin_only() {
        let ring = build_ring_angles(1, 0.1);
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_zero_spine_width_coincides() {
        // Coincident spine angles are kept; they only produce zero-area triangles.
        let ring = build_ring_angles(6, 0.0);
        assert_eq!(ring.len(), 8);
        assert_eq!(ring[0], ring[1]);
        assert_eq!(ring[1], ring[2]);
    }
}
