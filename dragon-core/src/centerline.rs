/// Parametric centerline curves and the per-segment reference frames along them
use nalgebra::{Point3, Vector3};
use serde::Deserialize;

/// Step used for the forward finite-difference tangent
pub const FINITE_DIFFERENCE_STEP: f32 = 0.01;

/// Lengths below this are treated as zero when building a frame
const DEGENERATE_LENGTH: f32 = 1e-6;

/// Which curve the body follows, as written in config files
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// Sine wave in the XY plane, advancing along X
    #[default]
    Sine,
    /// Circle of the given radius in the XY plane
    Torus { major_radius: f32 },
}

/// A centerline curve, parameterised by distance `x` along the body and an
/// animation `phase`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Centerline {
    Sine { amplitude: f32, frequency: f32 },
    Torus { major_radius: f32 },
}

impl Centerline {
    /// Point on the curve
    pub fn center(&self, x: f32, phase: f32) -> Point3<f32> {
        match *self {
            Centerline::Sine {
                amplitude,
                frequency,
            } => Point3::new(x, amplitude * (frequency * x + phase).sin(), 0.0),
            Centerline::Torus { major_radius } => {
                let theta = x / major_radius + phase;
                Point3::new(
                    major_radius * theta.cos(),
                    major_radius * theta.sin(),
                    0.0,
                )
            }
        }
    }

    /// Fixed reference used to derive the binormal
    pub fn up(&self) -> Vector3<f32> {
        match self {
            Centerline::Sine { .. } => Vector3::y(),
            // Perpendicular to the torus plane, so it never meets the tangent
            Centerline::Torus { .. } => Vector3::z(),
        }
    }

    /// Reference frame at `x`.
    ///
    /// `previous` is the frame of the preceding segment and is only consulted
    /// when this one degenerates. The flag reports whether the fallback ran.
    pub fn frame(&self, x: f32, phase: f32, previous: Option<&Frame>) -> (Frame, bool) {
        let center = self.center(x, phase);
        let ahead = self.center(x + FINITE_DIFFERENCE_STEP, phase);
        Frame::orthonormal(center, ahead - center, self.up(), previous)
    }
}

/// Orthonormal basis at one segment of the sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub center: Point3<f32>,
    pub tangent: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub binormal: Vector3<f32>,
}

impl Frame {
    /// Basis used when the very first segment degenerates
    pub fn fallback(center: Point3<f32>) -> Self {
        Self {
            center,
            tangent: Vector3::x(),
            normal: Vector3::y(),
            binormal: Vector3::z(),
        }
    }

    /// Build a frame from an unnormalised tangent.
    ///
    /// `binormal = normalize(up x tangent)`, `normal = normalize(tangent x binormal)`.
    /// If the tangent vanishes or runs parallel to `up`, the previous frame's
    /// basis is carried over to `center` instead.
    pub fn orthonormal(
        center: Point3<f32>,
        tangent: Vector3<f32>,
        up: Vector3<f32>,
        previous: Option<&Frame>,
    ) -> (Self, bool) {
        let tangent = match tangent.try_normalize(DEGENERATE_LENGTH) {
            Some(t) => t,
            None => return (Self::carry_over(center, None, previous), true),
        };

        let binormal = match up.cross(&tangent).try_normalize(DEGENERATE_LENGTH) {
            Some(b) => b,
            None => return (Self::carry_over(center, Some(tangent), previous), true),
        };

        let normal = tangent.cross(&binormal).normalize();

        (
            Self {
                center,
                tangent,
                normal,
                binormal,
            },
            false,
        )
    }

    fn carry_over(
        center: Point3<f32>,
        tangent: Option<Vector3<f32>>,
        previous: Option<&Frame>,
    ) -> Self {
        match previous {
            Some(prev) => Self {
                center,
                tangent: tangent.unwrap_or(prev.tangent),
                normal: prev.normal,
                binormal: prev.binormal,
            },
            None => Self::fallback(center),
        }
    }

    /// Unit direction of a ring point at `angle` in the normal/binormal plane
    #[inline]
    pub fn radial(&self, angle: f32) -> Vector3<f32> {
        (self.normal * angle.cos() + self.binormal * angle.sin()).normalize()
    }

    /// Position of a ring point at `angle` and `radius` around `center`
    #[inline]
    pub fn ring_point(&self, center: &Point3<f32>, angle: f32, radius: f32) -> Point3<f32> {
        center + self.normal * (radius * angle.cos()) + self.binormal * (radius * angle.sin())
    }
}
