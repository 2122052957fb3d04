//! Shape parameters for the dragon body
//!
//! Parameters are plain data: a host may edit them at any time and the change
//! takes effect on the next regeneration. Only the fail-fast checks in
//! [`ShapeParameters::validate`] are applied.
//!
//! ```toml
//! radius = 1.0
//! spine_width = 0.01
//! spine_height = 1.5
//! dragon_meters = 2.0
//! points = 12
//! segments_per_meter = 10
//! amplitude = 0.1
//! frequency = 0.1
//! path = "sine"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::centerline::{Centerline, PathKind};
use crate::error::{ConfigError, DragonError, DragonResult};
use crate::tail::TAIL_RINGS;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShapeParameters {
    /// Ring base radius
    pub radius: f32,
    /// Angular half-width of the fin around angle zero (radians)
    pub spine_width: f32,
    /// Radius multiplier for the spine peak
    pub spine_height: f32,
    /// Body length along the centerline
    pub dragon_meters: f32,
    /// Evenly spaced samples per ring, before the spine is inserted
    pub points: usize,
    /// Rings per unit of body length
    pub segments_per_meter: f32,
    /// Sine path amplitude
    pub amplitude: f32,
    /// Sine path frequency
    pub frequency: f32,
    pub path: PathKind,
}

impl Default for ShapeParameters {
    fn default() -> Self {
        Self {
            radius: 1.0,
            spine_width: 0.01,
            spine_height: 1.5,
            dragon_meters: 1.0,
            points: 10,
            segments_per_meter: 10.0,
            amplitude: 0.1,
            frequency: 0.1,
            path: PathKind::Sine,
        }
    }
}

impl ShapeParameters {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let params = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.as_ref().display(), "Loaded shape parameters");
        Ok(params)
    }

    /// Number of rings along the body
    pub fn segment_count(&self) -> usize {
        (self.dragon_meters * self.segments_per_meter).round().max(0.0) as usize
    }

    /// Curve parameter of segment `index`
    pub fn segment_position(&self, index: usize) -> f32 {
        index as f32 / self.segments_per_meter
    }

    pub fn centerline(&self) -> Centerline {
        match self.path {
            PathKind::Sine => Centerline::Sine {
                amplitude: self.amplitude,
                frequency: self.frequency,
            },
            PathKind::Torus { major_radius } => Centerline::Torus { major_radius },
        }
    }

    /// Reject configurations that cannot form a tube
    pub fn validate(&self) -> DragonResult<()> {
        for (name, value) in [
            ("radius", self.radius),
            ("spine_width", self.spine_width),
            ("spine_height", self.spine_height),
            ("dragon_meters", self.dragon_meters),
            ("segments_per_meter", self.segments_per_meter),
            ("amplitude", self.amplitude),
            ("frequency", self.frequency),
        ] {
            if !value.is_finite() {
                return Err(DragonError::degenerate(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if !(self.segments_per_meter > 0.0) {
            return Err(DragonError::degenerate(format!(
                "segments_per_meter must be positive, got {}",
                self.segments_per_meter
            )));
        }
        let segments = self.segment_count();
        if segments < 2 {
            return Err(DragonError::degenerate(format!(
                "at least 2 segments are required, got {segments}"
            )));
        }
        if self.points < 1 {
            return Err(DragonError::degenerate("ring needs at least one point"));
        }
        // Indices are u32; body plus tail must stay addressable
        let ring_len = self.points.saturating_add(2);
        let vertices = segments
            .checked_add(TAIL_RINGS)
            .and_then(|rings| rings.checked_mul(ring_len))
            .and_then(|count| count.checked_add(1));
        if !vertices.is_some_and(|count| count <= u32::MAX as usize) {
            return Err(DragonError::degenerate(format!(
                "{segments} segments of {ring_len} points exceed the u32 index space"
            )));
        }
        if !(self.radius > 0.0) {
            return Err(DragonError::degenerate(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if let PathKind::Torus { major_radius } = self.path {
            if !(major_radius.is_finite() && major_radius > 0.0) {
                return Err(DragonError::degenerate(format!(
                    "torus major_radius must be positive, got {major_radius}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_segment_count() {
        let params = ShapeParameters::default();
        assert_eq!(params.segment_count(), 10);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_single_segment_rejected() {
        let params = ShapeParameters {
            segments_per_meter: 1.0,
            ..Default::default()
        };
        assert_eq!(params.segment_count(), 1);
        assert!(matches!(
            params.validate(),
            Err(DragonError::DegenerateConfiguration { .. })
        ));
    }

    #[test]
    fn test_zero_points_rejected() {
        let params = ShapeParameters {
            points: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_non_positive_radius_rejected() {
        let params = ShapeParameters {
            radius: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_non_finite_length_rejected() {
        let params = ShapeParameters::from_toml_str("dragon_meters = inf").unwrap();
        assert!(matches!(
            params.validate(),
            Err(DragonError::DegenerateConfiguration { .. })
        ));

        for params in [
            ShapeParameters {
                segments_per_meter: f32::NAN,
                ..Default::default()
            },
            ShapeParameters {
                amplitude: f32::INFINITY,
                ..Default::default()
            },
            ShapeParameters {
                path: PathKind::Torus {
                    major_radius: f32::INFINITY,
                },
                ..Default::default()
            },
        ] {
            assert!(params.validate().is_err());
        }
    }

    #[test]
    fn test_index_space_overflow_rejected() {
        let params = ShapeParameters {
            dragon_meters: 1.0e6,
            segments_per_meter: 1.0e4,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(DragonError::DegenerateConfiguration { .. })
        ));

        let params = ShapeParameters {
            points: usize::MAX,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_parse_partial_toml() {
        let params = ShapeParameters::from_toml_str("dragon_meters = 2.5\npoints = 16\n").unwrap();
        assert_eq!(params.points, 16);
        assert_eq!(params.segment_count(), 25);
        assert_eq!(params.radius, 1.0);
        assert_eq!(params.path, PathKind::Sine);
    }

    #[test]
    fn test_parse_torus_path() {
        let params =
            ShapeParameters::from_toml_str("path = { torus = { major_radius = 2.0 } }").unwrap();
        assert_eq!(params.path, PathKind::Torus { major_radius: 2.0 });
        assert_eq!(params.centerline(), Centerline::Torus { major_radius: 2.0 });
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ShapeParameters::from_toml_str("wings = 4");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_segment_position() {
        let params = ShapeParameters::default();
        assert!((params.segment_position(5) - 0.5).abs() < 1e-6);
    }
}
