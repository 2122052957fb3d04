//! Dragon mesh generation
//!
//! [`generate`] is a pure function of shape parameters, ring angles and phase.
//! [`DragonGenerator`] wraps it with the animation phase and pooled buffers for
//! hosts that regenerate once per tick.

use crate::config::ShapeParameters;
use crate::error::DragonResult;
use crate::geometry::MeshBuffers;
use crate::ring::{build_ring_angles, RingAngles};
use crate::sweep::sweep_body;
use crate::tail::generate_tail;

/// Where the body and tail sections sit inside the combined buffers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshLayout {
    pub ring_points: usize,
    pub segments: usize,
    pub body_vertices: usize,
    pub body_indices: usize,
    pub tail_vertices: usize,
    pub tail_indices: usize,
}

/// Summary of one generation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub vertices: usize,
    pub triangles: usize,
    pub degenerate_frames: usize,
}

/// Generated body plus tail cap
#[derive(Debug, Clone, Default)]
pub struct DragonMesh {
    pub buffers: MeshBuffers,
    pub layout: MeshLayout,
    tail_scratch: MeshBuffers,
}

impl DragonMesh {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Generate a fresh mesh
pub fn generate(
    params: &ShapeParameters,
    ring: &RingAngles,
    phase: f32,
) -> DragonResult<DragonMesh> {
    let mut mesh = DragonMesh::new();
    generate_into(params, ring, phase, &mut mesh)?;
    Ok(mesh)
}

/// Regenerate into `target`, reusing its allocations.
///
/// Parameters are validated before anything is written, so on error `target`
/// still holds its previous contents.
pub fn generate_into(
    params: &ShapeParameters,
    ring: &RingAngles,
    phase: f32,
    target: &mut DragonMesh,
) -> DragonResult<GenerationStats> {
    params.validate()?;

    target.buffers.clear();
    target.tail_scratch.clear();

    let end = sweep_body(params, ring, phase, &mut target.buffers);
    let body_vertices = target.buffers.vertex_count();
    let body_indices = target.buffers.indices.len();

    generate_tail(&end.frame, ring, end.radius, &mut target.tail_scratch);
    target.buffers.append(&target.tail_scratch);

    target.layout = MeshLayout {
        ring_points: ring.len(),
        segments: params.segment_count(),
        body_vertices,
        body_indices,
        tail_vertices: target.tail_scratch.vertex_count(),
        tail_indices: target.tail_scratch.indices.len(),
    };

    Ok(GenerationStats {
        vertices: target.buffers.vertex_count(),
        triangles: target.buffers.triangle_count(),
        degenerate_frames: end.degenerate_frames,
    })
}

/// Phase accumulator driving the swimming motion
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationState {
    pub phase: f32,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by elapsed host time (seconds)
    pub fn advance(&mut self, dt: f32) {
        self.phase += dt;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Stateful generator: parameters, animation phase and the last good mesh.
///
/// Not meant to be shared between threads; the host owns it and calls
/// [`DragonGenerator::tick`] once per frame.
#[derive(Debug, Clone)]
pub struct DragonGenerator {
    params: ShapeParameters,
    animation: AnimationState,
    mesh: DragonMesh,
}

impl DragonGenerator {
    pub fn new(params: ShapeParameters) -> Self {
        Self {
            params,
            animation: AnimationState::new(),
            mesh: DragonMesh::new(),
        }
    }

    pub fn params(&self) -> &ShapeParameters {
        &self.params
    }

    /// Replace the parameters; they apply on the next regeneration
    pub fn set_parameters(&mut self, params: ShapeParameters) {
        self.params = params;
    }

    pub fn params_mut(&mut self) -> &mut ShapeParameters {
        &mut self.params
    }

    pub fn phase(&self) -> f32 {
        self.animation.phase
    }

    /// Last successfully generated mesh
    pub fn mesh(&self) -> &DragonMesh {
        &self.mesh
    }

    /// Reset the phase to zero and regenerate
    pub fn reinitialize(&mut self) -> DragonResult<GenerationStats> {
        self.animation.reset();
        self.regenerate()
    }

    /// Rebuild the mesh at the current phase.
    ///
    /// On failure the previous mesh is kept.
    pub fn regenerate(&mut self) -> DragonResult<GenerationStats> {
        let ring = build_ring_angles(self.params.points, self.params.spine_width);
        let stats = generate_into(&self.params, &ring, self.animation.phase, &mut self.mesh)
            .inspect_err(|e| tracing::error!("Regeneration failed: {e}"))?;

        tracing::debug!(
            phase = self.animation.phase,
            vertices = stats.vertices,
            triangles = stats.triangles,
            degenerate_frames = stats.degenerate_frames,
            "Regenerated dragon mesh"
        );
        Ok(stats)
    }

    /// Advance the phase by `dt` seconds, then regenerate
    pub fn tick(&mut self, dt: f32) -> DragonResult<GenerationStats> {
        self.animation.advance(dt);
        self.regenerate()
    }
}
