/// Dragon Core Library - procedural dragon body meshes
///
/// Sweeps a spined ring profile along a parametric centerline, tapers it
/// towards the tail and closes the end with a hemispherical cap. Generation is
/// a pure function of shape parameters and animation phase; rendering is left
/// to the host.

pub mod centerline;
pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod ring;
pub mod stl;
pub mod sweep;
pub mod tail;

// Re-export commonly used types
pub use centerline::{Centerline, Frame, PathKind};
pub use config::ShapeParameters;
pub use error::{ConfigError, DragonError, DragonResult, StlError};
pub use generator::{
    generate, generate_into, AnimationState, DragonGenerator, DragonMesh, GenerationStats,
    MeshLayout,
};
pub use geometry::{Aabb, MeshBuffers, Triangle, Vertex};
pub use ring::{build_ring_angles, RingAngles};
