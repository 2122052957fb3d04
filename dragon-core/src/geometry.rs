/// Indexed mesh buffers handed to the render target
use nalgebra::{Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face resolved from the index buffer
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices.
    ///
    /// Zero-area triangles (coincident spine points) yield a zero vector.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    pub fn area(&self) -> f32 {
        let v0 = self.vertices[0].position;
        (self.vertices[1].position - v0)
            .cross(&(self.vertices[2].position - v0))
            .norm()
            * 0.5
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// Flat vertex, normal and triangle-index buffers.
///
/// `positions` and `normals` are parallel; every three entries of `indices`
/// form one triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    /// Empty the buffers while keeping their allocations
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }

    pub fn reserve(&mut self, vertices: usize, indices: usize) {
        self.positions.reserve(vertices);
        self.normals.reserve(vertices);
        self.indices.reserve(indices);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Add a vertex and return its index
    pub fn push_vertex(&mut self, position: Point3<f32>, normal: Vector3<f32>) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Concatenate `other`, shifting its indices past the current vertices
    pub fn append(&mut self, other: &MeshBuffers) {
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices
            .extend(other.indices.iter().map(|index| index + offset));
    }

    pub fn vertex(&self, index: u32) -> Vertex {
        let i = index as usize;
        Vertex::new(self.positions[i], self.normals[i])
    }

    pub fn triangle(&self, index: usize) -> Triangle {
        let base = index * 3;
        Triangle::new(
            self.vertex(self.indices[base]),
            self.vertex(self.indices[base + 1]),
            self.vertex(self.indices[base + 2]),
        )
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).map(move |i| self.triangle(i))
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        let (min, max) = self
            .positions
            .iter()
            .fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)));
        Some(Aabb { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshBuffers {
        let mut mesh = MeshBuffers::new();
        let n = Vector3::z();
        mesh.push_vertex(Point3::new(0.0, 0.0, 0.0), n);
        mesh.push_vertex(Point3::new(1.0, 0.0, 0.0), n);
        mesh.push_vertex(Point3::new(1.0, 1.0, 0.0), n);
        mesh.push_vertex(Point3::new(0.0, 1.0, 0.0), n);
        mesh.push_triangle(0, 1, 2);
        mesh.push_triangle(0, 2, 3);
        mesh
    }

    #[test]
    fn test_face_normal() {
        let mesh = quad();
        let normal = mesh.triangle(0).calculate_normal();
        assert!((normal - Vector3::z()).norm() < 1e-6);
        assert!((mesh.triangle(1).area() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_face_normal_is_zero() {
        let v = Vertex::new(Point3::origin(), Vector3::z());
        let triangle = Triangle::new(v, v, v);
        assert_eq!(triangle.calculate_normal(), Vector3::zeros());
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut mesh = quad();
        mesh.append(&quad());
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(&mesh.indices[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut mesh = quad();
        let capacity = mesh.positions.capacity();
        mesh.clear();
        assert!(mesh.is_empty());
        assert_eq!(mesh.positions.capacity(), capacity);
    }

    #[test]
    fn test_bounds() {
        let bounds = quad().bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(bounds.center(), Point3::new(0.5, 0.5, 0.0));
        assert!(MeshBuffers::new().bounds().is_none());
    }
}
