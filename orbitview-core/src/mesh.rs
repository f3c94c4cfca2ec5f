//! Mesh data structures for node bodies and ring guides

use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[u32; 3]>,
    pub normals: Option<Vec<Vector3f>>,
}

/// A set of line segments over shared vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineMesh {
    pub vertices: Vec<Point3f>,
    pub segments: Vec<[u32; 2]>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Set vertex normals; ignored when the count does not match the vertices
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Flattened index list, three per face
    pub fn indices(&self) -> Vec<u32> {
        self.faces.iter().flat_map(|f| f.iter().copied()).collect()
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl LineMesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            segments: Vec::new(),
        }
    }

    /// Closed loop through `vertices` in order
    pub fn closed_loop(vertices: Vec<Point3f>) -> Self {
        let n = vertices.len() as u32;
        let segments = (0..n).map(|i| [i, (i + 1) % n]).collect();
        Self { vertices, segments }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Flattened index list, two per segment
    pub fn indices(&self) -> Vec<u32> {
        self.segments.iter().flat_map(|s| s.iter().copied()).collect()
    }
}

impl Default for LineMesh {
    fn default() -> Self {
        Self::new()
    }
}
