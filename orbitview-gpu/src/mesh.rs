//! CPU-side mesh data in the layout the scene shader expects

use bytemuck::{Pod, Zeroable};
use nalgebra::Matrix4;
use orbitview_core::Rgba;
use orbitview_layout::{VisualGeometry, VisualMesh};

/// Vertex data for scene rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Camera uniform data
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(view_proj: Matrix4<f32>) -> Self {
        Self {
            view_proj: view_proj.into(),
        }
    }
}

/// Per-object uniform data: model matrix and material
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: 1.0 when unlit
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: Matrix4<f32>, color: Rgba, unlit: bool) -> Self {
        Self {
            model: model.into(),
            color: color.to_array(),
            params: [if unlit { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }
}

/// Primitive topology of a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Triangles,
    Lines,
}

/// Mesh data structure for GPU upload
#[derive(Debug, Clone, PartialEq)]
pub struct GpuMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    pub topology: Topology,
    pub color: Rgba,
    pub unlit: bool,
}

impl GpuMesh {
    /// Convert a visual descriptor into vertex/index data
    pub fn from_visual(visual: &VisualMesh) -> Self {
        let (vertices, indices, topology) = match &visual.geometry {
            VisualGeometry::Triangles(mesh) => {
                let vertices = mesh
                    .vertices
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        let normal = mesh
                            .normals
                            .as_ref()
                            .and_then(|n| n.get(i))
                            .map(|n| [n.x, n.y, n.z])
                            .unwrap_or([0.0, 1.0, 0.0]);
                        MeshVertex::new([v.x, v.y, v.z], normal)
                    })
                    .collect();
                (vertices, mesh.indices(), Topology::Triangles)
            }
            VisualGeometry::Lines(lines) => {
                let vertices = lines
                    .vertices
                    .iter()
                    .map(|v| MeshVertex::new([v.x, v.y, v.z], [0.0, 1.0, 0.0]))
                    .collect();
                (vertices, lines.indices(), Topology::Lines)
            }
        };

        Self {
            vertices,
            indices,
            topology,
            color: visual.color,
            unlit: visual.unlit,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}
