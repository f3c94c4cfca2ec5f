//! # orbitview GPU
//!
//! wgpu rendering for topology scenes. Meshes produced by the layout factory
//! are converted to vertex/index data ([`GpuMesh`]), uploaded into per-object
//! buffers ([`MeshBuffers`]) and drawn by a [`SceneRenderer`] bound to a
//! window surface.

pub mod device;
pub mod mesh;
pub mod renderer;

pub use device::GpuContext;
pub use mesh::{CameraUniform, GpuMesh, MeshVertex, ObjectUniform, Topology};
pub use renderer::{DrawCommand, MeshBuffers, OverlayPass, RenderConfig, SceneRenderer};
