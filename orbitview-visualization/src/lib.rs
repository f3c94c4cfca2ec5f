//! Interactive topology view
//!
//! Glues the pieces into something a host can drive:
//! - [`scene`]: lifecycle of one mounted scene behind a [`SceneBackend`]
//! - [`backend`]: the wgpu/egui backend drawing into a winit window
//! - [`overlay`]: clock, aggregate summaries and label placement
//! - [`panel`]: data/options/resize entry points and the no-data view
//! - [`viewer`]: a winit event loop hosting one panel

pub mod backend;
pub mod camera;
pub mod overlay;
pub mod panel;
pub mod scene;
pub mod viewer;

pub use backend::{EguiOverlay, GpuSceneBackend};
pub use camera::{Camera, OrbitControls};
pub use overlay::{project_labels, CounterSummary, LiveClock, OverlayModel, ScreenLabel, TransactionSummary};
pub use panel::{option_registry, PanelView, TopologyPanel};
pub use scene::{
    AnimationState, Frame, LifecycleState, MeshInstance, PlacedLabel, SceneBackend, SceneManager,
};
pub use viewer::{run, FrameSource, StaticFrames, ViewerConfig};
