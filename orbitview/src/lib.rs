//! # orbitview
//!
//! A 3D topology view: a center node surrounded by concentric rings of
//! satellite nodes, driven by tabular data frames.
//!
//! This umbrella crate re-exports the workspace crates behind features so a
//! host can depend on one crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use orbitview::prelude::*;
//!
//! let frames = vec![DataFrame::named("nodes")
//!     .with_field("id", vec!["hub", "a"])
//!     .with_field("label", vec!["Hub", "A"])
//!     .with_field("layerOrder", vec![0, 1])];
//! let nodes = parse_nodes(&frames);
//! assert_eq!(nodes.len(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: core and layout
//! - `layout`: ring layout and the node geometry factory
//! - `gpu`: wgpu scene renderer
//! - `visualization`: scene lifecycle, overlay, panel and window host
//! - `all`: everything

pub use orbitview_core::*;

#[cfg(feature = "layout")]
pub use orbitview_layout as layout;

#[cfg(feature = "gpu")]
pub use orbitview_gpu as gpu;

#[cfg(feature = "visualization")]
pub use orbitview_visualization as visualization;

/// Convenient imports for common use cases
pub mod prelude {
    pub use orbitview_core::*;

    #[cfg(feature = "layout")]
    pub use orbitview_layout::*;

    #[cfg(feature = "visualization")]
    pub use orbitview_visualization::{option_registry, PanelView, SceneBackend, SceneManager, TopologyPanel};
}
