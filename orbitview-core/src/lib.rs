//! Core data structures for orbitview
//!
//! This crate provides the host-facing data model of the topology panel:
//! frames, node records, aggregate counters, panel options, number
//! formatting, and the mesh/transform types the layout and rendering
//! crates exchange.

pub mod point;
pub mod mesh;
pub mod transform;
pub mod error;
pub mod frame;
pub mod node;
pub mod parser;
pub mod aggregate;
pub mod format;
pub mod options;

pub use point::*;
pub use mesh::*;
pub use transform::*;
pub use error::*;
pub use frame::{load_frames, DataFrame, Field, FieldValue};
pub use node::{NodeRecord, NodeSize};
pub use parser::{is_node_frame, parse_nodes};
pub use aggregate::{parse_aggregate, AggregateSnapshot, MetricFamily};
pub use format::format_metric;
pub use options::{OptionDescriptor, OptionKind, PanelOptions, DEFAULT_LAYER_COUNT, LAYER_COUNT_RANGE, MAX_LAYER_ORDER};

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3};
