//! # orbitview layout
//!
//! Deterministic placement of topology nodes on concentric rings, and the
//! pure factory turning placed nodes into renderable descriptors.
//!
//! Nothing in this crate needs a rendering context, so every layout and
//! geometry rule can be tested on plain data.

pub mod layout;
pub mod primitives;
pub mod factory;

pub use layout::*;
pub use primitives::*;
pub use factory::*;
