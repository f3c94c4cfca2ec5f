//! Scene layout engine
//!
//! Assigns every node a world position:
//! - Center nodes sit at the origin, several of them spread along X
//! - Layer nodes are grouped by `layer_order` and spaced evenly around the
//!   ring for that layer in the XZ plane, in input order
//! - Ring guides cover every layer from 1 up to the configured count or the
//!   highest populated layer, whichever is larger, capped at
//!   [`MAX_LAYER_ORDER`]

use orbitview_core::{NodeRecord, Point3f, DEFAULT_LAYER_COUNT, MAX_LAYER_ORDER};
use std::collections::BTreeMap;
use std::f32::consts::TAU;

/// Layout parameters
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Radius of ring 1
    pub base_radius: f32,
    /// Radial distance between consecutive rings
    pub ring_spacing: f32,
    /// Distance between neighbouring center nodes
    pub center_spacing: f32,
    /// Minimum number of ring guides
    pub layer_count: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_radius: 10.0,
            ring_spacing: 6.0,
            center_spacing: 4.0,
            layer_count: DEFAULT_LAYER_COUNT,
        }
    }
}

impl LayoutConfig {
    pub fn with_layer_count(mut self, layer_count: u32) -> Self {
        self.layer_count = layer_count;
        self
    }

    /// Radius of the ring for `layer`, never negative
    pub fn ring_radius(&self, layer: u32) -> f32 {
        (self.base_radius + (layer as f32 - 1.0) * self.ring_spacing).max(0.0)
    }
}

/// Where a node ended up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// `ordinal`-th center node in input order
    Center { ordinal: usize },
    /// `slot`-th of `of` nodes on the ring of `layer`
    Layer { layer: u32, slot: usize, of: usize },
}

impl Placement {
    pub fn is_center(&self) -> bool {
        matches!(self, Placement::Center { .. })
    }
}

/// A node index paired with its world position
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    /// Index into the node slice given to [`compute_layout`]
    pub index: usize,
    pub position: Point3f,
    pub placement: Placement,
}

/// Guide circle for one layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGuide {
    pub layer: u32,
    pub radius: f32,
}

/// Non-center nodes sharing a `layer_order`, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerGroup {
    pub layer_order: u32,
    pub members: Vec<usize>,
}

/// Result of a layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneLayout {
    /// Centers first, then layers in ascending order
    pub nodes: Vec<PlacedNode>,
    pub rings: Vec<RingGuide>,
}

impl SceneLayout {
    pub fn center_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.placement.is_center()).count()
    }

    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }
}

/// Group the non-center nodes by layer, one group per distinct `layer_order`
pub fn group_layers(nodes: &[NodeRecord]) -> BTreeMap<u32, LayerGroup> {
    let mut groups: BTreeMap<u32, LayerGroup> = BTreeMap::new();
    for (index, node) in nodes.iter().enumerate().filter(|(_, n)| !n.is_center) {
        groups
            .entry(node.layer_order)
            .or_insert_with(|| LayerGroup {
                layer_order: node.layer_order,
                members: Vec::new(),
            })
            .members
            .push(index);
    }
    groups
}

/// Positions of `count` center nodes along X, centered on the origin
pub fn center_positions(count: usize, spacing: f32) -> Vec<Point3f> {
    let offset = (count.saturating_sub(1)) as f32 / 2.0;
    (0..count)
        .map(|i| Point3f::new((i as f32 - offset) * spacing, 0.0, 0.0))
        .collect()
}

/// Evenly spaced positions on a circle of `radius` in the XZ plane
pub fn ring_positions(count: usize, radius: f32) -> Vec<Point3f> {
    (0..count)
        .map(|i| {
            let angle = i as f32 * TAU / count as f32;
            Point3f::new(radius * angle.cos(), 0.0, radius * angle.sin())
        })
        .collect()
}

/// Lay out `nodes` according to `config`
pub fn compute_layout(nodes: &[NodeRecord], config: &LayoutConfig) -> SceneLayout {
    let center_indices: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_center)
        .map(|(i, _)| i)
        .collect();

    let mut placed = Vec::with_capacity(nodes.len());
    let centers = center_positions(center_indices.len(), config.center_spacing);
    for (ordinal, (&index, position)) in center_indices.iter().zip(centers).enumerate() {
        placed.push(PlacedNode {
            index,
            position,
            placement: Placement::Center { ordinal },
        });
    }

    let groups = group_layers(nodes);
    for group in groups.values() {
        let radius = config.ring_radius(group.layer_order);
        let of = group.members.len();
        let positions = ring_positions(of, radius);
        for (slot, (&index, position)) in group.members.iter().zip(positions).enumerate() {
            placed.push(PlacedNode {
                index,
                position,
                placement: Placement::Layer {
                    layer: group.layer_order,
                    slot,
                    of,
                },
            });
        }
    }

    let highest = groups.keys().next_back().copied().unwrap_or(0);
    let ring_total = config.layer_count.max(highest).min(MAX_LAYER_ORDER);
    let rings = (1..=ring_total)
        .map(|layer| RingGuide {
            layer,
            radius: config.ring_radius(layer),
        })
        .collect();

    log::debug!(
        "layout: {} centers, {} layer groups, {} rings",
        center_indices.len(),
        groups.len(),
        ring_total
    );

    SceneLayout { nodes: placed, rings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ring_node(id: &str, layer: u32) -> NodeRecord {
        NodeRecord::new(id, id.to_uppercase(), layer)
    }

    #[test]
    fn test_empty_data_still_draws_configured_rings() {
        let layout = compute_layout(&[], &LayoutConfig::default().with_layer_count(3));
        assert!(layout.nodes.is_empty());
        assert_eq!(layout.ring_count(), 3);
        assert!(layout.rings.windows(2).all(|w| w[0].radius < w[1].radius));
        assert_eq!(layout.rings[0].layer, 1);
    }

    #[test]
    fn test_rings_grow_to_cover_sparse_high_layers() {
        let nodes = vec![ring_node("far", 5)];
        let layout = compute_layout(&nodes, &LayoutConfig::default().with_layer_count(3));
        assert_eq!(layout.ring_count(), 5);
        let ring5 = layout.rings[4];
        assert_eq!(ring5.layer, 5);
        assert_relative_eq!(layout.nodes[0].position.coords.norm(), ring5.radius, epsilon = 1e-4);
    }

    #[test]
    fn test_ring_count_is_capped() {
        let nodes = vec![ring_node("x", 5_000_000)];
        let layout = compute_layout(&nodes, &LayoutConfig::default());
        assert_eq!(layout.ring_count(), MAX_LAYER_ORDER as usize);
        assert_eq!(layout.nodes.len(), 1);
    }

    #[test]
    fn test_ring_radius_formula() {
        let config = LayoutConfig::default();
        assert_relative_eq!(config.ring_radius(1), 10.0);
        assert_relative_eq!(config.ring_radius(3), 22.0);
        assert_relative_eq!(config.ring_radius(0), 4.0);
    }

    #[test]
    fn test_single_center_at_origin() {
        let nodes = vec![NodeRecord::center("hub", "Hub"), ring_node("a", 1)];
        let layout = compute_layout(&nodes, &LayoutConfig::default());
        assert_eq!(layout.center_count(), 1);
        assert_eq!(layout.nodes[0].index, 0);
        assert_eq!(layout.nodes[0].position, Point3f::origin());
    }

    #[test]
    fn test_multiple_centers_spread_symmetrically_in_order() {
        let nodes = vec![
            NodeRecord::center("c0", "C0"),
            ring_node("a", 1),
            NodeRecord::center("c1", "C1"),
            NodeRecord::center("c2", "C2"),
        ];
        let layout = compute_layout(&nodes, &LayoutConfig::default());
        let centers: Vec<_> = layout.nodes.iter().filter(|n| n.placement.is_center()).collect();
        assert_eq!(centers.iter().map(|c| c.index).collect::<Vec<_>>(), vec![0, 2, 3]);
        assert_relative_eq!(centers[0].position.x, -4.0);
        assert_relative_eq!(centers[1].position.x, 0.0);
        assert_relative_eq!(centers[2].position.x, 4.0);
        assert_eq!(centers[2].placement, Placement::Center { ordinal: 2 });
    }

    #[test]
    fn test_layer_nodes_evenly_spaced_in_input_order() {
        let nodes = vec![
            ring_node("a", 2),
            ring_node("b", 1),
            ring_node("c", 2),
            ring_node("d", 2),
            ring_node("e", 2),
        ];
        let config = LayoutConfig::default();
        let layout = compute_layout(&nodes, &config);

        let layer2: Vec<_> = layout
            .nodes
            .iter()
            .filter(|n| matches!(n.placement, Placement::Layer { layer: 2, .. }))
            .collect();
        assert_eq!(layer2.iter().map(|n| n.index).collect::<Vec<_>>(), vec![0, 2, 3, 4]);

        let radius = config.ring_radius(2);
        // quarter turns: +X, +Z, -X, -Z
        assert_relative_eq!(layer2[0].position.x, radius, epsilon = 1e-4);
        assert_relative_eq!(layer2[1].position.z, radius, epsilon = 1e-4);
        assert_relative_eq!(layer2[2].position.x, -radius, epsilon = 1e-4);
        assert_relative_eq!(layer2[3].position.z, -radius, epsilon = 1e-4);
        assert!(layer2.iter().all(|n| n.position.y == 0.0));
    }

    #[test]
    fn test_layers_with_equal_radius_are_not_merged() {
        let nodes = vec![ring_node("a", 1), ring_node("b", 2), ring_node("c", 2)];
        let config = LayoutConfig {
            ring_spacing: 0.0,
            ..LayoutConfig::default()
        };
        let groups = group_layers(&nodes);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&1].members, vec![0]);
        assert_eq!(groups[&2].members, vec![1, 2]);

        let layout = compute_layout(&nodes, &config);
        // the lone layer-1 node keeps slot 0 of 1 even though ring 2 coincides
        assert_eq!(
            layout.nodes[0].placement,
            Placement::Layer { layer: 1, slot: 0, of: 1 }
        );
    }

    #[test]
    fn test_centers_are_excluded_from_layer_groups() {
        let mut hub = NodeRecord::center("hub", "Hub");
        hub.layer_order = 9;
        let nodes = vec![hub, ring_node("a", 1)];
        assert_eq!(group_layers(&nodes).keys().copied().collect::<Vec<_>>(), vec![1]);

        let layout = compute_layout(&nodes, &LayoutConfig::default());
        assert_eq!(layout.ring_count(), 3);
        assert_eq!(layout.nodes[0].position, Point3f::origin());
    }
}
