//! Node geometry factory
//!
//! Pure mapping from node records and ring guides to visual descriptors.
//! Nothing here touches a live scene: the scene manager decides when the
//! descriptors are turned into GPU resources and when they are released.

use crate::layout::{compute_layout, LayoutConfig, Placement, RingGuide};
use crate::primitives::{circle, uv_sphere};
use orbitview_core::{format_metric, LineMesh, NodeRecord, NodeSize, Point3f, Rgba, TriangleMesh};

/// Visual parameters shared by every node and ring
#[derive(Debug, Clone, PartialEq)]
pub struct VisualStyle {
    pub small_radius: f32,
    pub medium_radius: f32,
    pub large_radius: f32,
    pub center_radius: f32,
    pub core_radius: f32,
    pub small_color: Rgba,
    pub medium_color: Rgba,
    pub large_color: Rgba,
    pub center_color: Rgba,
    pub core_color: Rgba,
    pub ring_color: Rgba,
    pub sphere_segments: u32,
    pub sphere_rings: u32,
    pub ring_segments: u32,
}

impl Default for VisualStyle {
    fn default() -> Self {
        Self {
            small_radius: 0.6,
            medium_radius: 1.0,
            large_radius: 1.5,
            center_radius: 2.5,
            core_radius: 1.2,
            small_color: Rgba::from_rgb8(0x4f, 0xc3, 0xf7),
            medium_color: Rgba::from_rgb8(0x29, 0x79, 0xff),
            large_color: Rgba::from_rgb8(0x7c, 0x4d, 0xff),
            center_color: Rgba::from_rgb8(0x00, 0xe5, 0xff).with_alpha(0.35),
            core_color: Rgba::from_rgb8(0xff, 0xff, 0xff),
            ring_color: Rgba::from_rgb8(0x45, 0x5a, 0x64).with_alpha(0.6),
            sphere_segments: 24,
            sphere_rings: 16,
            ring_segments: 128,
        }
    }
}

/// Geometry of one renderable mesh
#[derive(Debug, Clone, PartialEq)]
pub enum VisualGeometry {
    Triangles(TriangleMesh),
    Lines(LineMesh),
}

impl VisualGeometry {
    pub fn vertex_count(&self) -> usize {
        match self {
            VisualGeometry::Triangles(mesh) => mesh.vertex_count(),
            VisualGeometry::Lines(mesh) => mesh.vertex_count(),
        }
    }
}

/// A mesh plus its material, in local space
#[derive(Debug, Clone, PartialEq)]
pub struct VisualMesh {
    pub geometry: VisualGeometry,
    pub color: Rgba,
    /// Skip lighting (glowing core, guide lines)
    pub unlit: bool,
}

/// Animation group a node visual belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinGroup {
    /// Turns slowly with the whole node set
    Orbit,
    /// Additionally spins in place, faster
    Center,
}

/// Text shown next to a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelBlock {
    pub title: String,
    pub lines: Vec<String>,
}

impl LabelBlock {
    pub fn text(&self) -> String {
        std::iter::once(self.title.as_str())
            .chain(self.lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Everything needed to render one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    pub node_id: String,
    pub radius: f32,
    pub body: VisualMesh,
    /// Inner core, only on the first center node
    pub core: Option<VisualMesh>,
    pub label: LabelBlock,
    pub spin: SpinGroup,
}

/// A node visual with its world position
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedVisual {
    pub position: Point3f,
    pub visual: NodeVisual,
}

/// A ring guide with its line mesh
#[derive(Debug, Clone, PartialEq)]
pub struct RingVisual {
    pub guide: RingGuide,
    pub mesh: VisualMesh,
}

/// Full set of descriptors for one data refresh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDescription {
    pub nodes: Vec<PlacedVisual>,
    pub rings: Vec<RingVisual>,
}

impl SceneDescription {
    /// Number of meshes the description turns into (bodies, cores, rings)
    pub fn mesh_count(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| 1 + usize::from(n.visual.core.is_some()))
            .sum::<usize>()
            + self.rings.len()
    }
}

/// Body radius for a node
pub fn node_radius(node: &NodeRecord, placement: &Placement, style: &VisualStyle) -> f32 {
    if placement.is_center() {
        return style.center_radius;
    }
    match node.size {
        NodeSize::Small => style.small_radius,
        NodeSize::Medium => style.medium_radius,
        NodeSize::Large => style.large_radius,
    }
}

fn node_color(node: &NodeRecord, placement: &Placement, style: &VisualStyle) -> Rgba {
    if placement.is_center() {
        return style.center_color;
    }
    match node.size {
        NodeSize::Small => style.small_color,
        NodeSize::Medium => style.medium_color,
        NodeSize::Large => style.large_color,
    }
}

/// Label block listing only the metrics present on the record
pub fn label_block(node: &NodeRecord) -> LabelBlock {
    LabelBlock {
        title: node.label.clone(),
        lines: node
            .metrics()
            .into_iter()
            .map(|(name, value)| format!("{name}: {}", format_metric(value)))
            .collect(),
    }
}

/// Build the visual for one node given where the layout put it
pub fn build_node_visual(node: &NodeRecord, placement: &Placement, style: &VisualStyle) -> NodeVisual {
    let radius = node_radius(node, placement, style);
    let body = VisualMesh {
        geometry: VisualGeometry::Triangles(uv_sphere(
            radius,
            style.sphere_segments,
            style.sphere_rings,
        )),
        color: node_color(node, placement, style),
        unlit: false,
    };
    let core = matches!(placement, Placement::Center { ordinal: 0 }).then(|| VisualMesh {
        geometry: VisualGeometry::Triangles(uv_sphere(
            style.core_radius,
            style.sphere_segments,
            style.sphere_rings,
        )),
        color: style.core_color,
        unlit: true,
    });

    NodeVisual {
        node_id: node.id.clone(),
        radius,
        body,
        core,
        label: label_block(node),
        spin: if placement.is_center() {
            SpinGroup::Center
        } else {
            SpinGroup::Orbit
        },
    }
}

/// Line-loop mesh for a ring guide
pub fn build_ring_visual(guide: &RingGuide, style: &VisualStyle) -> RingVisual {
    RingVisual {
        guide: *guide,
        mesh: VisualMesh {
            geometry: VisualGeometry::Lines(circle(guide.radius, style.ring_segments)),
            color: style.ring_color,
            unlit: true,
        },
    }
}

/// Run layout and the factory over a whole node list
pub fn describe_scene(nodes: &[NodeRecord], config: &LayoutConfig, style: &VisualStyle) -> SceneDescription {
    let layout = compute_layout(nodes, config);
    SceneDescription {
        nodes: layout
            .nodes
            .iter()
            .map(|placed| PlacedVisual {
                position: placed.position,
                visual: build_node_visual(&nodes[placed.index], &placed.placement, style),
            })
            .collect(),
        rings: layout
            .rings
            .iter()
            .map(|guide| build_ring_visual(guide, style))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYER: Placement = Placement::Layer { layer: 1, slot: 0, of: 1 };

    #[test]
    fn test_size_maps_to_increasing_radius() {
        let style = VisualStyle::default();
        let radius = |size| node_radius(&NodeRecord::new("n", "N", 1).with_size(size), &LAYER, &style);
        assert!(radius(NodeSize::Small) < radius(NodeSize::Medium));
        assert!(radius(NodeSize::Medium) < radius(NodeSize::Large));
        assert!(radius(NodeSize::Large) < style.center_radius);
    }

    #[test]
    fn test_label_lists_only_present_metrics() {
        let mut node = NodeRecord::new("db", "Database", 2);
        node.cifrb = Some(1_500.0);
        node.transactions = Some(2_000_000.0);
        let label = label_block(&node);
        assert_eq!(label.title, "Database");
        assert_eq!(label.lines, vec!["CIFRB: 1.5K", "TPS: 2.0M"]);
        assert_eq!(label.text(), "Database\nCIFRB: 1.5K\nTPS: 2.0M");
    }

    #[test]
    fn test_label_distinguishes_zero_from_absent() {
        let mut node = NodeRecord::new("q", "Queue", 1);
        node.ccu = Some(0.0);
        assert_eq!(label_block(&node).lines, vec!["CCU: 0"]);
    }

    #[test]
    fn test_nan_metric_is_rendered_not_dropped() {
        let mut node = NodeRecord::new("q", "Queue", 1);
        node.transactions_in_10_min = Some(f64::NAN);
        assert_eq!(label_block(&node).lines, vec!["TPS 10m: NaN"]);
    }

    #[test]
    fn test_only_first_center_gets_core() {
        let style = VisualStyle::default();
        let hub = NodeRecord::center("hub", "Hub");
        let first = build_node_visual(&hub, &Placement::Center { ordinal: 0 }, &style);
        let second = build_node_visual(&hub, &Placement::Center { ordinal: 1 }, &style);
        assert!(first.core.is_some());
        assert!(second.core.is_none());
        assert_eq!(first.spin, SpinGroup::Center);
        assert_eq!(first.radius, style.center_radius);
        assert!(first.body.color.is_translucent());
        assert!(first.core.unwrap().unlit);
    }

    #[test]
    fn test_layer_node_has_no_core() {
        let style = VisualStyle::default();
        let visual = build_node_visual(&NodeRecord::new("a", "A", 1), &LAYER, &style);
        assert!(visual.core.is_none());
        assert_eq!(visual.spin, SpinGroup::Orbit);
        assert_eq!(visual.body.color, style.medium_color);
    }

    #[test]
    fn test_ring_visual_is_line_loop() {
        let style = VisualStyle::default();
        let ring = build_ring_visual(&RingGuide { layer: 2, radius: 16.0 }, &style);
        match &ring.mesh.geometry {
            VisualGeometry::Lines(lines) => assert_eq!(lines.segment_count(), style.ring_segments as usize),
            VisualGeometry::Triangles(_) => panic!("ring guide should be lines"),
        }
    }

    #[test]
    fn test_describe_scene_counts_meshes() {
        let nodes = vec![
            NodeRecord::center("c0", "C0"),
            NodeRecord::center("c1", "C1"),
            NodeRecord::new("a", "A", 1),
            NodeRecord::new("b", "B", 4),
        ];
        let scene = describe_scene(&nodes, &LayoutConfig::default(), &VisualStyle::default());
        assert_eq!(scene.nodes.len(), 4);
        assert_eq!(scene.rings.len(), 4);
        // 4 bodies, 1 core, 4 rings
        assert_eq!(scene.mesh_count(), 9);
    }
}
