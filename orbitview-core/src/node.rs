//! Normalized node records

use serde::{Deserialize, Serialize};

/// Size category of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl NodeSize {
    /// Normalize a free-form size string; unrecognized input is `Medium`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "small" | "sm" => NodeSize::Small,
            "large" | "lg" => NodeSize::Large,
            _ => NodeSize::Medium,
        }
    }
}

/// One topology entity, produced fresh on every data refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    pub label: String,
    pub layer_order: u32,
    pub size: NodeSize,
    pub is_center: bool,
    pub cifrb: Option<f64>,
    pub ccu: Option<f64>,
    pub transactions: Option<f64>,
    pub transactions_in_10_min: Option<f64>,
}

impl NodeRecord {
    /// Record with no metrics, medium size, not a center
    pub fn new(id: impl Into<String>, label: impl Into<String>, layer_order: u32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            layer_order,
            size: NodeSize::Medium,
            is_center: false,
            cifrb: None,
            ccu: None,
            transactions: None,
            transactions_in_10_min: None,
        }
    }

    pub fn center(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            is_center: true,
            ..Self::new(id, label, 0)
        }
    }

    pub fn with_size(mut self, size: NodeSize) -> Self {
        self.size = size;
        self
    }

    /// Present metrics in display order, paired with their short names
    pub fn metrics(&self) -> Vec<(&'static str, f64)> {
        [
            ("CIFRB", self.cifrb),
            ("CCU", self.ccu),
            ("TPS", self.transactions),
            ("TPS 10m", self.transactions_in_10_min),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_normalization() {
        assert_eq!(NodeSize::from_label("SM"), NodeSize::Small);
        assert_eq!(NodeSize::from_label("small"), NodeSize::Small);
        assert_eq!(NodeSize::from_label("Small"), NodeSize::Small);
        assert_eq!(NodeSize::from_label(" lg "), NodeSize::Large);
        assert_eq!(NodeSize::from_label("LARGE"), NodeSize::Large);
        assert_eq!(NodeSize::from_label("huge"), NodeSize::Medium);
        assert_eq!(NodeSize::from_label(""), NodeSize::Medium);
    }

    #[test]
    fn test_metrics_only_lists_present_values() {
        let mut node = NodeRecord::new("a", "A", 1);
        assert!(node.metrics().is_empty());

        node.ccu = Some(0.0);
        node.transactions_in_10_min = Some(12.0);
        assert_eq!(node.metrics(), vec![("CCU", 0.0), ("TPS 10m", 12.0)]);
    }
}
