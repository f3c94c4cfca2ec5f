//! Panel configuration options

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Allowed values for the number of layers option
pub const LAYER_COUNT_RANGE: RangeInclusive<u32> = 1..=10;

/// Default number of ring guides
pub const DEFAULT_LAYER_COUNT: u32 = 3;

/// Highest `layerOrder` a node may carry; every layer up to the highest
/// populated one gets a ring guide, so this also caps the ring count
pub const MAX_LAYER_ORDER: u32 = 64;

/// Kind of value a registered option holds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptionKind {
    Integer { min: i64, max: i64, step: i64 },
}

/// Description of one host-configurable option
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub default: i64,
}

/// Options consumed by the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelOptions {
    /// Minimum number of ring guides to draw
    pub number_of_layers: u32,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            number_of_layers: DEFAULT_LAYER_COUNT,
        }
    }
}

impl PanelOptions {
    pub fn with_layers(number_of_layers: u32) -> Result<Self> {
        let options = Self { number_of_layers };
        options.validate()?;
        Ok(options)
    }

    /// Check every option against its registered range
    pub fn validate(&self) -> Result<()> {
        if !LAYER_COUNT_RANGE.contains(&self.number_of_layers) {
            return Err(Error::InvalidOption {
                name: "numberOfLayers".to_string(),
                reason: format!(
                    "{} is outside {}..={}",
                    self.number_of_layers,
                    LAYER_COUNT_RANGE.start(),
                    LAYER_COUNT_RANGE.end()
                ),
            });
        }
        Ok(())
    }

    /// Parse and validate options from JSON; missing keys take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: PanelOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Options the panel registers with its host
    pub fn registry() -> Vec<OptionDescriptor> {
        vec![OptionDescriptor {
            key: "numberOfLayers",
            name: "Number of layers",
            description: "Minimum number of rings drawn around the center",
            kind: OptionKind::Integer {
                min: i64::from(*LAYER_COUNT_RANGE.start()),
                max: i64::from(*LAYER_COUNT_RANGE.end()),
                step: 1,
            },
            default: i64::from(DEFAULT_LAYER_COUNT),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(PanelOptions::default().number_of_layers, 3);
        assert_eq!(PanelOptions::from_json_str("{}").unwrap(), PanelOptions::default());
    }

    #[test]
    fn test_range_is_enforced() {
        assert!(PanelOptions::with_layers(1).is_ok());
        assert!(PanelOptions::with_layers(10).is_ok());
        assert!(matches!(
            PanelOptions::with_layers(0),
            Err(Error::InvalidOption { .. })
        ));
        assert!(PanelOptions::from_json_str(r#"{"numberOfLayers": 11}"#).is_err());
    }

    #[test]
    fn test_json_keys_are_camel_case() {
        let options = PanelOptions::from_json_str(r#"{"numberOfLayers": 7}"#).unwrap();
        assert_eq!(options.number_of_layers, 7);
    }

    #[test]
    fn test_registry_matches_validation() {
        let registry = PanelOptions::registry();
        assert_eq!(registry.len(), 1);
        let layers = &registry[0];
        assert_eq!(layers.key, "numberOfLayers");
        assert_eq!(layers.default, 3);
        assert_eq!(layers.kind, OptionKind::Integer { min: 1, max: 10, step: 1 });
    }
}
