//! Data row parser
//!
//! Converts host frames into a flat, ordered list of [`NodeRecord`]s:
//! - A frame is a node frame only if it carries the `id`, `label` and
//!   `layerOrder` columns; every other frame is skipped
//! - Column names match case-insensitively, first match wins
//! - Blank required cells fall back to `node-<row>`, `Node <row>` and layer `1`
//! - Absent optional metrics stay `None`; unparsable ones become `NaN`

use crate::frame::{DataFrame, Field};
use crate::node::{NodeRecord, NodeSize};
use crate::options::MAX_LAYER_ORDER;

/// Column names recognized by the parser
pub mod columns {
    pub const ID: &str = "id";
    pub const LABEL: &str = "label";
    pub const LAYER_ORDER: &str = "layerOrder";
    pub const SIZE: &str = "size";
    pub const IS_CENTER: &str = "isCenter";
    pub const CIFRB: &str = "cifrb";
    pub const CCU: &str = "ccu";
    pub const TRANSACTIONS: &str = "transactions";
    pub const TRANSACTIONS_IN_10_MIN: &str = "transactionsIn10Min";
}

/// Layer assigned to rows whose layer cell is blank or unusable
pub const DEFAULT_LAYER_ORDER: u32 = 1;

/// Fields of one node frame, resolved once
struct NodeColumns<'a> {
    id: &'a Field,
    label: &'a Field,
    layer_order: &'a Field,
    size: Option<&'a Field>,
    is_center: Option<&'a Field>,
    cifrb: Option<&'a Field>,
    ccu: Option<&'a Field>,
    transactions: Option<&'a Field>,
    transactions_in_10_min: Option<&'a Field>,
}

impl<'a> NodeColumns<'a> {
    /// Resolve columns; `None` when the frame is not a node frame
    fn resolve(frame: &'a DataFrame) -> Option<Self> {
        Some(Self {
            id: frame.field(columns::ID)?,
            label: frame.field(columns::LABEL)?,
            layer_order: frame.field(columns::LAYER_ORDER)?,
            size: frame.field(columns::SIZE),
            is_center: frame.field(columns::IS_CENTER),
            cifrb: frame.field(columns::CIFRB),
            ccu: frame.field(columns::CCU),
            transactions: frame.field(columns::TRANSACTIONS),
            transactions_in_10_min: frame.field(columns::TRANSACTIONS_IN_10_MIN),
        })
    }

    fn record(&self, row: usize) -> NodeRecord {
        let id = self
            .id
            .value(row)
            .as_text()
            .unwrap_or_else(|| format!("node-{row}"));
        let label = self
            .label
            .value(row)
            .as_text()
            .unwrap_or_else(|| format!("Node {row}"));
        let layer_order = parse_layer_order(self.layer_order, row);
        let size = self
            .size
            .and_then(|f| f.value(row).as_text())
            .map(|s| NodeSize::from_label(&s))
            .unwrap_or_default();
        let is_center = self
            .is_center
            .and_then(|f| f.value(row).as_bool())
            .unwrap_or(layer_order == 0);

        NodeRecord {
            id,
            label,
            layer_order,
            size,
            is_center,
            cifrb: metric(self.cifrb, row),
            ccu: metric(self.ccu, row),
            transactions: metric(self.transactions, row),
            transactions_in_10_min: metric(self.transactions_in_10_min, row),
        }
    }
}

fn metric(field: Option<&Field>, row: usize) -> Option<f64> {
    field.and_then(|f| f.value(row).as_f64())
}

fn parse_layer_order(field: &Field, row: usize) -> u32 {
    match field.value(row).as_f64() {
        None => DEFAULT_LAYER_ORDER,
        Some(v) if v.is_finite() && v >= 0.0 && v < f64::from(MAX_LAYER_ORDER + 1) => v.trunc() as u32,
        Some(v) => {
            log::warn!(
                "row {row}: unusable layerOrder {v}, using layer {DEFAULT_LAYER_ORDER}"
            );
            DEFAULT_LAYER_ORDER
        }
    }
}

/// Whether `frame` carries the three columns every node frame needs
pub fn is_node_frame(frame: &DataFrame) -> bool {
    NodeColumns::resolve(frame).is_some()
}

/// Parse every node frame in order into node records
pub fn parse_nodes(frames: &[DataFrame]) -> Vec<NodeRecord> {
    let mut nodes = Vec::new();
    for (index, frame) in frames.iter().enumerate() {
        let Some(columns) = NodeColumns::resolve(frame) else {
            log::trace!("frame {index} is not a node frame, skipping");
            continue;
        };
        let rows = frame.row_count();
        nodes.reserve(rows);
        nodes.extend((0..rows).map(|row| columns.record(row)));
    }
    log::debug!("parsed {} node records from {} frames", nodes.len(), frames.len());
    nodes
}
