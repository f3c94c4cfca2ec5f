//! Aggregate counters for the overlay summary panels

use crate::frame::DataFrame;
use serde::{Deserialize, Serialize};

/// Column names of one aggregate metric family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricFamily {
    pub total_column: &'static str,
    pub recent_column: &'static str,
}

impl MetricFamily {
    /// Transaction counts
    pub const TRANSACTIONS: MetricFamily = MetricFamily {
        total_column: "sumTransactions",
        recent_column: "sumTransactionsIn10Min",
    };

    /// Concurrent users
    pub const CONCURRENT_USERS: MetricFamily = MetricFamily {
        total_column: "sumCcu",
        recent_column: "sumCcuIn10Min",
    };
}

/// A pair of summary counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSnapshot {
    pub sum_metric_total: f64,
    pub sum_metric_recent_window: f64,
}

/// First-row value of the first field named `column` across `frames`
fn first_value(frames: &[DataFrame], column: &str) -> Option<f64> {
    frames
        .iter()
        .filter_map(|frame| frame.field(column))
        .find(|field| !field.is_empty())
        .and_then(|field| field.value(0).as_f64())
}

/// Scan `frames` for the family's two columns; absent values read as zero
pub fn parse_aggregate(frames: &[DataFrame], family: MetricFamily) -> AggregateSnapshot {
    AggregateSnapshot {
        sum_metric_total: first_value(frames, family.total_column).unwrap_or(0.0),
        sum_metric_recent_window: first_value(frames, family.recent_column).unwrap_or(0.0),
    }
}
