//! Overlay models: live clock, aggregate summaries and node label placement
//!
//! Everything here is plain data. The GPU backend turns it into egui shapes.

use crate::camera::Camera;
use crate::scene::PlacedLabel;
use chrono::{DateTime, Local};
use orbitview_core::{format_metric, parse_aggregate, AggregateSnapshot, DataFrame, MetricFamily};
use std::time::{Duration, Instant};

/// How often the clock refreshes while running
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

const CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wall-clock display refreshed once per interval while running
#[derive(Debug, Clone)]
pub struct LiveClock {
    now: DateTime<Local>,
    last_tick: Option<Instant>,
    running: bool,
}

impl Default for LiveClock {
    fn default() -> Self {
        Self {
            now: Local::now(),
            last_tick: None,
            running: false,
        }
    }
}

impl LiveClock {
    pub fn start(&mut self) {
        self.running = true;
        self.last_tick = None;
    }

    /// Stop refreshing; the last shown time stays
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Refresh from the system clock if an interval has passed
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now(), Local::now())
    }

    /// Refresh to `wall` if running and at least [`CLOCK_INTERVAL`] has
    /// passed since the last refresh. Returns whether the display changed.
    pub fn tick_at(&mut self, instant: Instant, wall: DateTime<Local>) -> bool {
        if !self.running {
            return false;
        }
        let due = self
            .last_tick
            .map_or(true, |last| instant.saturating_duration_since(last) >= CLOCK_INTERVAL);
        if due {
            self.now = wall;
            self.last_tick = Some(instant);
        }
        due
    }

    pub fn display(&self) -> String {
        self.now.format(CLOCK_FORMAT).to_string()
    }
}

/// Transactions panel: clock plus the transaction aggregates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionSummary {
    pub snapshot: AggregateSnapshot,
}

impl TransactionSummary {
    pub fn rows(&self, clock: &LiveClock) -> Vec<(&'static str, String)> {
        vec![
            ("Time", clock.display()),
            ("Transactions", format_metric(self.snapshot.sum_metric_total)),
            ("Last 10 min", format_metric(self.snapshot.sum_metric_recent_window)),
        ]
    }
}

/// Concurrent users panel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CounterSummary {
    pub snapshot: AggregateSnapshot,
}

impl CounterSummary {
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Concurrent users", format_metric(self.snapshot.sum_metric_total)),
            ("Last 10 min", format_metric(self.snapshot.sum_metric_recent_window)),
        ]
    }
}

/// State of every 2D element drawn over the scene
#[derive(Debug, Clone, Default)]
pub struct OverlayModel {
    pub clock: LiveClock,
    pub transactions: TransactionSummary,
    pub counters: CounterSummary,
    /// Show the no-data placeholder instead of summaries
    pub no_data: bool,
}

impl OverlayModel {
    /// Refresh both summaries from aggregate frames
    pub fn update_aggregates(&mut self, frames: &[DataFrame]) {
        self.transactions.snapshot = parse_aggregate(frames, MetricFamily::TRANSACTIONS);
        self.counters.snapshot = parse_aggregate(frames, MetricFamily::CONCURRENT_USERS);
    }
}

/// A label resolved to screen space
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLabel {
    pub title: String,
    pub lines: Vec<String>,
    /// Pixel position of the label's bottom center
    pub position: [f32; 2],
}

/// Project labels into a `size` pixel viewport, dropping those behind the camera
pub fn project_labels(labels: &[PlacedLabel<'_>], camera: &Camera, size: [f32; 2]) -> Vec<ScreenLabel> {
    labels
        .iter()
        .filter_map(|label| {
            let position = camera.project_to_screen(&label.world, size)?;
            Some(ScreenLabel {
                title: label.block.title.clone(),
                lines: label.block.lines.clone(),
                position,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use orbitview_core::Point3f;
    use orbitview_layout::LabelBlock;

    fn wall(seconds: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 0, seconds).unwrap()
    }

    #[test]
    fn test_clock_refreshes_once_per_interval() {
        let mut clock = LiveClock::default();
        let start = Instant::now();
        clock.start();

        assert!(clock.tick_at(start, wall(0)));
        assert_eq!(clock.display(), "2024-05-01 12:00:00");

        assert!(!clock.tick_at(start + Duration::from_millis(400), wall(1)));
        assert_eq!(clock.display(), "2024-05-01 12:00:00");

        assert!(clock.tick_at(start + Duration::from_millis(1000), wall(1)));
        assert_eq!(clock.display(), "2024-05-01 12:00:01");
    }

    #[test]
    fn test_stopped_clock_never_refreshes() {
        let mut clock = LiveClock::default();
        let start = Instant::now();
        clock.start();
        clock.tick_at(start, wall(0));
        clock.stop();

        assert!(!clock.is_running());
        assert!(!clock.tick_at(start + Duration::from_secs(5), wall(5)));
        assert_eq!(clock.display(), "2024-05-01 12:00:00");
    }

    #[test]
    fn test_summaries_use_metric_formatting() {
        let frames = vec![DataFrame::new()
            .with_field("sumTransactions", vec![1_500_000.0])
            .with_field("sumTransactionsIn10Min", vec![1_000.0])
            .with_field("sumCcu", vec![999.0])];
        let mut model = OverlayModel::default();
        model.update_aggregates(&frames);

        let rows = model.transactions.rows(&model.clock);
        assert_eq!(rows[1], ("Transactions", "1.5M".to_string()));
        assert_eq!(rows[2], ("Last 10 min", "1.0K".to_string()));
        assert_eq!(
            model.counters.rows(),
            vec![
                ("Concurrent users", "999".to_string()),
                ("Last 10 min", "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_labels_behind_camera_are_dropped() {
        let camera = Camera::default();
        let block = LabelBlock {
            title: "Hub".to_string(),
            lines: vec!["TPS: 1.0K".to_string()],
        };
        let behind = camera.position + (camera.position - camera.target);
        let labels = vec![
            PlacedLabel { block: &block, world: Point3f::origin() },
            PlacedLabel { block: &block, world: behind },
        ];

        let projected = project_labels(&labels, &camera, [800.0, 600.0]);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].title, "Hub");
        assert_eq!(projected[0].lines, vec!["TPS: 1.0K".to_string()]);
    }
}
