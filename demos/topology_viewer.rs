//! Topology viewer demo
//!
//! Opens a window with one topology panel. Data comes from a JSON frame file
//! or is generated; with `--refresh-secs` generated data is re-sent with
//! jittered metrics, which exercises the full rebuild path.
//!
//! Controls:
//!   Mouse: drag to orbit
//!   Scroll: zoom
//!   Close window to exit

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use orbitview_core::{load_frames, DataFrame, FieldValue, PanelOptions};
use orbitview_visualization::{run, FrameSource, StaticFrames, ViewerConfig};

#[derive(Parser, Debug)]
#[command(name = "topology_viewer")]
#[command(about = "3D ring topology view over tabular data")]
struct Args {
    /// JSON file holding an array of frames
    #[arg(long)]
    frames: Option<PathBuf>,

    /// JSON file holding panel options
    #[arg(long)]
    options: Option<PathBuf>,

    /// Number of rings, overrides the options file
    #[arg(long)]
    layers: Option<u32>,

    /// Number of generated satellite nodes
    #[arg(long, default_value_t = 24)]
    nodes: usize,

    /// Re-send generated data every N seconds
    #[arg(long)]
    refresh_secs: Option<f64>,

    /// Seed for generated data
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

/// Generates a hub and `nodes` satellites spread over `layers` rings
struct SyntheticSource {
    rng: StdRng,
    nodes: usize,
    layers: u32,
    refresh: Option<Duration>,
    last_sent: Option<Instant>,
}

impl SyntheticSource {
    fn frames(&mut self) -> Vec<DataFrame> {
        let count = self.nodes + 1;
        let mut ids = Vec::with_capacity(count);
        let mut labels = Vec::with_capacity(count);
        let mut layers = Vec::with_capacity(count);
        let mut centers = Vec::with_capacity(count);
        let mut sizes = Vec::with_capacity(count);
        let mut ccu = Vec::with_capacity(count);
        let mut transactions = Vec::with_capacity(count);
        let mut recent = Vec::with_capacity(count);

        for i in 0..count {
            let is_hub = i == 0;
            ids.push(format!("svc-{i}"));
            labels.push(if is_hub { "Hub".to_string() } else { format!("Service {i}") });
            layers.push(if is_hub { 0 } else { 1 + (i as i64 - 1) % i64::from(self.layers.max(1)) });
            centers.push(FieldValue::Bool(is_hub));
            sizes.push(["sm", "medium", "lg"][self.rng.gen_range(0..3)]);
            let scale: f64 = if is_hub { 1_000_000.0 } else { 20_000.0 };
            ccu.push(FieldValue::Number((self.rng.gen_range(0.0f64..1.0) * scale / 50.0).round()));
            transactions.push(FieldValue::Number((self.rng.gen_range(0.2f64..1.0) * scale).round()));
            // some services report no recent window
            recent.push(if self.rng.gen_bool(0.8) {
                FieldValue::Number((self.rng.gen_range(0.0f64..1.0) * scale / 100.0).round())
            } else {
                FieldValue::Null
            });
        }

        let sum = |values: &[FieldValue]| values.iter().filter_map(FieldValue::as_f64).sum::<f64>();
        let aggregates = DataFrame::named("aggregates")
            .with_field("sumTransactions", vec![sum(&transactions)])
            .with_field("sumTransactionsIn10Min", vec![sum(&recent)])
            .with_field("sumCcu", vec![sum(&ccu)])
            .with_field("sumCcuIn10Min", vec![(sum(&ccu) * 0.1).round()]);

        let nodes = DataFrame::named("nodes")
            .with_field("id", ids)
            .with_field("label", labels)
            .with_field("layerOrder", layers)
            .with_field("isCenter", centers)
            .with_field("size", sizes)
            .with_field("ccu", ccu)
            .with_field("transactions", transactions)
            .with_field("transactionsIn10Min", recent);

        vec![nodes, aggregates]
    }
}

impl FrameSource for SyntheticSource {
    fn poll(&mut self, now: Instant) -> Option<Vec<DataFrame>> {
        let due = match (self.last_sent, self.refresh) {
            (None, _) => true,
            (Some(last), Some(refresh)) => now.duration_since(last) >= refresh,
            (Some(_), None) => false,
        };
        if !due {
            return None;
        }
        self.last_sent = Some(now);
        Some(self.frames())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut options = match &args.options {
        Some(path) => PanelOptions::load(path)
            .with_context(|| format!("loading options from {}", path.display()))?,
        None => PanelOptions::default(),
    };
    if let Some(layers) = args.layers {
        options = PanelOptions::with_layers(layers)?;
    }

    let config = ViewerConfig {
        title: "orbitview topology".to_string(),
        options: options.clone(),
        ..ViewerConfig::default()
    };

    match &args.frames {
        Some(path) => {
            let frames = load_frames(path)
                .with_context(|| format!("loading frames from {}", path.display()))?;
            log::info!("loaded {} frames from {}", frames.len(), path.display());
            run(config, StaticFrames::new(frames))?;
        }
        None => {
            let source = SyntheticSource {
                rng: StdRng::seed_from_u64(args.seed),
                nodes: args.nodes,
                layers: options.number_of_layers,
                refresh: args.refresh_secs.map(Duration::from_secs_f64),
                last_sent: None,
            };
            log::info!("generating {} nodes over {} layers", args.nodes, options.number_of_layers);
            run(config, source)?;
        }
    }

    Ok(())
}
