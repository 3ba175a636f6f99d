use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ptrack::sink::{JsonLinesSink, MotSink};
use ptrack::source::DetsReader;
use ptrack::{Config, DirectionClassifier, DuplicatePolicy, Pipeline};

/// Classifies tracked persons as walking towards or away from the camera
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tracker output, one `<timestamp_ms>: <json array>` line per frame
    #[arg(short, long)]
    detections: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write per-frame summaries as JSON lines to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Write accepted tracks in MOT16 results format to this file
    #[arg(long)]
    mot: Option<PathBuf>,

    /// Source video the detections were produced from
    #[cfg(feature = "video")]
    #[arg(short, long, requires = "output")]
    source: Option<PathBuf>,

    /// Annotated output video
    #[cfg(feature = "video")]
    #[arg(short, long, requires = "source")]
    output: Option<PathBuf>,

    /// Minimum detection confidence
    #[arg(long)]
    conf: Option<f32>,

    /// Class index treated as person
    #[arg(long)]
    person_class: Option<i32>,

    /// Duplicate id handling within a frame: sequential, last, first or confidence
    #[arg(long)]
    duplicates: Option<DuplicatePolicy>,

    /// Forget tracks not seen for this many frames
    #[arg(long)]
    evict_after: Option<u64>,
}

impl Args {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(conf) = self.conf {
            config.classifier.min_confidence = conf;
        }

        if let Some(class) = self.person_class {
            config.classifier.person_class = class;
        }

        if let Some(policy) = self.duplicates {
            config.classifier.duplicate_policy = policy;
        }

        if self.evict_after.is_some() {
            config.classifier.evict_after = self.evict_after;
        }

        config.validate()?;

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ptrack=info")),
        )
        .init();

    let args = Args::parse();
    let config = args.config()?;

    info!(?config, "configuration loaded");

    let reader = DetsReader::open(&args.detections)
        .with_context(|| format!("failed to open {}", args.detections.display()))?;

    let mut pipeline = Pipeline::new(reader, DirectionClassifier::new(config.classifier.clone()))
        .progress_every(config.progress_every);

    let mut sinks = 0;

    if let Some(path) = &args.summary {
        pipeline.add_sink(Box::new(JsonLinesSink::create(path)?));
        sinks += 1;
    }

    if let Some(path) = &args.mot {
        pipeline.add_sink(Box::new(MotSink::create(path)?));
        sinks += 1;
    }

    #[cfg(feature = "video")]
    if let (Some(source), Some(output)) = (&args.source, &args.output) {
        pipeline.add_sink(Box::new(ptrack::render::VideoSink::new(source, output)?));
        sinks += 1;
    }

    if sinks == 0 {
        pipeline.add_sink(Box::new(JsonLinesSink::new(std::io::stdout())));
    }

    let (stats, _) = pipeline.run()?;

    info!(
        "done: {} frames, {} people tracked, {} towards camera",
        stats.frames, stats.total_tracked, stats.towards_count
    );

    Ok(())
}
