#![forbid(unsafe_code)]

//! `nnviz` command line.

use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use nnviz_core::ParameterSnapshot;
use nnviz_runtime::{Every, MailboxStats, SnapshotMailbox, SubscriptionHandle};

use crate::config::{Settings, VisualizerConfig};
use crate::error::{Error, Result};
use crate::logging::{self, LogFormat};
use crate::presets::{self, PRESET_NAMES};
use crate::svg::SvgRenderer;
use crate::visualizer::{HostEvent, Repaint, Visualizer};

#[derive(Debug, Parser)]
#[command(
    name = "nnviz",
    about = "Draw neural-network weights and biases as a colored node diagram",
    version
)]
pub struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render one snapshot to SVG.
    Render(RenderArgs),

    /// Animate a preset from a background producer, rewriting the SVG on every rebuild.
    Watch(WatchArgs),

    /// Print built-in preset names.
    #[command(name = "list-presets")]
    ListPresets,
}

/// Where the parameters come from.
#[derive(Debug, Clone, Args)]
#[group(required = false, multiple = false)]
pub struct SourceArgs {
    /// JSON snapshot file (an object of name -> matrix or vector, in layer order).
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Built-in snapshot name.
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,
}

impl SourceArgs {
    /// The selected snapshot; `tiny` when nothing was chosen.
    pub fn load(&self) -> Result<ParameterSnapshot> {
        match (&self.snapshot, &self.preset) {
            (Some(path), _) => load_snapshot(path),
            (None, Some(name)) => presets::preset(name),
            (None, None) => Ok(presets::tiny()),
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct DisplayArgs {
    /// TOML or JSON configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the configured viewport width.
    #[arg(long)]
    pub width: Option<f64>,

    /// Override the configured viewport height.
    #[arg(long)]
    pub height: Option<f64>,
}

impl DisplayArgs {
    pub fn settings(&self) -> Result<Settings> {
        let mut config = match &self.config {
            Some(path) => VisualizerConfig::from_file(path)?,
            None => VisualizerConfig::default(),
        };
        if let Some(width) = self.width {
            config.viewport.width = width;
        }
        if let Some(height) = self.height {
            config.viewport.height = height;
        }
        Ok(config.validate()?)
    }
}

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub display: DisplayArgs,

    /// Output path; stdout when omitted.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub display: DisplayArgs,

    /// SVG file rewritten after each rebuild.
    #[arg(long, short)]
    pub output: PathBuf,

    /// Number of snapshots the producer publishes.
    #[arg(long, default_value_t = 100)]
    pub steps: u64,

    /// Delay between published snapshots.
    #[arg(long, default_value_t = 20)]
    pub step_ms: u64,
}

/// Result of a `watch` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSummary {
    pub rebuilds: u64,
    pub mailbox: MailboxStats,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    logging::init(format);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Render(args) => {
            let svg = render_svg(&args)?;
            match &args.output {
                Some(path) => {
                    std::fs::write(path, svg)?;
                    tracing::info!(target: "nnviz", path = %path.display(), "wrote svg");
                }
                None => print!("{svg}"),
            }
            Ok(())
        }
        Commands::Watch(args) => {
            let summary = run_watch(&args)?;
            tracing::info!(
                target: "nnviz",
                rebuilds = summary.rebuilds,
                published = summary.mailbox.published,
                superseded = summary.mailbox.superseded,
                "watch finished"
            );
            Ok(())
        }
        Commands::ListPresets => {
            for name in PRESET_NAMES {
                println!("{name}");
            }
            Ok(())
        }
    }
}

/// Read a JSON snapshot from disk.
pub fn load_snapshot(path: &Path) -> Result<ParameterSnapshot> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::SnapshotFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ParameterSnapshot::from_json_str(&content)?)
}

/// Render the selected snapshot into an SVG document.
pub fn render_svg(args: &RenderArgs) -> Result<String> {
    let settings = args.display.settings()?;
    let snapshot = args.source.load()?;
    let mut vis = Visualizer::new(SnapshotMailbox::shared(), &settings)?;
    vis.show(&snapshot)?;

    let mut svg = SvgRenderer::new(vis.scheduler().viewport());
    vis.draw(&mut svg);
    Ok(svg.document())
}

/// Run a producer thread against a polling render loop until the producer
/// is done and its last snapshot has been drawn.
pub fn run_watch(args: &WatchArgs) -> Result<WatchSummary> {
    let settings = args.display.settings()?;
    let base = args.source.load()?;
    let mailbox = SnapshotMailbox::shared();
    let mut vis = Visualizer::new(Arc::clone(&mailbox), &settings)?;
    vis.show(&base)?;
    let mut svg = SvgRenderer::new(vis.scheduler().viewport());
    redraw(&vis, &mut svg, &args.output)?;

    let producer = {
        let mailbox = Arc::clone(&mailbox);
        let (steps, delay) = (args.steps, Duration::from_millis(args.step_ms));
        thread::spawn(move || {
            for step in 1..=steps {
                mailbox.publish(presets::perturb(&base, step));
                thread::sleep(delay);
            }
        })
    };

    let (tx, rx) = mpsc::channel();
    let ticks = SubscriptionHandle::spawn(Every::new(settings.poll_interval, || HostEvent::Poll), tx);

    let outcome = loop {
        let Ok(event) = rx.recv() else {
            break Ok(());
        };
        let drained = producer.is_finished();
        match vis.handle(event) {
            Ok(Repaint::Scene) => {
                if let Err(err) = redraw(&vis, &mut svg, &args.output) {
                    break Err(err);
                }
            }
            Ok(_) => {}
            Err(err) if err.is_recoverable() => {
                tracing::warn!(target: "nnviz", error = %err, "keeping previous scene");
            }
            Err(err) => break Err(err),
        }
        if drained && !mailbox.is_pending() {
            break Ok(());
        }
    };
    ticks.cancel();
    let _ = producer.join();
    outcome?;

    Ok(WatchSummary {
        rebuilds: vis.scheduler().rebuild_count(),
        mailbox: mailbox.stats(),
    })
}

fn redraw(vis: &Visualizer, svg: &mut SvgRenderer, path: &Path) -> Result<()> {
    vis.draw(svg);
    svg.write_to(path)?;
    Ok(())
}
