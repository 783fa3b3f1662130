#![forbid(unsafe_code)]

//! nnviz: live diagrams of a neural network's weights and biases.
//!
//! # Role in nnviz
//! This is the facade crate. It re-exports the layer crates and adds what a
//! host application needs around them: a host-event adapter
//! ([`Visualizer`]), file configuration, an SVG [`Renderer`](nnviz_render::Renderer),
//! logging setup, built-in presets, and the `nnviz` binary.
//!
//! # Pipeline
//! producer -> [`SnapshotMailbox`] -> [`UpdateScheduler`] (polled on a tick)
//! -> [`NetworkModel`] -> [`NetworkLayout`] -> [`SceneBuilder`] -> renderer,
//! with the [`ViewTransform`] applied only at draw time.
//!
//! ```
//! use nnviz::{HostEvent, Settings, SnapshotMailbox, SvgRenderer, Visualizer, presets};
//!
//! let mut vis = Visualizer::new(SnapshotMailbox::shared(), &Settings::default())?;
//! vis.show(&presets::tiny())?;
//! vis.handle(HostEvent::PointerDrag { dx: 10.0, dy: 0.0 })?;
//!
//! let mut svg = SvgRenderer::new(vis.scheduler().viewport());
//! vis.draw(&mut svg);
//! assert!(svg.document().contains("#7f007f"));
//! # Ok::<(), nnviz::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod presets;
pub mod svg;
pub mod visualizer;

pub use config::{ConfigError, Settings, VisualizerConfig};
pub use error::{Error, Recovery, Result};
pub use svg::SvgRenderer;
pub use visualizer::{HostEvent, Repaint, Visualizer};

pub use nnviz_core::{
    ChannelInput, ColorScheme, ConfigurationError, NetworkModel, ParameterSnapshot, Rgb,
    StructuralError, Tensor,
};
pub use nnviz_layout::{NetworkLayout, Point, Viewport};
pub use nnviz_render::{DrawCommand, RecordingRenderer, Renderer, Scene, SceneBuilder, ViewTransform};
pub use nnviz_runtime::{
    Every, RebuildOutcome, SchedulerError, SnapshotMailbox, SubscriptionHandle, UpdateScheduler,
};
