#![forbid(unsafe_code)]

//! Core: parameter snapshots, structural validation, and color mapping.
//!
//! # Role in nnviz
//! `nnviz-core` is the data layer. It owns the wire-level snapshot type that
//! producers publish, the validated layer model derived from it, and the
//! scalar-to-color mapping used by the scene builder.
//!
//! # Primary responsibilities
//! - **ParameterSnapshot**: ordered `name -> tensor` mapping, replaced wholesale.
//! - **NetworkModel**: alternating weight/bias layers with checked shapes.
//! - **Color mapping**: linear interpolation between two endpoint colors.
//!
//! # How it fits in the system
//! `nnviz-layout` consumes a [`NetworkModel`] to place nodes and edges, and
//! `nnviz-render` uses [`ColorScheme`] to paint them. Nothing in this crate
//! knows about viewports, threads, or drawing.

pub mod color;
pub mod error;
pub mod model;
pub mod snapshot;

pub use color::{ChannelInput, ColorScheme, Rgb, interpolate, magnitude_to_progress};
pub use error::{ConfigurationError, StructuralError};
pub use model::{BiasLayer, Layer, LayerKind, LayerShape, NetworkModel, Stage, WeightLayer};
pub use snapshot::{ParameterSnapshot, Tensor};
