#![forbid(unsafe_code)]

//! Render layer: scene building, view transform, and the renderer seam.
//!
//! # Role in nnviz
//! `nnviz-render` turns model-space geometry from `nnviz-layout` into an
//! ordered list of draw commands and replays it through a host-provided
//! [`Renderer`].
//!
//! # Primary responsibilities
//! - **SceneBuilder**: colors nodes and edges, adds the legend.
//! - **Scene**: the renderer-agnostic command list, rebuilt wholesale.
//! - **ViewTransform**: pan/zoom applied at draw time only.
//! - **Renderer**: the drawing capability the host implements, plus a
//!   headless [`RecordingRenderer`] for tests.
//!
//! # How it fits in the system
//! The runtime rebuilds a [`Scene`] whenever something that affects geometry
//! or color changes, and calls [`Scene::draw`] with the current
//! [`ViewTransform`] whenever the view needs repainting.

pub mod builder;
pub mod renderer;
pub mod scene;
pub mod view;

pub use builder::SceneBuilder;
pub use renderer::{RecordingRenderer, Renderer};
pub use scene::{DrawCommand, Scene, SceneStats};
pub use view::ViewTransform;
