#![forbid(unsafe_code)]

//! Renderer-agnostic scene description.

use nnviz_core::Rgb;
use nnviz_layout::{Point, Viewport};

use crate::renderer::Renderer;
use crate::view::ViewTransform;

/// One draw call in model space.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle {
        center: Point,
        radius: f64,
        fill: Rgb,
        outline: Rgb,
    },
    Line {
        start: Point,
        end: Point,
        color: Rgb,
        width: f64,
    },
    Rect {
        min: Point,
        max: Point,
        fill: Rgb,
    },
    Text {
        at: Point,
        text: String,
        fill: Rgb,
    },
}

/// Primitive counts for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneStats {
    pub input_nodes: usize,
    pub bias_nodes: usize,
    pub edges: usize,
}

/// A complete, ordered list of draw commands for one viewport.
///
/// Order is the z-order: later commands paint over earlier ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub(crate) viewport: Viewport,
    pub(crate) commands: Vec<DrawCommand>,
    pub(crate) stats: SceneStats,
}

impl Scene {
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Clear `renderer` and replay every command through `view`.
    ///
    /// Positions and radii are transformed; line widths and text are drawn
    /// at their model-space size.
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R, view: &ViewTransform) {
        renderer.clear_all();
        for command in &self.commands {
            match command {
                DrawCommand::Circle {
                    center,
                    radius,
                    fill,
                    outline,
                } => renderer.draw_circle(
                    view.apply(*center),
                    view.apply_length(*radius),
                    *fill,
                    *outline,
                ),
                DrawCommand::Line {
                    start,
                    end,
                    color,
                    width,
                } => renderer.draw_line(view.apply(*start), view.apply(*end), *color, *width),
                DrawCommand::Rect { min, max, fill } => {
                    renderer.draw_rect(view.apply(*min), view.apply(*max), *fill)
                }
                DrawCommand::Text { at, text, fill } => {
                    renderer.draw_text(view.apply(*at), text, *fill)
                }
            }
        }
    }
}
