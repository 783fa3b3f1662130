#![forbid(unsafe_code)]

//! The drawing capability a host provides.

use nnviz_core::Rgb;
use nnviz_layout::Point;

use crate::scene::DrawCommand;

/// Low-level drawing primitives. Coordinates arrive already transformed.
///
/// The core never reads pixels back; implementations only need to draw.
pub trait Renderer {
    fn draw_circle(&mut self, center: Point, radius: f64, fill: Rgb, outline: Rgb);

    fn draw_line(&mut self, start: Point, end: Point, color: Rgb, width: f64);

    /// Axis-aligned rectangle between two corners.
    fn draw_rect(&mut self, min: Point, max: Point, fill: Rgb);

    fn draw_text(&mut self, at: Point, text: &str, fill: Rgb);

    /// Remove everything drawn so far.
    fn clear_all(&mut self);
}

/// Headless renderer that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
    clears: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands since the last `clear_all`.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }
}

impl Renderer for RecordingRenderer {
    fn draw_circle(&mut self, center: Point, radius: f64, fill: Rgb, outline: Rgb) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            fill,
            outline,
        });
    }

    fn draw_line(&mut self, start: Point, end: Point, color: Rgb, width: f64) {
        self.commands.push(DrawCommand::Line {
            start,
            end,
            color,
            width,
        });
    }

    fn draw_rect(&mut self, min: Point, max: Point, fill: Rgb) {
        self.commands.push(DrawCommand::Rect { min, max, fill });
    }

    fn draw_text(&mut self, at: Point, text: &str, fill: Rgb) {
        self.commands.push(DrawCommand::Text {
            at,
            text: text.to_owned(),
            fill,
        });
    }

    fn clear_all(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }
}
