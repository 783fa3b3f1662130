#![forbid(unsafe_code)]

//! SVG output: a [`Renderer`] that accumulates an SVG document.

use std::fmt::Write as _;
use std::path::Path;

use nnviz_core::Rgb;
use nnviz_layout::{Point, Viewport};
use nnviz_render::Renderer;

/// Font size for legend labels.
const TEXT_SIZE: u32 = 12;

#[derive(Debug, Clone)]
pub struct SvgRenderer {
    viewport: Viewport,
    background: Option<Rgb>,
    body: String,
    elements: usize,
}

impl SvgRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            background: None,
            body: String::new(),
            elements: 0,
        }
    }

    #[must_use]
    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = Some(background);
        self
    }

    /// Elements drawn since the last `clear_all`.
    pub fn element_count(&self) -> usize {
        self.elements
    }

    /// The complete SVG document.
    pub fn document(&self) -> String {
        let (w, h) = (num(self.viewport.width), num(self.viewport.height));
        let mut out = String::with_capacity(self.body.len() + 256);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );
        if let Some(bg) = self.background {
            let _ = writeln!(out, r#"  <rect width="100%" height="100%" fill="{bg}"/>"#);
        }
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }

    /// Write the document to `path`, replacing it.
    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, self.document())
    }
}

impl Renderer for SvgRenderer {
    fn draw_circle(&mut self, center: Point, radius: f64, fill: Rgb, outline: Rgb) {
        self.elements += 1;
        let _ = writeln!(
            self.body,
            r#"  <circle cx="{}" cy="{}" r="{}" fill="{fill}" stroke="{outline}"/>"#,
            num(center.x),
            num(center.y),
            num(radius),
        );
    }

    fn draw_line(&mut self, start: Point, end: Point, color: Rgb, width: f64) {
        self.elements += 1;
        let _ = writeln!(
            self.body,
            r#"  <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{color}" stroke-width="{}"/>"#,
            num(start.x),
            num(start.y),
            num(end.x),
            num(end.y),
            num(width),
        );
    }

    fn draw_rect(&mut self, min: Point, max: Point, fill: Rgb) {
        self.elements += 1;
        let (x, y) = (min.x.min(max.x), min.y.min(max.y));
        let _ = writeln!(
            self.body,
            r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="{fill}"/>"#,
            num(x),
            num(y),
            num((max.x - min.x).abs()),
            num((max.y - min.y).abs()),
        );
    }

    fn draw_text(&mut self, at: Point, text: &str, fill: Rgb) {
        self.elements += 1;
        let _ = writeln!(
            self.body,
            r#"  <text x="{}" y="{}" fill="{fill}" font-size="{TEXT_SIZE}" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            num(at.x),
            num(at.y),
            escape(text),
        );
    }

    fn clear_all(&mut self) {
        self.body.clear();
        self.elements = 0;
    }
}

/// Two decimals, trailing zeros dropped.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
