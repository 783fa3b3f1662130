#![forbid(unsafe_code)]

//! Pan and zoom applied at draw time.
//!
//! The transform maps model space to screen space as
//! `screen = model * scale + pan`. It is the only state that pan/zoom input
//! touches: scenes stay in model space and are never mutated, so repeated
//! zooming cannot accumulate layout drift.

use nnviz_layout::Point;

/// Zoom multiplier per scroll step.
pub const SCROLL_ZOOM_BASE: f64 = 1.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub pan_x: f64,
    pub pan_y: f64,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        pan_x: 0.0,
        pan_y: 0.0,
        scale: 1.0,
    };

    pub fn new() -> Self {
        Self::IDENTITY
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Accumulate a screen-space drag.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if !(dx.is_finite() && dy.is_finite()) {
            #[cfg(feature = "tracing")]
            tracing::warn!(dx, dy, "ignoring non-finite pan");
            return;
        }
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Scale by `factor`, keeping the screen point under `pivot` fixed.
    ///
    /// Non-finite or non-positive factors are ignored.
    pub fn zoom(&mut self, factor: f64, pivot: Point) {
        if !(factor.is_finite() && factor > 0.0 && pivot.x.is_finite() && pivot.y.is_finite()) {
            #[cfg(feature = "tracing")]
            tracing::warn!(factor, pivot_x = pivot.x, pivot_y = pivot.y, "ignoring invalid zoom");
            return;
        }
        self.scale *= factor;
        self.pan_x = pivot.x - (pivot.x - self.pan_x) * factor;
        self.pan_y = pivot.y - (pivot.y - self.pan_y) * factor;
    }

    /// Scroll-wheel zoom: `factor = 1.01^delta`.
    pub fn zoom_by_scroll(&mut self, delta: f64, pivot: Point) {
        self.zoom(SCROLL_ZOOM_BASE.powf(delta), pivot);
    }

    /// Model space to screen space.
    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.pan_x, p.y * self.scale + self.pan_y)
    }

    /// Scale a model-space length (e.g. a radius).
    #[inline]
    pub fn apply_length(&self, len: f64) -> f64 {
        len * self.scale
    }

    /// Screen space back to model space.
    #[inline]
    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.pan_x) / self.scale, (p.y - self.pan_y) / self.scale)
    }
}
