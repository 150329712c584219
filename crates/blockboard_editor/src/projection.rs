// SPDX-License-Identifier: MIT OR Apache-2.0
//! Screen to canvas projection.
//!
//! The renderer owns pan and zoom. The controller only needs to turn a
//! drop point into canvas coordinates, through [`CanvasProjection`].

use blockboard_graph::Position;

/// Smallest zoom factor a viewport accepts
pub const MIN_ZOOM: f64 = 0.05;

/// Maps screen coordinates onto the canvas
pub trait CanvasProjection {
    /// Convert a screen point into canvas coordinates
    fn screen_to_canvas(&self, screen: Position) -> Position;
}

/// Screen and canvas coordinates coincide
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProjection;

impl CanvasProjection for IdentityProjection {
    fn screen_to_canvas(&self, screen: Position) -> Position {
        screen
    }
}

/// Pan and zoom state of a canvas view.
///
/// `screen = canvas * zoom + pan`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen offset of the canvas origin
    pub pan: Position,
    /// Zoom factor
    pub zoom: f64,
}

impl Viewport {
    /// Create a viewport; zoom is clamped to [`MIN_ZOOM`]
    pub fn new(pan: Position, zoom: f64) -> Self {
        Self {
            pan,
            zoom: zoom.max(MIN_ZOOM),
        }
    }

    /// Convert a canvas point into screen coordinates
    pub fn canvas_to_screen(&self, canvas: Position) -> Position {
        Position::new(canvas.x * self.zoom + self.pan.x, canvas.y * self.zoom + self.pan.y)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Position::default(), 1.0)
    }
}

impl CanvasProjection for Viewport {
    fn screen_to_canvas(&self, screen: Position) -> Position {
        Position::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }
}
