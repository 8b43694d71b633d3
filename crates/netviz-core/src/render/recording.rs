//! In-memory surface that records draw calls.

use super::metrics::measure_text;
use super::{Bounds, RenderError, Rgb, Surface, TextExtents};

/// A single recorded draw call, in untranslated page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        size: f64,
        text: String,
    },
    Line {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
    FillRect(Bounds),
    StrokeRect(Bounds),
}

/// Surface that keeps every operation for later inspection.
#[derive(Debug)]
pub struct RecordingSurface {
    ops: Vec<DrawOp>,
    font_size: f64,
    color: Rgb,
    origin: (f64, f64),
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            font_size: 10.0,
            color: Rgb::BLACK,
            origin: (0.0, 0.0),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Recorded strings in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn color(&self) -> Rgb {
        self.color
    }
}

impl Surface for RecordingSurface {
    fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }

    fn set_source_rgb(&mut self, color: Rgb) {
        self.color = color;
    }

    fn text_extents(&self, text: &str) -> TextExtents {
        measure_text(text, self.font_size)
    }

    fn show_text(&mut self, x: f64, y: f64, text: &str) {
        self.ops.push(DrawOp::Text {
            x: x + self.origin.0,
            y: y + self.origin.1,
            size: self.font_size,
            text: text.to_string(),
        });
    }

    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, _width: f64) {
        let (dx, dy) = self.origin;
        self.ops.push(DrawOp::Line {
            x0: x0 + dx,
            y0: y0 + dy,
            x1: x1 + dx,
            y1: y1 + dy,
        });
    }

    fn fill_rect(&mut self, rect: Bounds) {
        let (dx, dy) = self.origin;
        self.ops.push(DrawOp::FillRect(Bounds::new(
            rect.x + dx,
            rect.y + dy,
            rect.width,
            rect.height,
        )));
    }

    fn stroke_rect(&mut self, rect: Bounds, _width: f64) {
        let (dx, dy) = self.origin;
        self.ops.push(DrawOp::StrokeRect(Bounds::new(
            rect.x + dx,
            rect.y + dy,
            rect.width,
            rect.height,
        )));
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.origin.0 += dx;
        self.origin.1 += dy;
    }

    fn finish(self: Box<Self>) -> Result<(), RenderError> {
        Ok(())
    }
}
