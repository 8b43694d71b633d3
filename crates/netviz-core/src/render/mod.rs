//! Drawing surface abstraction.
//!
//! The report never talks to a concrete graphics library. It draws through a
//! [`Surface`] obtained from a [`Backend`], and asks the backend first whether
//! it can draw at all. Coordinates are in points with the origin at the top
//! left corner and `y` growing downwards.
//!
//! Backends:
//! - `PdfBackend` (`pdf` feature, default): writes a single-page PDF
//! - [`NullBackend`]: always unavailable, rendering is skipped
//!
//! [`RecordingSurface`] captures draw calls in memory for inspection.

mod metrics;
pub mod plot;
mod recording;

#[cfg(feature = "pdf")]
pub mod pdf;

pub use metrics::measure_text;
pub use recording::{DrawOp, RecordingSurface};

use std::path::Path;

/// Axis-aligned rectangle in points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Size of a rendered string's ink box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextExtents {
    pub width: f64,
    pub height: f64,
}

/// RGB color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f64, pub f64, pub f64);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);
    pub const GRAY: Rgb = Rgb(0.6, 0.6, 0.6);
    pub const BLUE: Rgb = Rgb(0.16, 0.38, 0.72);
    pub const GREEN: Rgb = Rgb(0.2, 0.6, 0.3);
    pub const ORANGE: Rgb = Rgb(0.9, 0.55, 0.1);
    pub const PURPLE: Rgb = Rgb(0.5, 0.3, 0.7);
}

/// Errors raised while producing output.
#[derive(Debug)]
pub enum RenderError {
    /// Writing the output file failed.
    Io(std::io::Error),
    /// The backend refused to create or finish a surface.
    Backend(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Io(e) => write!(f, "I/O error: {}", e),
            RenderError::Backend(msg) => write!(f, "backend error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        RenderError::Io(e)
    }
}

/// Primitive 2-D drawing operations used by panels and the layout engine.
pub trait Surface {
    /// Font size for subsequent text operations.
    fn set_font_size(&mut self, size: f64);

    /// Color for subsequent text, lines and fills.
    fn set_source_rgb(&mut self, color: Rgb);

    /// Measures `text` at the current font size without drawing it.
    fn text_extents(&self, text: &str) -> TextExtents;

    /// Draws `text` with its left end of the baseline at `(x, y)`.
    fn show_text(&mut self, x: f64, y: f64, text: &str);

    /// Strokes a straight line.
    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, width: f64);

    fn fill_rect(&mut self, rect: Bounds);

    fn stroke_rect(&mut self, rect: Bounds, width: f64);

    /// Shifts the origin of every later operation.
    fn translate(&mut self, dx: f64, dy: f64);

    /// Flushes the drawing to its destination and releases the surface.
    fn finish(self: Box<Self>) -> Result<(), RenderError>;
}

/// Factory for drawing surfaces.
pub trait Backend {
    fn name(&self) -> &'static str;

    /// Whether this backend can produce output in the current build.
    fn is_available(&self) -> bool;

    /// Creates a surface of `width` × `height` points writing to `path`.
    fn create(&self, path: &Path, width: f64, height: f64)
    -> Result<Box<dyn Surface>, RenderError>;
}

/// A backend that is never available. Rendering becomes a no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl Backend for NullBackend {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn create(&self, _: &Path, _: f64, _: f64) -> Result<Box<dyn Surface>, RenderError> {
        Err(RenderError::Backend("no drawing backend in this build".into()))
    }
}

/// The best backend compiled into this build.
pub fn default_backend() -> Box<dyn Backend> {
    #[cfg(feature = "pdf")]
    {
        Box::new(pdf::PdfBackend)
    }
    #[cfg(not(feature = "pdf"))]
    {
        Box::new(NullBackend)
    }
}
