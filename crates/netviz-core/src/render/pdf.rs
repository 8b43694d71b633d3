//! Single-page PDF backend.
//!
//! Draw calls are collected into one content stream and written out with the
//! standard Helvetica font when the surface is finished. Page space in PDF has
//! its origin at the bottom left; every coordinate is flipped on the way in.

use std::path::{Path, PathBuf};

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use tracing::debug;

use super::metrics::measure_text;
use super::{Backend, Bounds, RenderError, Rgb, Surface, TextExtents};

const FONT_NAME: Name<'static> = Name(b"F1");

/// Backend producing PDF files through `pdf-writer`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfBackend;

impl Backend for PdfBackend {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn create(
        &self,
        path: &Path,
        width: f64,
        height: f64,
    ) -> Result<Box<dyn Surface>, RenderError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(RenderError::Backend(format!(
                "invalid page size {}x{}",
                width, height
            )));
        }
        Ok(Box::new(PdfSurface::new(path, width, height)))
    }
}

/// Surface accumulating a PDF content stream.
pub struct PdfSurface {
    path: PathBuf,
    width: f64,
    height: f64,
    content: Content,
    font_size: f64,
    origin: (f64, f64),
}

impl PdfSurface {
    fn new(path: &Path, width: f64, height: f64) -> Self {
        Self {
            path: path.to_path_buf(),
            width,
            height,
            content: Content::new(),
            font_size: 10.0,
            origin: (0.0, 0.0),
        }
    }

    /// Maps a top-left-origin point into PDF page space.
    fn page_point(&self, x: f64, y: f64) -> (f32, f32) {
        (
            (x + self.origin.0) as f32,
            (self.height - (y + self.origin.1)) as f32,
        )
    }

    fn rect_path(&mut self, rect: Bounds) {
        let (x, y) = self.page_point(rect.x, rect.bottom());
        self.content
            .rect(x, y, rect.width as f32, rect.height as f32);
    }
}

/// Bytes in the font's single-byte encoding; anything outside ASCII becomes `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}

impl Surface for PdfSurface {
    fn set_font_size(&mut self, size: f64) {
        self.font_size = size;
    }

    fn set_source_rgb(&mut self, color: Rgb) {
        let Rgb(r, g, b) = color;
        self.content.set_fill_rgb(r as f32, g as f32, b as f32);
        self.content.set_stroke_rgb(r as f32, g as f32, b as f32);
    }

    fn text_extents(&self, text: &str) -> TextExtents {
        measure_text(text, self.font_size)
    }

    fn show_text(&mut self, x: f64, y: f64, text: &str) {
        let (px, py) = self.page_point(x, y);
        let bytes = encode_text(text);
        self.content.begin_text();
        self.content.set_font(FONT_NAME, self.font_size as f32);
        self.content.next_line(px, py);
        self.content.show(Str(&bytes));
        self.content.end_text();
    }

    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, width: f64) {
        let (ax, ay) = self.page_point(x0, y0);
        let (bx, by) = self.page_point(x1, y1);
        self.content.set_line_width(width as f32);
        self.content.move_to(ax, ay);
        self.content.line_to(bx, by);
        self.content.stroke();
    }

    fn fill_rect(&mut self, rect: Bounds) {
        self.rect_path(rect);
        self.content.fill_nonzero();
    }

    fn stroke_rect(&mut self, rect: Bounds, width: f64) {
        self.content.set_line_width(width as f32);
        self.rect_path(rect);
        self.content.stroke();
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.origin.0 += dx;
        self.origin.1 += dy;
    }

    fn finish(self: Box<Self>) -> Result<(), RenderError> {
        let this = *self;
        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let font_id = Ref::new(4);
        let content_id = Ref::new(5);

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id).kids([page_id]).count(1);

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, this.width as f32, this.height as f32));
        page.parent(page_tree_id);
        page.contents(content_id);
        page.resources().fonts().pair(FONT_NAME, font_id);
        page.finish();

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        let stream = this.content.finish();
        pdf.stream(content_id, &stream);

        let bytes = pdf.finish();
        std::fs::write(&this.path, &bytes)?;
        debug!(path = %this.path.display(), bytes = bytes.len(), "wrote pdf");
        Ok(())
    }
}
