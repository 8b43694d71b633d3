//! Construction-time report configuration.

use crate::aggregate;
use crate::render::Bounds;

/// Default output file name, relative to the output directory.
pub const DEFAULT_FILENAME: &str = "report.pdf";

/// US Letter at 72 dpi.
pub const DEFAULT_PAGE_WIDTH: f64 = 611.0;
pub const DEFAULT_PAGE_HEIGHT: f64 = 792.0;

/// Upper bound on top-N entries listed under each histogram pair.
pub const MAX_TOP_N: usize = 50;

/// Configuration for a one-page report.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Output file name. Default: `report.pdf`.
    pub filename: String,
    /// Page rectangle in points. Default: 611 × 792.
    pub bounds: Bounds,
    /// Font size of header lines. Default: 8.
    pub header_font_size: f64,
    /// Font size of top-N annotation lines. Default: 8.
    pub top_list_font_size: f64,
    /// Entries listed under each histogram pair. Default: 3, at most
    /// [`MAX_TOP_N`].
    pub histogram_show_top_n_text: usize,
    /// Bound on distinct entries in each address tree. Default: 1024.
    pub address_tree_max_leaves: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            bounds: Bounds::new(0.0, 0.0, DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT),
            header_font_size: 8.0,
            top_list_font_size: 8.0,
            histogram_show_top_n_text: 3,
            address_tree_max_leaves: aggregate::DEFAULT_MAX_LEAVES,
        }
    }
}

impl ReportConfig {
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_page_size(mut self, width: f64, height: f64) -> Self {
        self.bounds = Bounds::new(0.0, 0.0, width, height);
        self
    }

    pub fn with_header_font_size(mut self, size: f64) -> Self {
        self.header_font_size = size;
        self
    }

    pub fn with_top_list_font_size(mut self, size: f64) -> Self {
        self.top_list_font_size = size;
        self
    }

    pub fn with_top_n(mut self, n: usize) -> Self {
        self.histogram_show_top_n_text = n.min(MAX_TOP_N);
        self
    }

    pub fn with_address_tree_max_leaves(mut self, n: usize) -> Self {
        self.address_tree_max_leaves = n;
        self
    }
}
