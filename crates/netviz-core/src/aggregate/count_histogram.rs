//! Label → count histogram with ranked queries.

use std::collections::HashMap;

use crate::render::plot::{self, PlotStyle};
use crate::render::{Bounds, Rgb, Surface};

/// One ranked entry: label and its count.
pub type CountPair = (String, u64);

/// Default number of entries kept in a top list and drawn as bars.
pub const DEFAULT_MAX_BARS: usize = 10;

/// Counts occurrences per label.
#[derive(Debug, Clone)]
pub struct CountHistogram {
    counts: HashMap<String, u64>,
    sum: u64,
    max_bars: usize,
    pub style: PlotStyle,
    pub bar_color: Rgb,
}

impl Default for CountHistogram {
    fn default() -> Self {
        Self::new(PlotStyle::default())
    }
}

impl CountHistogram {
    pub fn new(style: PlotStyle) -> Self {
        Self {
            counts: HashMap::new(),
            sum: 0,
            max_bars: DEFAULT_MAX_BARS,
            style,
            bar_color: Rgb::BLUE,
        }
    }

    pub fn with_max_bars(mut self, max_bars: usize) -> Self {
        self.max_bars = max_bars;
        self
    }

    pub fn increment(&mut self, label: impl Into<String>, delta: u64) {
        *self.counts.entry(label.into()).or_insert(0) += delta;
        self.sum += delta;
    }

    /// Sum of all counts, including entries outside the top list.
    pub fn get_count_sum(&self) -> u64 {
        self.sum
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Highest counts first, ties broken by label, at most `max_bars` entries.
    pub fn get_top_list(&self) -> Vec<CountPair> {
        let mut list: Vec<CountPair> = self
            .counts
            .iter()
            .map(|(label, count)| (label.clone(), *count))
            .collect();
        list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        list.truncate(self.max_bars);
        list
    }

    /// Draws the top list as horizontal bars.
    pub fn render(&self, surface: &mut dyn Surface, bounds: Bounds) {
        let area = plot::render_frame(surface, bounds, &self.style);
        plot::render_bars(surface, area, &self.style, &self.get_top_list(), self.bar_color);
    }
}
