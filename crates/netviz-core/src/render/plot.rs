//! Chart primitives shared by the panel renderers.
//!
//! A panel is drawn as a titled frame with axes, and then filled with either
//! vertical columns (time series) or horizontal bars (ranked lists).

use super::{Bounds, Rgb, Surface};

/// Fraction of the panel height kept free under the plot for tick labels.
const PAD_BOTTOM_FACTOR: f64 = 0.12;
/// Fraction of the panel width kept free right of the plot.
const PAD_RIGHT_FACTOR: f64 = 0.04;
const AXIS_LINE_WIDTH: f64 = 0.5;
/// Horizontal bars leave this share of their slot empty.
const BAR_GAP_FACTOR: f64 = 0.2;

/// Title, tick label sizes and proportions of a chart panel.
#[derive(Debug, Clone)]
pub struct PlotStyle {
    pub title: String,
    /// Share of the panel width reserved left of the plot for y tick labels.
    pub pad_left_factor: f64,
    pub title_font_size: f64,
    pub y_tick_font_size: f64,
    pub x_tick_font_size: f64,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            title: String::new(),
            pad_left_factor: 0.1,
            title_font_size: 8.0,
            y_tick_font_size: 6.0,
            x_tick_font_size: 6.0,
        }
    }
}

impl PlotStyle {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Draws the centred title and the axes. Returns the inner plot area.
pub fn render_frame(surface: &mut dyn Surface, bounds: Bounds, style: &PlotStyle) -> Bounds {
    let mut top = bounds.y;
    surface.set_source_rgb(Rgb::BLACK);

    if !style.title.is_empty() {
        surface.set_font_size(style.title_font_size);
        let extents = surface.text_extents(&style.title);
        let x = bounds.x + (bounds.width - extents.width) / 2.0;
        top += extents.height;
        surface.show_text(x, top, &style.title);
        top += style.title_font_size * 0.5;
    }

    let pad_left = bounds.width * style.pad_left_factor;
    let pad_bottom = bounds.height * PAD_BOTTOM_FACTOR;
    let area = Bounds::new(
        bounds.x + pad_left,
        top,
        (bounds.width - pad_left - bounds.width * PAD_RIGHT_FACTOR).max(0.0),
        (bounds.bottom() - pad_bottom - top).max(0.0),
    );

    surface.line(area.x, area.y, area.x, area.bottom(), AXIS_LINE_WIDTH);
    surface.line(area.x, area.bottom(), area.right(), area.bottom(), AXIS_LINE_WIDTH);
    area
}

/// Labels the top of the y axis with `max_label` and its origin with `"0"`.
pub fn render_y_ticks(surface: &mut dyn Surface, area: Bounds, style: &PlotStyle, max_label: &str) {
    surface.set_source_rgb(Rgb::BLACK);
    surface.set_font_size(style.y_tick_font_size);
    for (label, y) in [(max_label, area.y), ("0", area.bottom())] {
        let extents = surface.text_extents(label);
        let x = area.x - extents.width - style.y_tick_font_size * 0.5;
        surface.show_text(x, y + extents.height / 2.0, label);
    }
}

/// Labels both ends of the x axis.
pub fn render_x_ticks(
    surface: &mut dyn Surface,
    area: Bounds,
    style: &PlotStyle,
    left: &str,
    right: &str,
) {
    surface.set_source_rgb(Rgb::BLACK);
    surface.set_font_size(style.x_tick_font_size);
    let baseline = area.bottom() + style.x_tick_font_size * 1.2;
    surface.show_text(area.x, baseline, left);
    let extents = surface.text_extents(right);
    surface.show_text(area.right() - extents.width, baseline, right);
}

/// Vertical columns on a shared scale where `max` fills the plot height.
pub fn render_columns_scaled(
    surface: &mut dyn Surface,
    area: Bounds,
    values: &[u64],
    max: u64,
    color: Rgb,
) {
    if max == 0 || values.is_empty() || area.width <= 0.0 {
        return;
    }
    let slot = area.width / values.len() as f64;
    surface.set_source_rgb(color);
    for (i, &v) in values.iter().enumerate() {
        if v == 0 {
            continue;
        }
        let h = area.height * (v.min(max) as f64 / max as f64);
        surface.fill_rect(Bounds::new(
            area.x + slot * i as f64,
            area.bottom() - h,
            slot,
            h,
        ));
    }
}

/// Horizontal bars top to bottom with their labels to the left of the plot.
pub fn render_bars(
    surface: &mut dyn Surface,
    area: Bounds,
    style: &PlotStyle,
    entries: &[(String, u64)],
    color: Rgb,
) {
    let max = entries.iter().map(|(_, c)| *c).max().unwrap_or(0);
    if max == 0 || area.height <= 0.0 {
        return;
    }
    let slot = area.height / entries.len() as f64;
    let bar_height = slot * (1.0 - BAR_GAP_FACTOR);
    let label_size = style.y_tick_font_size.min(bar_height.max(1.0));

    for (i, (label, count)) in entries.iter().enumerate() {
        let y = area.y + slot * i as f64 + slot * BAR_GAP_FACTOR / 2.0;
        let w = area.width * *count as f64 / max as f64;
        surface.set_source_rgb(color);
        surface.fill_rect(Bounds::new(area.x, y, w, bar_height));

        surface.set_source_rgb(Rgb::BLACK);
        surface.set_font_size(label_size);
        let extents = surface.text_extents(label);
        surface.show_text(
            area.x - extents.width - label_size * 0.5,
            y + (bar_height + extents.height) / 2.0,
            label,
        );
    }
}
