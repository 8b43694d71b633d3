//! Page layout: a single forward-only pass over the report.
//!
//! The pass owns a vertical cursor measured from the top of the content area.
//! Every stage draws at the cursor and then moves it down; nothing ever moves
//! it back up.

use chrono::{DateTime, Local};
use tracing::debug;

use super::{OnePageReport, TITLE_VERSION};
use crate::aggregate::{AddressHistogram, CountPair, PortHistogram};
use crate::fmt::{comma_number_string, format_byte_size, format_timeval, top_n_percentage};
use crate::render::{Bounds, Rgb, Surface, TextExtents};

pub const PAGE_MARGIN_FACTOR: f64 = 0.05;
pub const LINE_SPACE_FACTOR: f64 = 0.25;
pub const HISTOGRAM_PAD_FACTOR_Y: f64 = 1.0;
pub const ADDRESS_HISTOGRAM_WIDTH_DIVISOR: f64 = 2.5;
pub const BANDWIDTH_HISTOGRAM_HEIGHT: f64 = 100.0;
pub const ADDRESS_HISTOGRAM_HEIGHT: f64 = 100.0;

/// Blank lines after the "Generated" line and after the whole header.
const HEADER_PAD_LINES: f64 = 4.0;
/// Top-N rows advance by this multiple of the taller rendered line.
const TOP_N_LINE_FACTOR: f64 = 1.5;

/// Page sections, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Header,
    BandwidthHistogram,
    Map,
    Packetfall,
    AddressHistograms,
    PortHistograms,
}

impl Stage {
    pub const SEQUENCE: [Stage; 6] = [
        Stage::Header,
        Stage::BandwidthHistogram,
        Stage::Map,
        Stage::Packetfall,
        Stage::AddressHistograms,
        Stage::PortHistograms,
    ];
}

/// A histogram panel that also feeds a ranked text list.
pub trait RankedPanel {
    fn render(&self, surface: &mut dyn Surface, bounds: Bounds);
    fn count_sum(&self) -> u64;
    fn top_list(&self) -> Vec<CountPair>;
}

impl RankedPanel for AddressHistogram {
    fn render(&self, surface: &mut dyn Surface, bounds: Bounds) {
        AddressHistogram::render(self, surface, bounds);
    }

    fn count_sum(&self) -> u64 {
        self.get_count_sum()
    }

    fn top_list(&self) -> Vec<CountPair> {
        self.get_top_list()
    }
}

impl RankedPanel for PortHistogram {
    fn render(&self, surface: &mut dyn Surface, bounds: Bounds) {
        PortHistogram::render(self, surface, bounds);
    }

    fn count_sum(&self) -> u64 {
        self.get_count_sum()
    }

    fn top_list(&self) -> Vec<CountPair> {
        self.get_top_list()
    }
}

/// One rendering pass over a finished report.
///
/// `surface_bounds` is the content area. The surface origin must already sit
/// at its top-left corner, so drawing happens at `x = 0`, `y = cursor`.
pub struct RenderPass<'a> {
    report: &'a OnePageReport,
    surface: &'a mut dyn Surface,
    surface_bounds: Bounds,
    generated: DateTime<Local>,
    end_of_content: f64,
}

impl<'a> RenderPass<'a> {
    pub fn new(
        report: &'a OnePageReport,
        surface: &'a mut dyn Surface,
        surface_bounds: Bounds,
        generated: DateTime<Local>,
    ) -> Self {
        Self {
            report,
            surface,
            surface_bounds,
            generated,
            end_of_content: 0.0,
        }
    }

    /// Current cursor, relative to the top of the content area.
    pub fn end_of_content(&self) -> f64 {
        self.end_of_content
    }

    /// Draws every stage in order and returns the final cursor.
    pub fn run(mut self) -> f64 {
        for stage in Stage::SEQUENCE {
            self.render_stage(stage);
        }
        self.end_of_content
    }

    fn render_stage(&mut self, stage: Stage) {
        debug!(?stage, cursor = self.end_of_content, "rendering stage");
        match stage {
            Stage::Header => self.render_header(),
            Stage::BandwidthHistogram => self.render_bandwidth_histogram(),
            Stage::Map => self.render_map(),
            Stage::Packetfall => self.render_packetfall(),
            Stage::AddressHistograms => self.render_address_histograms(),
            Stage::PortHistograms => self.render_port_histograms(),
        }
    }

    fn line_space(&self) -> f64 {
        self.report.config().header_font_size * LINE_SPACE_FACTOR
    }

    /// Draws `text` with its top edge at the cursor. Does not move the cursor.
    fn render_text(&mut self, text: &str, font_size: f64, x: f64) -> TextExtents {
        self.surface.set_source_rgb(Rgb::BLACK);
        self.surface.set_font_size(font_size);
        let extents = self.surface.text_extents(text);
        self.surface
            .show_text(x, self.end_of_content + extents.height, text);
        extents
    }

    fn render_text_line(&mut self, text: &str, font_size: f64) {
        let extents = self.render_text(text, font_size, 0.0);
        self.end_of_content += extents.height + self.line_space();
    }

    fn render_header(&mut self) {
        let report = self.report;
        let size = report.config().header_font_size;
        let pad = self.line_space() * HEADER_PAD_LINES;

        self.render_text_line(TITLE_VERSION, size);
        self.render_text_line(&format!("Input: {}", report.source_identifier()), size);
        let generated = self.generated.format("%Y-%m-%d %H:%M:%S").to_string();
        self.render_text_line(&format!("Generated: {generated}"), size);
        self.end_of_content += pad;

        self.render_text_line(
            &format!(
                "Date range: {} to {}",
                format_timeval(report.earliest()),
                format_timeval(report.latest())
            ),
            size,
        );
        self.render_text_line(
            &format!(
                "Packets analyzed: {} ({})",
                comma_number_string(report.packet_count()),
                format_byte_size(report.byte_count())
            ),
            size,
        );
        self.render_text_line(
            &format!("Transports: {}", report.transport_percentages().to_line()),
            size,
        );
        self.end_of_content += pad;
    }

    fn full_width_panel(&self, height: f64) -> Bounds {
        Bounds::new(0.0, self.end_of_content, self.surface_bounds.width, height)
    }

    fn render_bandwidth_histogram(&mut self) {
        let bounds = self.full_width_panel(BANDWIDTH_HISTOGRAM_HEIGHT);
        self.report
            .bandwidth_histogram()
            .render(&mut *self.surface, bounds);
        self.end_of_content += bounds.height * HISTOGRAM_PAD_FACTOR_Y;
    }

    /// Reserved slot for a geographic map; draws nothing.
    fn render_map(&mut self) {}

    fn render_packetfall(&mut self) {
        let bounds = self.full_width_panel(BANDWIDTH_HISTOGRAM_HEIGHT);
        self.report.packetfall().render(&mut *self.surface, bounds);
        self.end_of_content += bounds.height * HISTOGRAM_PAD_FACTOR_Y;
    }

    fn render_address_histograms(&mut self) {
        let report = self.report;
        let src = report.src_addr_histogram();
        let dst = report.dst_addr_histogram();
        self.render_histogram_pair(
            &src,
            ADDRESS_HISTOGRAM_HEIGHT,
            &dst,
            ADDRESS_HISTOGRAM_HEIGHT,
        );
    }

    fn render_port_histograms(&mut self) {
        let report = self.report;
        self.render_histogram_pair(
            report.src_port_histogram(),
            ADDRESS_HISTOGRAM_HEIGHT,
            report.dst_port_histogram(),
            ADDRESS_HISTOGRAM_HEIGHT,
        );
    }

    fn panel_width(&self) -> f64 {
        self.surface_bounds.width / ADDRESS_HISTOGRAM_WIDTH_DIVISOR
    }

    /// Two panels side by side, flush left and flush right, then their top-N
    /// lists underneath.
    fn render_histogram_pair(
        &mut self,
        left: &dyn RankedPanel,
        left_height: f64,
        right: &dyn RankedPanel,
        right_height: f64,
    ) {
        let width = self.panel_width();
        let right_x = self.surface_bounds.width - width;
        let top = self.end_of_content;

        left.render(&mut *self.surface, Bounds::new(0.0, top, width, left_height));
        right.render(&mut *self.surface, Bounds::new(right_x, top, width, right_height));

        let tallest = left_height.max(right_height);
        self.end_of_content += tallest;
        self.render_dual_histograms_top_n(left, right, right_x);
        self.end_of_content += tallest * (HISTOGRAM_PAD_FACTOR_Y - 1.0);
    }

    fn render_dual_histograms_top_n(
        &mut self,
        left: &dyn RankedPanel,
        right: &dyn RankedPanel,
        right_x: f64,
    ) {
        let size = self.report.config().top_list_font_size;
        let top_n = self.report.config().histogram_show_top_n_text;
        let (left_list, left_total) = (left.top_list(), left.count_sum());
        let (right_list, right_total) = (right.top_list(), right.count_sum());

        for rank in 0..top_n {
            let left_height = match left_list.get(rank) {
                Some(entry) => {
                    let line = top_n_line(rank, entry, left_total);
                    self.render_text(&line, size, 0.0).height
                }
                None => 0.0,
            };
            let right_height = match right_list.get(rank) {
                Some(entry) => {
                    let line = top_n_line(rank, entry, right_total);
                    self.render_text(&line, size, right_x).height
                }
                None => 0.0,
            };
            self.end_of_content += left_height.max(right_height) * TOP_N_LINE_FACTOR;
        }
    }
}

/// `"2. 10.0.0.2 - 1,024 (22%)"`
fn top_n_line(rank: usize, (label, count): &CountPair, total: u64) -> String {
    format!(
        "{}. {} - {} ({}%)",
        rank + 1,
        label,
        comma_number_string(*count),
        top_n_percentage(*count, total)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fmt::TransportPercentages;
    use crate::packet::{LinkType, PacketInfo, Timeval};
    use crate::render::{RecordingSurface, measure_text};
    use crate::report::testutil::mixed_capture;
    use crate::report::{OnePageReport, ReportConfig};
    use chrono::TimeZone;

    struct FakePanel {
        entries: Vec<CountPair>,
        total: u64,
    }

    impl FakePanel {
        fn new(entries: &[(&str, u64)], total: u64) -> Self {
            Self {
                entries: entries
                    .iter()
                    .map(|(l, c)| (l.to_string(), *c))
                    .collect(),
                total,
            }
        }
    }

    impl RankedPanel for FakePanel {
        fn render(&self, _: &mut dyn Surface, _: Bounds) {}

        fn count_sum(&self) -> u64 {
            self.total
        }

        fn top_list(&self) -> Vec<CountPair> {
            self.entries.clone()
        }
    }

    fn generated() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    fn content() -> Bounds {
        Bounds::new(0.0, 0.0, 500.0, 700.0)
    }

    fn mixed_report() -> OnePageReport {
        let mut report = OnePageReport::default().with_source_identifier("mixed.pcap");
        for (i, frame) in mixed_capture().iter().enumerate() {
            report.ingest_packet(&PacketInfo::new(
                Timeval::new(1_700_000_000 + i as i64, i as i64 + 1),
                LinkType::Ethernet,
                frame,
            ));
        }
        report
    }

    #[test]
    fn test_stage_sequence() {
        assert_eq!(
            Stage::SEQUENCE,
            [
                Stage::Header,
                Stage::BandwidthHistogram,
                Stage::Map,
                Stage::Packetfall,
                Stage::AddressHistograms,
                Stage::PortHistograms,
            ]
        );
    }

    #[test]
    fn test_header_lines_and_cursor() {
        let report = OnePageReport::default().with_source_identifier("capture.pcap");
        let mut surface = RecordingSurface::new();
        let mut pass = RenderPass::new(&report, &mut surface, content(), generated());
        pass.render_stage(Stage::Header);
        let end = pass.end_of_content();

        let expected = [
            TITLE_VERSION.to_string(),
            "Input: capture.pcap".to_string(),
            "Generated: 2024-03-01 12:30:00".to_string(),
            format!(
                "Date range: {} to {}",
                format_timeval(Timeval::default()),
                format_timeval(Timeval::default())
            ),
            "Packets analyzed: 0 (0.00 B)".to_string(),
            format!("Transports: {}", TransportPercentages::default().to_line()),
        ];
        assert_eq!(surface.texts(), expected.iter().map(String::as_str).collect::<Vec<_>>());

        let line_space = 8.0 * LINE_SPACE_FACTOR;
        let lines: f64 = expected
            .iter()
            .map(|t| measure_text(t, 8.0).height + line_space)
            .sum();
        let pads = 2.0 * HEADER_PAD_LINES * line_space;
        assert!((end - (lines + pads)).abs() < 1e-9);
    }

    #[test]
    fn test_text_baseline_below_cursor() {
        let report = OnePageReport::default();
        let mut surface = RecordingSurface::new();
        let mut pass = RenderPass::new(&report, &mut surface, content(), generated());
        pass.end_of_content = 40.0;
        let extents = pass.render_text("Top", 8.0, 5.0);
        assert_eq!(pass.end_of_content(), 40.0);

        match &surface.ops()[0] {
            crate::render::DrawOp::Text { x, y, size, .. } => {
                assert_eq!(*x, 5.0);
                assert!((y - (40.0 + extents.height)).abs() < 1e-9);
                assert_eq!(*size, 8.0);
            }
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn test_map_stage_is_noop() {
        let report = OnePageReport::default();
        let mut surface = RecordingSurface::new();
        let mut pass = RenderPass::new(&report, &mut surface, content(), generated());
        pass.render_stage(Stage::Map);
        assert_eq!(pass.end_of_content(), 0.0);
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_full_width_panels_advance_by_height() {
        let report = mixed_report();
        let mut surface = RecordingSurface::new();
        let mut pass = RenderPass::new(&report, &mut surface, content(), generated());
        pass.render_stage(Stage::BandwidthHistogram);
        assert_eq!(pass.end_of_content(), BANDWIDTH_HISTOGRAM_HEIGHT);
        pass.render_stage(Stage::Packetfall);
        assert_eq!(pass.end_of_content(), 2.0 * BANDWIDTH_HISTOGRAM_HEIGHT);
    }

    #[test]
    fn test_unequal_pair_advances_by_max() {
        let report = OnePageReport::default();
        let mut surface = RecordingSurface::new();
        let mut pass = RenderPass::new(&report, &mut surface, content(), generated());
        let empty = FakePanel::new(&[], 0);
        pass.end_of_content = 10.0;
        pass.render_histogram_pair(&empty, 80.0, &empty, 120.0);
        assert_eq!(pass.end_of_content(), 130.0);
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_top_n_rows_with_one_side_exhausted() {
        let report = OnePageReport::default();
        let mut surface = RecordingSurface::new();
        let mut pass = RenderPass::new(&report, &mut surface, content(), generated());

        let left = FakePanel::new(&[("a", 50), ("b", 20), ("c", 20)], 90);
        let right = FakePanel::new(&[("443", 1500)], 2000);
        pass.render_histogram_pair(&left, 80.0, &right, 120.0);
        let end = pass.end_of_content();

        let texts = surface.texts();
        assert_eq!(
            texts,
            vec![
                "1. a - 50 (55%)",
                "1. 443 - 1,500 (75%)",
                "2. b - 20 (22%)",
                "3. c - 20 (22%)",
            ]
        );

        let rows: f64 = [
            measure_text("1. a - 50 (55%)", 8.0)
                .height
                .max(measure_text("1. 443 - 1,500 (75%)", 8.0).height),
            measure_text("2. b - 20 (22%)", 8.0).height,
            measure_text("3. c - 20 (22%)", 8.0).height,
        ]
        .iter()
        .map(|h| h * 1.5)
        .sum();
        assert!((end - (120.0 + rows)).abs() < 1e-9);

        // Right-hand rows start at the right panel's left edge.
        let right_x = 500.0 - 500.0 / ADDRESS_HISTOGRAM_WIDTH_DIVISOR;
        match &surface.ops()[1] {
            crate::render::DrawOp::Text { x, .. } => assert!((x - right_x).abs() < 1e-9),
            other => panic!("unexpected op {other:?}"),
        }
    }

    #[test]
    fn test_top_n_zero_total_shows_zero_percent() {
        let report = OnePageReport::default();
        let mut surface = RecordingSurface::new();
        let mut pass = RenderPass::new(&report, &mut surface, content(), generated());
        let left = FakePanel::new(&[("x", 5)], 0);
        let right = FakePanel::new(&[], 0);
        pass.render_histogram_pair(&left, 100.0, &right, 100.0);
        assert_eq!(surface.texts(), vec!["1. x - 5 (0%)"]);
    }

    #[test]
    fn test_top_n_respects_config() {
        let report = OnePageReport::new(ReportConfig::default().with_top_n(1));
        let mut surface = RecordingSurface::new();
        let mut pass = RenderPass::new(&report, &mut surface, content(), generated());
        let left = FakePanel::new(&[("a", 2), ("b", 1)], 3);
        pass.render_histogram_pair(&left, 100.0, &FakePanel::new(&[], 0), 100.0);
        assert_eq!(surface.texts(), vec!["1. a - 2 (66%)"]);
    }

    #[test]
    fn test_cursor_never_decreases() {
        let report = mixed_report();
        let mut surface = RecordingSurface::new();
        let mut pass = RenderPass::new(&report, &mut surface, content(), generated());
        let mut last = pass.end_of_content();
        for stage in Stage::SEQUENCE {
            pass.render_stage(stage);
            assert!(pass.end_of_content() >= last, "{stage:?} moved the cursor up");
            last = pass.end_of_content();
        }
    }

    #[test]
    fn test_default_page_fits() {
        let report = mixed_report();
        let content = report.content_bounds();
        let mut surface = RecordingSurface::new();
        surface.translate(content.x, content.y);
        let end = RenderPass::new(&report, &mut surface, content, generated()).run();
        assert!(end > 0.0);
        assert!(end <= content.height, "content ends at {end}");

        let texts = surface.texts();
        assert!(texts.contains(&"Top Source Addresses"));
        assert!(texts.contains(&"Top Destination Ports"));
        assert!(texts.contains(&"1. 10.0.0.1 - 50 (55%)"));
    }
}
