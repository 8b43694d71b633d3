//! Serializable snapshot of a report's statistics.

use std::collections::BTreeMap;

use serde::Serialize;

use super::OnePageReport;
use crate::aggregate::CountPair;
use crate::fmt::{TransportPercentages, format_byte_size, format_timeval, top_n_percentage};

/// One ranked entry of a top-N list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopEntry {
    pub label: String,
    pub count: u64,
    /// Integer share of the list total, rounded down.
    pub percentage: u64,
}

/// Everything the page shows as text, in machine-readable form.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub source: String,
    pub packet_count: u64,
    pub byte_count: u64,
    pub byte_size: String,
    pub earliest: String,
    pub latest: String,
    pub transports: TransportPercentages,
    /// Keyed by link-layer type in hex, e.g. `"0x0800"`.
    pub transport_counts: BTreeMap<String, u64>,
    pub top_source_addresses: Vec<TopEntry>,
    pub top_destination_addresses: Vec<TopEntry>,
    pub top_source_ports: Vec<TopEntry>,
    pub top_destination_ports: Vec<TopEntry>,
}

impl ReportSummary {
    pub fn from_report(report: &OnePageReport) -> Self {
        let top_n = report.config().histogram_show_top_n_text;
        let src_addr = report.src_addr_histogram();
        let dst_addr = report.dst_addr_histogram();
        let src_port = report.src_port_histogram();
        let dst_port = report.dst_port_histogram();

        Self {
            source: report.source_identifier().to_string(),
            packet_count: report.packet_count(),
            byte_count: report.byte_count(),
            byte_size: format_byte_size(report.byte_count()),
            earliest: format_timeval(report.earliest()),
            latest: format_timeval(report.latest()),
            transports: report.transport_percentages(),
            transport_counts: report
                .transport_counts()
                .iter()
                .map(|(ty, count)| (format!("0x{ty:04x}"), *count))
                .collect(),
            top_source_addresses: top_entries(
                src_addr.get_top_list(),
                src_addr.get_count_sum(),
                top_n,
            ),
            top_destination_addresses: top_entries(
                dst_addr.get_top_list(),
                dst_addr.get_count_sum(),
                top_n,
            ),
            top_source_ports: top_entries(src_port.get_top_list(), src_port.get_count_sum(), top_n),
            top_destination_ports: top_entries(
                dst_port.get_top_list(),
                dst_port.get_count_sum(),
                top_n,
            ),
        }
    }
}

fn top_entries(list: Vec<CountPair>, total: u64, n: usize) -> Vec<TopEntry> {
    list.into_iter()
        .take(n)
        .map(|(label, count)| TopEntry {
            percentage: top_n_percentage(count, total),
            label,
            count,
        })
        .collect()
}
