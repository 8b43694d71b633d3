//! One-page report: statistics aggregation and page rendering.
//!
//! Lifecycle is two-phase. During ingestion every packet goes through
//! [`OnePageReport::ingest_packet`], which updates the run counters and fans
//! the decoded layers out to the sub-aggregators. Afterwards the report is
//! rendered once through a [`Backend`]; rendering only borrows the report, so
//! every statistic stays queryable whether or not a file was produced.

mod config;
mod layout;
mod summary;

pub use config::{
    DEFAULT_FILENAME, DEFAULT_PAGE_HEIGHT, DEFAULT_PAGE_WIDTH, MAX_TOP_N, ReportConfig,
};
pub use layout::{
    ADDRESS_HISTOGRAM_HEIGHT, ADDRESS_HISTOGRAM_WIDTH_DIVISOR, BANDWIDTH_HISTOGRAM_HEIGHT,
    HISTOGRAM_PAD_FACTOR_Y, LINE_SPACE_FACTOR, PAGE_MARGIN_FACTOR, RankedPanel, RenderPass, Stage,
};
pub use summary::{ReportSummary, TopEntry};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::aggregate::{
    AddressHistogram, BandwidthHistogram, CountPair, IpTree, Packetfall, PortHistogram,
    Relationship,
};
use crate::fmt::TransportPercentages;
use crate::packet::{PacketInfo, Timeval};
use crate::render::{Backend, Bounds, RenderError};
use crate::tcpip::{TcpSeg, ip4_from_bytes, ip6_from_bytes, tcp_from_bytes};

/// Title line printed at the top of the page.
pub const TITLE_VERSION: &str = concat!("netviz ", env!("CARGO_PKG_VERSION"));

/// Aggregated statistics of one capture and the means to draw them.
pub struct OnePageReport {
    config: ReportConfig,
    source_identifier: String,
    packet_count: u64,
    byte_count: u64,
    earliest: Timeval,
    latest: Timeval,
    transport_counts: BTreeMap<u16, u64>,
    bandwidth_histogram: BandwidthHistogram,
    src_tree: IpTree,
    dst_tree: IpTree,
    src_port_histogram: PortHistogram,
    dst_port_histogram: PortHistogram,
    packetfall: Packetfall,
}

impl Default for OnePageReport {
    fn default() -> Self {
        Self::new(ReportConfig::default())
    }
}

impl OnePageReport {
    pub fn new(config: ReportConfig) -> Self {
        let max_leaves = config.address_tree_max_leaves;
        Self {
            config,
            source_identifier: String::new(),
            packet_count: 0,
            byte_count: 0,
            earliest: Timeval::default(),
            latest: Timeval::default(),
            transport_counts: BTreeMap::new(),
            bandwidth_histogram: BandwidthHistogram::new(),
            src_tree: IpTree::new(max_leaves),
            dst_tree: IpTree::new(max_leaves),
            src_port_histogram: PortHistogram::new(Relationship::Source, "Top Source Ports"),
            dst_port_histogram: PortHistogram::new(
                Relationship::Destination,
                "Top Destination Ports",
            ),
            packetfall: Packetfall::default(),
        }
    }

    /// Sets the input name shown in the header (usually the capture path).
    pub fn with_source_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.source_identifier = identifier.into();
        self
    }

    /// Accounts one packet. Never fails; undecodable layers are skipped.
    pub fn ingest_packet(&mut self, packet: &PacketInfo<'_>) {
        if self.earliest.is_unset() {
            self.earliest = packet.ts;
        }
        // Both fields must grow; see DESIGN.md.
        if packet.ts.sec > self.latest.sec && packet.ts.usec > self.latest.usec {
            self.latest = packet.ts;
        }

        self.packet_count += 1;
        self.byte_count += packet.caplen as u64;
        if let Some(ether_type) = packet.ether_type() {
            *self.transport_counts.entry(ether_type).or_insert(0) += 1;
        }

        let ip_data = packet.ip_data();
        let ip_payload: Option<&[u8]> = if let Some(ip4) = ip4_from_bytes(ip_data) {
            self.src_tree.add(&ip4.src);
            self.dst_tree.add(&ip4.dst);
            (ip4.protocol == etherparse::IpNumber::TCP).then_some(ip4.payload)
        } else if let Some(ip6) = ip6_from_bytes(ip_data) {
            self.src_tree.add(&ip6.src);
            self.dst_tree.add(&ip6.dst);
            (ip6.next_header == etherparse::IpNumber::TCP).then_some(ip6.payload)
        } else {
            None
        };

        let tcp: Option<TcpSeg<'_>> = ip_payload.and_then(tcp_from_bytes);

        self.bandwidth_histogram.ingest_packet(packet, tcp.as_ref());
        if let Some(ref seg) = tcp {
            self.src_port_histogram.ingest_segment(seg);
            self.dst_port_histogram.ingest_segment(seg);
        }
        self.packetfall.ingest_packet(packet, tcp.as_ref());
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn source_identifier(&self) -> &str {
        &self.source_identifier
    }

    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    pub fn byte_count(&self) -> u64 {
        self.byte_count
    }

    pub fn earliest(&self) -> Timeval {
        self.earliest
    }

    pub fn latest(&self) -> Timeval {
        self.latest
    }

    /// Packets per link-layer protocol identifier.
    pub fn transport_counts(&self) -> &BTreeMap<u16, u64> {
        &self.transport_counts
    }

    /// Packets whose link-layer protocol could be classified.
    pub fn transport_total(&self) -> u64 {
        self.transport_counts.values().sum()
    }

    pub fn transport_percentages(&self) -> TransportPercentages {
        TransportPercentages::from_counts(&self.transport_counts)
    }

    pub fn bandwidth_histogram(&self) -> &BandwidthHistogram {
        &self.bandwidth_histogram
    }

    pub fn packetfall(&self) -> &Packetfall {
        &self.packetfall
    }

    pub fn src_tree(&self) -> &IpTree {
        &self.src_tree
    }

    pub fn dst_tree(&self) -> &IpTree {
        &self.dst_tree
    }

    pub fn src_addr_histogram(&self) -> AddressHistogram {
        AddressHistogram::from_iptree(Relationship::Source, "Top Source Addresses", &self.src_tree)
    }

    pub fn dst_addr_histogram(&self) -> AddressHistogram {
        AddressHistogram::from_iptree(
            Relationship::Destination,
            "Top Destination Addresses",
            &self.dst_tree,
        )
    }

    /// Busiest source addresses and prefixes, descending.
    pub fn top_sources(&self) -> Vec<CountPair> {
        self.src_addr_histogram().get_top_list()
    }

    pub fn top_destinations(&self) -> Vec<CountPair> {
        self.dst_addr_histogram().get_top_list()
    }

    pub fn src_port_histogram(&self) -> &PortHistogram {
        &self.src_port_histogram
    }

    pub fn dst_port_histogram(&self) -> &PortHistogram {
        &self.dst_port_histogram
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary::from_report(self)
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Page area inside the uniform margin (5% of page width on every side).
    pub fn content_bounds(&self) -> Bounds {
        let page = self.config.bounds;
        let pad = page.width * PAGE_MARGIN_FACTOR;
        Bounds::new(
            page.x + pad,
            page.y + pad,
            page.width - pad * 2.0,
            page.height - pad * 2.0,
        )
    }

    /// Renders the page to `<outdir>/<filename>`.
    ///
    /// Returns the written path, or `None` when the backend cannot draw in
    /// this build.
    pub fn render(
        &self,
        outdir: &Path,
        backend: &dyn Backend,
    ) -> Result<Option<PathBuf>, RenderError> {
        if !backend.is_available() {
            warn!(backend = backend.name(), "drawing backend unavailable, skipping render");
            return Ok(None);
        }

        let path = outdir.join(&self.config.filename);
        let page = self.config.bounds;
        let mut surface = backend.create(&path, page.width, page.height)?;

        let content = self.content_bounds();
        surface.translate(content.x, content.y);
        let end = RenderPass::new(self, surface.as_mut(), content, Local::now()).run();
        debug!(end_of_content = end, height = content.height, "layout complete");

        surface.finish()?;
        info!(path = %path.display(), backend = backend.name(), "report written");
        Ok(Some(path))
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    //! Synthetic captures for report tests.

    use crate::packet::{ETHERTYPE_ARP, ETHERTYPE_IP, ETHERTYPE_IPV6};
    use crate::tcpip::testutil::{ethernet_frame, ipv4_datagram, ipv6_datagram, tcp_header};

    pub const V6_SOURCE: [u8; 16] = [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];

    pub fn ipv4_tcp(src: [u8; 4], dst: [u8; 4], sport: u16, dport: u16) -> Vec<u8> {
        ethernet_frame(ETHERTYPE_IP, &ipv4_datagram(src, dst, 6, &tcp_header(sport, dport)))
    }

    pub fn ipv6_tcp(src: [u8; 16], dst: [u8; 16], sport: u16, dport: u16) -> Vec<u8> {
        ethernet_frame(ETHERTYPE_IPV6, &ipv6_datagram(src, dst, 6, &tcp_header(sport, dport)))
    }

    pub fn arp() -> Vec<u8> {
        ethernet_frame(ETHERTYPE_ARP, &[0u8; 28])
    }

    /// Too short to carry a link-layer type.
    pub fn runt() -> Vec<u8> {
        vec![0xff; 10]
    }

    /// 70 IPv4/TCP (50 from 10.0.0.1, 20 from 10.0.0.2), 20 IPv6/TCP from
    /// 2001:db8::1, 5 ARP and 5 runts.
    pub fn mixed_capture() -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        for i in 0..50 {
            frames.push(ipv4_tcp([10, 0, 0, 1], [192, 168, 0, 10], 40000 + i, 443));
        }
        for _ in 0..20 {
            frames.push(ipv4_tcp([10, 0, 0, 2], [192, 168, 0, 20], 50000, 80));
        }
        for _ in 0..20 {
            frames.push(ipv6_tcp(V6_SOURCE, [0xfe; 16], 60000, 22));
        }
        for _ in 0..5 {
            frames.push(arp());
        }
        for _ in 0..5 {
            frames.push(runt());
        }
        frames
    }
}
