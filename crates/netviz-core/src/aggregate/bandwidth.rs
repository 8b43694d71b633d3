//! Traffic volume over time.
//!
//! Packets are counted into one-second buckets during ingestion. Rendering
//! re-bins the seconds between the first and last bucket into a fixed number
//! of columns, so a short capture and a day-long capture both fill the panel.

use std::collections::BTreeMap;

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::fmt::format_byte_size;
use crate::packet::PacketInfo;
use crate::render::plot::{self, PlotStyle};
use crate::render::{Bounds, Rgb, Surface};
use crate::tcpip::TcpSeg;

/// Default number of columns drawn.
pub const DEFAULT_COLUMNS: usize = 60;

/// Volume seen in one time slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub packets: u64,
    pub bytes: u64,
    /// Bytes of packets that carried a decodable TCP segment.
    pub tcp_bytes: u64,
}

impl Bucket {
    fn absorb(&mut self, other: &Bucket) {
        self.packets += other.packets;
        self.bytes += other.bytes;
        self.tcp_bytes += other.tcp_bytes;
    }
}

/// Per-second packet and byte counts.
#[derive(Debug, Clone)]
pub struct BandwidthHistogram {
    buckets: BTreeMap<i64, Bucket>,
    totals: Bucket,
    pub style: PlotStyle,
}

impl Default for BandwidthHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl BandwidthHistogram {
    pub fn new() -> Self {
        Self {
            buckets: BTreeMap::new(),
            totals: Bucket::default(),
            style: PlotStyle {
                pad_left_factor: 0.2,
                ..PlotStyle::titled("TCP Packets Received")
            },
        }
    }

    /// Counts every packet; TCP bytes only when `tcp` is present.
    pub fn ingest_packet(&mut self, packet: &PacketInfo<'_>, tcp: Option<&TcpSeg<'_>>) {
        let sample = Bucket {
            packets: 1,
            bytes: packet.caplen as u64,
            tcp_bytes: if tcp.is_some() {
                packet.caplen as u64
            } else {
                0
            },
        };
        self.buckets.entry(packet.ts.sec).or_default().absorb(&sample);
        self.totals.absorb(&sample);
    }

    /// Total bytes ingested.
    pub fn get_count_sum(&self) -> u64 {
        self.totals.bytes
    }

    pub fn totals(&self) -> Bucket {
        self.totals
    }

    /// First and last second that saw traffic.
    pub fn span(&self) -> Option<(i64, i64)> {
        let first = *self.buckets.keys().next()?;
        let last = *self.buckets.keys().next_back()?;
        Some((first, last))
    }

    /// Re-bins the covered seconds into at most `n` equal slots.
    ///
    /// A capture shorter than `n` seconds gets one slot per second.
    pub fn bins(&self, n: usize) -> Vec<Bucket> {
        let Some((first, last)) = self.span() else {
            return Vec::new();
        };
        let seconds = (last - first + 1) as u128;
        let n = (n as u128).clamp(1, seconds);
        let mut out = vec![Bucket::default(); n as usize];
        for (&sec, bucket) in &self.buckets {
            let index = ((sec - first) as u128 * n / seconds) as usize;
            out[index].absorb(bucket);
        }
        out
    }

    /// Column chart of bytes per slot, TCP share overlaid.
    pub fn render(&self, surface: &mut dyn Surface, bounds: Bounds) {
        let area = plot::render_frame(surface, bounds, &self.style);
        let bins = self.bins(DEFAULT_COLUMNS);
        let max = bins.iter().map(|b| b.bytes).max().unwrap_or(0);
        if max == 0 {
            return;
        }

        let bytes: Vec<u64> = bins.iter().map(|b| b.bytes).collect();
        let tcp: Vec<u64> = bins.iter().map(|b| b.tcp_bytes).collect();
        plot::render_columns_scaled(surface, area, &bytes, max, Rgb::GRAY);
        plot::render_columns_scaled(surface, area, &tcp, max, Rgb::BLUE);

        plot::render_y_ticks(surface, area, &self.style, &format_byte_size(max));
        if let Some((first, last)) = self.span() {
            plot::render_x_ticks(
                surface,
                area,
                &self.style,
                &clock_label(first),
                &clock_label(last),
            );
        }
    }
}

fn clock_label(sec: i64) -> String {
    Local
        .timestamp_opt(sec, 0)
        .single()
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{LinkType, Timeval};
    use crate::render::RecordingSurface;

    fn ingest(h: &mut BandwidthHistogram, sec: i64, len: usize, tcp: bool) {
        let frame = vec![0u8; len];
        let pkt = PacketInfo::new(Timeval::new(sec, 0), LinkType::Raw, &frame);
        let seg = TcpSeg {
            src_port: 1,
            dst_port: 2,
            header_len: 20,
            payload: &[],
        };
        h.ingest_packet(&pkt, if tcp { Some(&seg) } else { None });
    }

    #[test]
    fn test_totals() {
        let mut h = BandwidthHistogram::new();
        ingest(&mut h, 100, 60, true);
        ingest(&mut h, 100, 40, false);
        ingest(&mut h, 105, 1500, true);

        assert_eq!(h.get_count_sum(), 1600);
        assert_eq!(
            h.totals(),
            Bucket {
                packets: 3,
                bytes: 1600,
                tcp_bytes: 1560
            }
        );
        assert_eq!(h.span(), Some((100, 105)));
    }

    #[test]
    fn test_bins_short_capture_one_per_second() {
        let mut h = BandwidthHistogram::new();
        ingest(&mut h, 10, 100, false);
        ingest(&mut h, 12, 50, false);

        let bins = h.bins(60);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0].bytes, 100);
        assert_eq!(bins[1].bytes, 0);
        assert_eq!(bins[2].bytes, 50);
    }

    #[test]
    fn test_bins_rebin_long_capture() {
        let mut h = BandwidthHistogram::new();
        for sec in 0..100 {
            ingest(&mut h, 1000 + sec, 10, false);
        }
        let bins = h.bins(10);
        assert_eq!(bins.len(), 10);
        assert!(bins.iter().all(|b| b.bytes == 100 && b.packets == 10));
    }

    #[test]
    fn test_render_empty_draws_frame_only() {
        let h = BandwidthHistogram::new();
        let mut s = RecordingSurface::new();
        h.render(&mut s, Bounds::new(0.0, 0.0, 500.0, 100.0));
        assert_eq!(s.texts(), vec!["TCP Packets Received"]);
        assert!(h.bins(10).is_empty());
    }
}
