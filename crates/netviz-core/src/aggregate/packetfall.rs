//! Packet waterfall: every packet as a dot on a time × size plane.

use crate::packet::{PacketInfo, Timeval};
use crate::render::plot::{self, PlotStyle};
use crate::render::{Bounds, Rgb, Surface};
use crate::tcpip::TcpSeg;

/// Default bound on retained samples.
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

const DOT_SIZE: f64 = 1.5;

/// Coarse service class used for dot color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortClass {
    Web,
    Ssh,
    Dns,
    Other,
}

impl PortClass {
    pub fn of(port: Option<u16>) -> Self {
        match port {
            Some(80 | 443 | 8080 | 8443) => PortClass::Web,
            Some(22) => PortClass::Ssh,
            Some(53) => PortClass::Dns,
            _ => PortClass::Other,
        }
    }

    fn color(self) -> Rgb {
        match self {
            PortClass::Web => Rgb::BLUE,
            PortClass::Ssh => Rgb::GREEN,
            PortClass::Dns => Rgb::ORANGE,
            PortClass::Other => Rgb::GRAY,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    ts: Timeval,
    caplen: u32,
    class: PortClass,
}

/// Bounded list of packet samples. Packets past the bound are only counted.
#[derive(Debug, Clone)]
pub struct Packetfall {
    samples: Vec<Sample>,
    max_samples: usize,
    dropped: u64,
    pub style: PlotStyle,
}

impl Default for Packetfall {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}

impl Packetfall {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: Vec::new(),
            max_samples,
            dropped: 0,
            style: PlotStyle {
                pad_left_factor: 0.2,
                ..PlotStyle::default()
            },
        }
    }

    /// Records one dot; the color comes from the TCP destination port, if any.
    pub fn ingest_packet(&mut self, packet: &PacketInfo<'_>, tcp: Option<&TcpSeg<'_>>) {
        if self.samples.len() >= self.max_samples {
            self.dropped += 1;
            return;
        }
        self.samples.push(Sample {
            ts: packet.ts,
            caplen: packet.caplen,
            class: PortClass::of(tcp.map(|t| t.dst_port)),
        });
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Packets seen after the sample bound was reached.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    #[cfg(test)]
    pub(crate) fn classes(&self) -> Vec<PortClass> {
        self.samples.iter().map(|s| s.class).collect()
    }

    pub fn render(&self, surface: &mut dyn Surface, bounds: Bounds) {
        let area = plot::render_frame(surface, bounds, &self.style);
        if self.samples.is_empty() || area.width <= 0.0 || area.height <= 0.0 {
            return;
        }

        let (mut t0, mut t1) = (f64::MAX, f64::MIN);
        let mut max_len = 1u32;
        for s in &self.samples {
            let t = s.ts.as_secs_f64();
            t0 = t0.min(t);
            t1 = t1.max(t);
            max_len = max_len.max(s.caplen);
        }
        let span = (t1 - t0).max(f64::EPSILON);

        for s in &self.samples {
            let fx = (s.ts.as_secs_f64() - t0) / span;
            let fy = s.caplen as f64 / max_len as f64;
            let x = area.x + fx * (area.width - DOT_SIZE).max(0.0);
            let y = area.bottom() - fy * (area.height - DOT_SIZE).max(0.0) - DOT_SIZE;
            surface.set_source_rgb(s.class.color());
            surface.fill_rect(Bounds::new(x, y, DOT_SIZE, DOT_SIZE));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{ETHERTYPE_IP, LinkType};
    use crate::render::{DrawOp, RecordingSurface};
    use crate::tcpip::tcp_from_bytes;
    use crate::tcpip::testutil::{ethernet_frame, ipv4_datagram, tcp_header};

    #[test]
    fn test_port_class() {
        assert_eq!(PortClass::of(Some(443)), PortClass::Web);
        assert_eq!(PortClass::of(Some(22)), PortClass::Ssh);
        assert_eq!(PortClass::of(Some(53)), PortClass::Dns);
        assert_eq!(PortClass::of(Some(9999)), PortClass::Other);
        assert_eq!(PortClass::of(None), PortClass::Other);
    }

    #[test]
    fn test_samples_bounded() {
        let mut pf = Packetfall::new(2);
        let frame = [0u8; 10];
        for sec in 1..=5 {
            pf.ingest_packet(&PacketInfo::new(Timeval::new(sec, 0), LinkType::Raw, &frame), None);
        }
        assert_eq!(pf.sample_count(), 2);
        assert_eq!(pf.dropped(), 3);
    }

    #[test]
    fn test_render_one_dot_per_sample_inside_area() {
        let frame = ethernet_frame(
            ETHERTYPE_IP,
            &ipv4_datagram([1, 1, 1, 1], [2, 2, 2, 2], 6, &tcp_header(5000, 443)),
        );
        let header = tcp_header(5000, 443);
        let seg = tcp_from_bytes(&header);
        let mut pf = Packetfall::default();
        pf.ingest_packet(
            &PacketInfo::new(Timeval::new(10, 0), LinkType::Ethernet, &frame),
            seg.as_ref(),
        );
        pf.ingest_packet(
            &PacketInfo::new(Timeval::new(20, 0), LinkType::Ethernet, &frame[..30]),
            None,
        );

        let bounds = Bounds::new(0.0, 0.0, 300.0, 100.0);
        let mut s = RecordingSurface::new();
        pf.render(&mut s, bounds);

        let dots: Vec<Bounds> = s
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillRect(b) => Some(*b),
                _ => None,
            })
            .collect();
        assert_eq!(dots.len(), 2);
        for d in dots {
            assert!(d.x >= 0.0 && d.right() <= bounds.right());
            assert!(d.y >= 0.0 && d.bottom() <= bounds.bottom());
        }
    }
}
