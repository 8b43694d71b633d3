//! TCP port frequency histogram.

use super::count_histogram::{CountHistogram, CountPair};
use super::Relationship;
use crate::render::plot::PlotStyle;
use crate::render::{Bounds, Rgb, Surface};
use crate::tcpip::TcpSeg;

/// Counts segments per source or destination port.
#[derive(Debug, Clone)]
pub struct PortHistogram {
    relationship: Relationship,
    parent: CountHistogram,
}

impl PortHistogram {
    pub fn new(relationship: Relationship, title: &str) -> Self {
        let mut parent = CountHistogram::new(PlotStyle {
            pad_left_factor: 0.2,
            ..PlotStyle::titled(title)
        });
        parent.bar_color = match relationship {
            Relationship::Source => Rgb::GREEN,
            Relationship::Destination => Rgb::ORANGE,
        };
        Self {
            relationship,
            parent,
        }
    }

    pub fn ingest_segment(&mut self, tcp: &TcpSeg<'_>) {
        let port = match self.relationship {
            Relationship::Source => tcp.src_port,
            Relationship::Destination => tcp.dst_port,
        };
        self.parent.increment(port.to_string(), 1);
    }

    pub fn get_count_sum(&self) -> u64 {
        self.parent.get_count_sum()
    }

    pub fn get_top_list(&self) -> Vec<CountPair> {
        self.parent.get_top_list()
    }

    pub fn render(&self, surface: &mut dyn Surface, bounds: Bounds) {
        self.parent.render(surface, bounds);
    }
}
