//! Sub-aggregators fed by the report during ingestion.
//!
//! Each one owns its state, accepts packets (or the decoded layer it cares
//! about) and can later answer totals and top lists, and draw itself into a
//! panel.

mod address_histogram;
mod bandwidth;
mod count_histogram;
mod iptree;
mod packetfall;
mod port_histogram;

pub use address_histogram::AddressHistogram;
pub use bandwidth::{BandwidthHistogram, Bucket};
pub use count_histogram::{CountHistogram, CountPair};
pub use iptree::{DEFAULT_MAX_LEAVES, IpTree, prefix_label};
pub use packetfall::{Packetfall, PortClass};
pub use port_histogram::PortHistogram;

use serde::Serialize;

/// Which end of a packet a histogram looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Relationship {
    Source,
    Destination,
}
