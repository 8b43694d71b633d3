//! netviz-core — packet capture statistics and one-page report rendering.
//!
//! Provides:
//! - `packet` — captured packet record and link-layer classification
//! - `tcpip` — IPv4/IPv6/TCP decoders
//! - `source` — pcap file reader feeding packet records
//! - `aggregate` — sub-aggregators (bandwidth, ports, address tree, packetfall)
//! - `fmt` — shared formatting helpers (byte sizes, grouped counts, percentages)
//! - `render` — drawing surface abstraction and backends
//! - `report` — the one-page report aggregator and its layout engine
//!
//! With `pdf` feature (default):
//! - `render::pdf` — PDF drawing backend

pub mod aggregate;
pub mod fmt;
pub mod packet;
pub mod render;
pub mod report;
pub mod source;
pub mod tcpip;

pub use report::{OnePageReport, ReportConfig, ReportSummary};
