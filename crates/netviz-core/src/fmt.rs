//! Shared formatting helpers for report text.
//!
//! All pure formatting functions (no drawing, no layout) live here.

use std::collections::BTreeMap;

use chrono::{Local, TimeZone};
use num_format::{Locale, ToFormattedString};
use serde::Serialize;

use crate::packet::{ETHERTYPE_ARP, ETHERTYPE_IP, ETHERTYPE_IPV6, Timeval};

/// Unit suffixes for decimal byte scaling, indexed by power of 1000.
pub const SIZE_SUFFIXES: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Power of 1000 used to scale `byte_count`.
///
/// `floor(log(n) / log(1000))`; an index past the end of [`SIZE_SUFFIXES`]
/// falls back to 0 (unscaled bytes). Zero bytes also land on index 0.
pub fn size_unit_index(byte_count: f64) -> usize {
    let index = (byte_count.log10() / 3.0).floor();
    if !index.is_finite() || index < 0.0 || index as usize >= SIZE_SUFFIXES.len() {
        return 0;
    }
    index as usize
}

/// Format byte count with two decimals and a decimal unit: `"1.50 MB"`.
pub fn format_byte_size(byte_count: u64) -> String {
    let value = byte_count as f64;
    let index = size_unit_index(value);
    format!(
        "{:.2} {}",
        value / 1000f64.powi(index as i32),
        SIZE_SUFFIXES[index]
    )
}

/// Format integer with comma thousands separators: `"1,234,567"`.
pub fn comma_number_string(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}

/// Integer percentage of `count` in `total`, rounded down; 0 when `total` is 0.
pub fn top_n_percentage(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (count as u128 * 100 / total as u128) as u64
}

/// Share of each link-layer protocol in the classified packet total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TransportPercentages {
    pub ipv4: f64,
    pub ipv6: f64,
    pub arp: f64,
    /// Residual: everything that is not IPv4, IPv6 or ARP.
    pub other: f64,
}

impl TransportPercentages {
    /// All four shares are 0 when nothing was classified.
    pub fn from_counts(counts: &BTreeMap<u16, u64>) -> Self {
        let total: u64 = counts.values().sum();
        if total == 0 {
            return Self::default();
        }
        let get = |t: u16| counts.get(&t).copied().unwrap_or(0);
        let (ipv4, ipv6, arp) = (get(ETHERTYPE_IP), get(ETHERTYPE_IPV6), get(ETHERTYPE_ARP));
        let total = total as f64;

        Self {
            ipv4: ipv4 as f64 / total * 100.0,
            ipv6: ipv6 as f64 / total * 100.0,
            arp: arp as f64 / total * 100.0,
            other: (1.0 - (ipv4 + ipv6 + arp) as f64 / total) * 100.0,
        }
    }

    /// `"IPv4 70.00% IPv6 20.00% ARP 5.26% Other 0.00%"`
    pub fn to_line(&self) -> String {
        format!(
            "IPv4 {:.2}% IPv6 {:.2}% ARP {:.2}% Other {:.2}%",
            self.ipv4, self.ipv6, self.arp, self.other
        )
    }
}

/// Format capture timestamp as local `"YYYY-MM-DD HH:MM:SS"`.
pub fn format_timeval(tv: Timeval) -> String {
    Local
        .timestamp_opt(tv.sec, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "----".to_string())
}
