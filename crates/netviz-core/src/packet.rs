//! Captured packet record.
//!
//! A `PacketInfo` borrows the raw frame from the capture source and knows how
//! to find the link-layer protocol identifier and the network-layer bytes for
//! the handful of link types a capture file usually carries.

use std::time::Duration;

use serde::Serialize;

/// Ether type for IPv4.
pub const ETHERTYPE_IP: u16 = 0x0800;
/// Ether type for ARP.
pub const ETHERTYPE_ARP: u16 = 0x0806;
/// Ether type for IPv6.
pub const ETHERTYPE_IPV6: u16 = 0x86DD;

const ETHERNET_HEADER_LEN: usize = 14;
const LINUX_SLL_HEADER_LEN: usize = 16;
const NULL_HEADER_LEN: usize = 4;

/// Capture timestamp split into seconds and microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Timeval {
    pub sec: i64,
    pub usec: i64,
}

impl Timeval {
    pub fn new(sec: i64, usec: i64) -> Self {
        Self { sec, usec }
    }

    /// Converts a capture offset from the Unix epoch.
    pub fn from_duration(d: Duration) -> Self {
        Self {
            sec: d.as_secs() as i64,
            usec: d.subsec_micros() as i64,
        }
    }

    /// A zero seconds field marks a timestamp that was never set.
    pub fn is_unset(&self) -> bool {
        self.sec == 0
    }

    /// Seconds as a float, for placing samples on a time axis.
    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.usec as f64 / 1_000_000.0
    }
}

/// Link-layer framing of the capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    /// Ethernet II.
    Ethernet,
    /// Bare IP datagrams, no link header.
    Raw,
    /// Linux "cooked" capture (SLL).
    LinuxSll,
    /// BSD loopback: 4-byte host-order address family.
    Null,
    /// Anything else, carrying the DLT number.
    Unsupported(u32),
}

/// One captured packet as handed to the report.
#[derive(Debug, Clone, Copy)]
pub struct PacketInfo<'a> {
    pub ts: Timeval,
    /// Number of bytes actually captured.
    pub caplen: u32,
    pub link_type: LinkType,
    pub frame: &'a [u8],
}

impl<'a> PacketInfo<'a> {
    pub fn new(ts: Timeval, link_type: LinkType, frame: &'a [u8]) -> Self {
        Self {
            ts,
            caplen: frame.len() as u32,
            link_type,
            frame,
        }
    }

    /// Link-layer protocol identifier, or `None` when the frame is too short
    /// or the framing carries no recognizable type.
    pub fn ether_type(&self) -> Option<u16> {
        match self.link_type {
            LinkType::Ethernet => {
                etherparse::Ethernet2HeaderSlice::from_slice(self.frame)
                    .ok()
                    .map(|h| h.ether_type().0)
            }
            LinkType::LinuxSll => {
                if self.frame.len() < LINUX_SLL_HEADER_LEN {
                    return None;
                }
                Some(u16::from_be_bytes([self.frame[14], self.frame[15]]))
            }
            LinkType::Raw => match self.frame.first().map(|b| b >> 4) {
                Some(4) => Some(ETHERTYPE_IP),
                Some(6) => Some(ETHERTYPE_IPV6),
                _ => None,
            },
            LinkType::Null => {
                if self.frame.len() < NULL_HEADER_LEN {
                    return None;
                }
                // Family is written in the capturing host's byte order.
                let le = u32::from_le_bytes([
                    self.frame[0],
                    self.frame[1],
                    self.frame[2],
                    self.frame[3],
                ]);
                let be = u32::from_be_bytes([
                    self.frame[0],
                    self.frame[1],
                    self.frame[2],
                    self.frame[3],
                ]);
                let family = if le < 0x100 { le } else { be };
                match family {
                    2 => Some(ETHERTYPE_IP),
                    24 | 28 | 30 => Some(ETHERTYPE_IPV6),
                    _ => None,
                }
            }
            LinkType::Unsupported(_) => None,
        }
    }

    /// Bytes following the link-layer header.
    pub fn ip_data(&self) -> &'a [u8] {
        let offset = match self.link_type {
            LinkType::Ethernet => ETHERNET_HEADER_LEN,
            LinkType::LinuxSll => LINUX_SLL_HEADER_LEN,
            LinkType::Null => NULL_HEADER_LEN,
            LinkType::Raw => 0,
            LinkType::Unsupported(_) => return &[],
        };
        self.frame.get(offset..).unwrap_or(&[])
    }
}
