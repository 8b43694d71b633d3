//! Capture file input.
//!
//! Reads classic pcap files record by record and hands each one to the caller
//! as a borrowed [`PacketInfo`]. Records are never buffered; the report only
//! needs a single forward pass.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use pcap_file::DataLink;
use pcap_file::pcap::PcapReader;
use tracing::debug;

use crate::packet::{LinkType, PacketInfo, Timeval};

/// Errors raised while reading a capture file.
#[derive(Debug)]
pub enum SourceError {
    /// The file could not be opened.
    Io(std::io::Error),
    /// The pcap header or a record is malformed.
    Pcap(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Io(e) => write!(f, "I/O error: {}", e),
            SourceError::Pcap(msg) => write!(f, "pcap error: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::Io(e)
    }
}

impl From<pcap_file::PcapError> for SourceError {
    fn from(e: pcap_file::PcapError) -> Self {
        SourceError::Pcap(e.to_string())
    }
}

/// Maps a pcap data link onto the framings the packet record understands.
fn link_type_of(datalink: DataLink) -> LinkType {
    match datalink {
        DataLink::ETHERNET => LinkType::Ethernet,
        DataLink::RAW => LinkType::Raw,
        DataLink::LINUX_SLL => LinkType::LinuxSll,
        DataLink::NULL => LinkType::Null,
        other => LinkType::Unsupported(u32::from(other)),
    }
}

/// A pcap file opened for a single forward pass.
pub struct PcapSource {
    reader: PcapReader<BufReader<File>>,
    link_type: LinkType,
}

impl PcapSource {
    /// Opens `path` and validates the global pcap header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let file = File::open(path.as_ref())?;
        let reader = PcapReader::new(BufReader::new(file))?;
        let link_type = link_type_of(reader.header().datalink);
        debug!(path = %path.as_ref().display(), ?link_type, "opened capture");
        Ok(Self { reader, link_type })
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    /// Visits every record in file order. Returns the number of records seen.
    ///
    /// A malformed record ends the pass with an error; records already
    /// visited stay visited.
    pub fn for_each_packet<F>(&mut self, mut f: F) -> Result<u64, SourceError>
    where
        F: FnMut(&PacketInfo<'_>),
    {
        let mut seen = 0u64;
        while let Some(record) = self.reader.next_packet() {
            let record = record?;
            let info = PacketInfo::new(
                Timeval::from_duration(record.timestamp),
                self.link_type,
                &record.data,
            );
            f(&info);
            seen += 1;
        }
        Ok(seen)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::packet::ETHERTYPE_IP;
    use crate::tcpip::testutil::{ethernet_frame, ipv4_datagram, tcp_header};

    /// Writes a little-endian, microsecond pcap with the given link type.
    fn write_pcap(linktype: u32, records: &[(u32, u32, Vec<u8>)]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let mut buf = Vec::new();
        buf.extend_from_slice(&0xa1b2c3d4u32.to_le_bytes());
        buf.extend_from_slice(&2u16.to_le_bytes());
        buf.extend_from_slice(&4u16.to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&65535u32.to_le_bytes());
        buf.extend_from_slice(&linktype.to_le_bytes());
        for (sec, usec, data) in records {
            buf.extend_from_slice(&sec.to_le_bytes());
            buf.extend_from_slice(&usec.to_le_bytes());
            buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
            buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
            buf.extend_from_slice(data);
        }
        file.write_all(&buf).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_reads_records_in_order() {
        let frame = ethernet_frame(
            ETHERTYPE_IP,
            &ipv4_datagram([10, 0, 0, 1], [10, 0, 0, 2], 6, &tcp_header(1000, 80)),
        );
        let file = write_pcap(
            1,
            &[
                (1_700_000_000, 10, frame.clone()),
                (1_700_000_001, 20, frame.clone()),
            ],
        );

        let mut source = PcapSource::open(file.path()).unwrap();
        assert_eq!(source.link_type(), LinkType::Ethernet);

        let mut stamps = Vec::new();
        let mut lens = Vec::new();
        let seen = source
            .for_each_packet(|p| {
                stamps.push(p.ts);
                lens.push(p.caplen);
                assert_eq!(p.ether_type(), Some(ETHERTYPE_IP));
            })
            .unwrap();

        assert_eq!(seen, 2);
        assert_eq!(
            stamps,
            vec![
                Timeval::new(1_700_000_000, 10),
                Timeval::new(1_700_000_001, 20)
            ]
        );
        assert_eq!(lens, vec![frame.len() as u32; 2]);
    }

    #[test]
    fn test_raw_link_type() {
        let file = write_pcap(101, &[]);
        let source = PcapSource::open(file.path()).unwrap();
        assert_eq!(source.link_type(), LinkType::Raw);
    }

    #[test]
    fn test_missing_file() {
        let result = PcapSource::open("/nonexistent/capture.pcap");
        assert!(matches!(result, Err(SourceError::Io(_))));
    }

    #[test]
    fn test_not_a_pcap() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a capture file").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            PcapSource::open(file.path()),
            Err(SourceError::Pcap(_))
        ));
    }
}
