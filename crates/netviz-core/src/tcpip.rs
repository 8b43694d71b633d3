//! Network and transport layer decoders.
//!
//! Thin views over `etherparse` header slices. Every decoder returns `None`
//! on anything it cannot make sense of; callers treat that as "layer absent".

use etherparse::{IpNumber, Ipv4HeaderSlice, Ipv6HeaderSlice, TcpHeaderSlice};

const IPV6_HEADER_LEN: usize = 40;

/// Decoded IPv4 datagram.
#[derive(Debug, Clone, Copy)]
pub struct Ip4Dgram<'a> {
    pub src: [u8; 4],
    pub dst: [u8; 4],
    pub protocol: IpNumber,
    /// Payload, truncated to the header's total length.
    pub payload: &'a [u8],
}

/// Decoded IPv6 datagram.
#[derive(Debug, Clone, Copy)]
pub struct Ip6Dgram<'a> {
    pub src: [u8; 16],
    pub dst: [u8; 16],
    pub next_header: IpNumber,
    /// Payload, truncated to the payload length field.
    pub payload: &'a [u8],
}

/// Decoded TCP segment.
#[derive(Debug, Clone, Copy)]
pub struct TcpSeg<'a> {
    pub src_port: u16,
    pub dst_port: u16,
    /// Header length in bytes, options included.
    pub header_len: usize,
    pub payload: &'a [u8],
}

/// Decodes an IPv4 datagram.
pub fn ip4_from_bytes(data: &[u8]) -> Option<Ip4Dgram<'_>> {
    let header = Ipv4HeaderSlice::from_slice(data).ok()?;
    let header_len = header.slice().len();
    let end = (header.total_len() as usize).min(data.len());
    let payload = data.get(header_len..end).unwrap_or(&[]);

    Some(Ip4Dgram {
        src: header.source(),
        dst: header.destination(),
        protocol: header.protocol(),
        payload,
    })
}

/// Decodes an IPv6 datagram. Extension headers are left in the payload.
pub fn ip6_from_bytes(data: &[u8]) -> Option<Ip6Dgram<'_>> {
    let header = Ipv6HeaderSlice::from_slice(data).ok()?;
    let end = (IPV6_HEADER_LEN + header.payload_length() as usize).min(data.len());
    let payload = data.get(IPV6_HEADER_LEN..end).unwrap_or(&[]);

    Some(Ip6Dgram {
        src: header.source(),
        dst: header.destination(),
        next_header: header.next_header(),
        payload,
    })
}

/// Decodes a TCP segment.
pub fn tcp_from_bytes(data: &[u8]) -> Option<TcpSeg<'_>> {
    let header = TcpHeaderSlice::from_slice(data).ok()?;
    let header_len = header.slice().len();

    Some(TcpSeg {
        src_port: header.source_port(),
        dst_port: header.destination_port(),
        header_len,
        payload: &data[header_len..],
    })
}

#[cfg(test)]
pub(crate) mod testutil {
    //! Hand-assembled headers for tests across the crate.

    pub fn tcp_header(src_port: u16, dst_port: u16) -> Vec<u8> {
        let mut h = Vec::with_capacity(20);
        h.extend_from_slice(&src_port.to_be_bytes());
        h.extend_from_slice(&dst_port.to_be_bytes());
        h.extend_from_slice(&[0, 0, 0, 1]); // seq
        h.extend_from_slice(&[0, 0, 0, 0]); // ack
        h.push(5 << 4); // data offset
        h.push(0x18); // PSH|ACK
        h.extend_from_slice(&[0xff, 0xff]); // window
        h.extend_from_slice(&[0, 0, 0, 0]); // checksum, urgent
        h
    }

    pub fn ipv4_datagram(src: [u8; 4], dst: [u8; 4], protocol: u8, payload: &[u8]) -> Vec<u8> {
        let total = (20 + payload.len()) as u16;
        let mut d = vec![0x45, 0];
        d.extend_from_slice(&total.to_be_bytes());
        d.extend_from_slice(&[0, 0, 0x40, 0]); // id, DF
        d.push(64);
        d.push(protocol);
        d.extend_from_slice(&[0, 0]);
        d.extend_from_slice(&src);
        d.extend_from_slice(&dst);
        d.extend_from_slice(payload);
        d
    }

    pub fn ipv6_datagram(src: [u8; 16], dst: [u8; 16], next_header: u8, payload: &[u8]) -> Vec<u8> {
        let mut d = vec![0x60, 0, 0, 0];
        d.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        d.push(next_header);
        d.push(64);
        d.extend_from_slice(&src);
        d.extend_from_slice(&dst);
        d.extend_from_slice(payload);
        d
    }

    pub fn ethernet_frame(ether_type: u16, payload: &[u8]) -> Vec<u8> {
        let mut f = vec![0x02, 0, 0, 0, 0, 1, 0x02, 0, 0, 0, 0, 2];
        f.extend_from_slice(&ether_type.to_be_bytes());
        f.extend_from_slice(payload);
        f
    }
}
