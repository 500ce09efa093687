//! Private IPv4 address generation.
//!
//! Used to fill client-origin headers on upstream requests with an address
//! that looks like it sits behind a home or office NAT. An address is made by
//! picking one of the RFC 1918 blocks uniformly, then drawing each octet
//! uniformly between that block's start and end octet at the same position.
//! Octets are independent, so edge addresses are as likely as any other.

use std::net::Ipv4Addr;

use rand::Rng;

/// Inclusive octet-wise address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivateIpRange {
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
}

impl PrivateIpRange {
    pub const fn new(start: Ipv4Addr, end: Ipv4Addr) -> Self {
        Self { start, end }
    }

    /// True when every octet of `addr` lies within this range's bounds.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let (start, end) = (self.start.octets(), self.end.octets());
        addr.octets()
            .iter()
            .enumerate()
            .all(|(i, octet)| (start[i]..=end[i]).contains(octet))
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Ipv4Addr {
        let (start, end) = (self.start.octets(), self.end.octets());
        let mut octets = [0u8; 4];
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = rng.gen_range(start[i]..=end[i]);
        }
        Ipv4Addr::from(octets)
    }
}

/// 10/8, 172.16/12 and 192.168/16.
pub static PRIVATE_IP_RANGES: [PrivateIpRange; 3] = [
    PrivateIpRange::new(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(10, 255, 255, 255)),
    PrivateIpRange::new(Ipv4Addr::new(172, 16, 0, 0), Ipv4Addr::new(172, 31, 255, 255)),
    PrivateIpRange::new(Ipv4Addr::new(192, 168, 0, 0), Ipv4Addr::new(192, 168, 255, 255)),
];

/// Range from [`PRIVATE_IP_RANGES`] that contains `addr`, if any.
pub fn range_of(addr: Ipv4Addr) -> Option<&'static PrivateIpRange> {
    PRIVATE_IP_RANGES.iter().find(|range| range.contains(addr))
}

pub fn generate_private_ip() -> Ipv4Addr {
    generate_private_ip_with(&mut rand::thread_rng())
}

pub fn generate_private_ip_with<R: Rng>(rng: &mut R) -> Ipv4Addr {
    let range = &PRIVATE_IP_RANGES[rng.gen_range(0..PRIVATE_IP_RANGES.len())];
    range.sample(rng)
}

/// Dotted-quad form of [`generate_private_ip`].
pub fn get_ip() -> String {
    generate_private_ip().to_string()
}
