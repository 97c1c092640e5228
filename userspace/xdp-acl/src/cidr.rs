use std::{net::Ipv4Addr, str::FromStr};

use ipnet::{AddrParseError, Ipv4Net};

/// IPv4 network of a rule, the address is always normalized to its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    ip: Ipv4Addr,
    prefix: u8,
}

impl Cidr {
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    pub fn addr(&self) -> [u8; 4] {
        self.ip.octets()
    }

    pub fn mask(&self) -> [u8; 4] {
        mask_octets(self.prefix)
    }
}

impl From<Ipv4Net> for Cidr {
    fn from(net: Ipv4Net) -> Self {
        Self {
            ip: net.network(),
            prefix: net.prefix_len(),
        }
    }
}

impl FromStr for Cidr {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Ipv4Net>().map(Self::from)
    }
}

fn mask_prefix(prefix: u8) -> u32 {
    !(u32::MAX.checked_shr(prefix.into()).unwrap_or_default())
}

/// Canonical network-order mask with `prefix` leading ones.
pub(crate) fn mask_octets(prefix: u8) -> [u8; 4] {
    mask_prefix(prefix).to_be_bytes()
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case("10.0.0.0/24", [10, 0, 0, 0], [255, 255, 255, 0])]
    #[test_case("10.1.2.3/16", [10, 1, 0, 0], [255, 255, 0, 0])]
    #[test_case("192.168.1.77/32", [192, 168, 1, 77], [255, 255, 255, 255])]
    #[test_case("172.16.5.4/0", [0, 0, 0, 0], [0, 0, 0, 0])]
    #[test_case("10.255.0.0/9", [10, 128, 0, 0], [255, 128, 0, 0])]
    fn parse_normalizes(s: &str, addr: [u8; 4], mask: [u8; 4]) {
        let cidr: Cidr = s.parse().unwrap();
        assert_eq!(cidr.addr(), addr);
        assert_eq!(cidr.mask(), mask);
    }

    #[test_case("10.0.0.0")]
    #[test_case("10.0.0.0/33")]
    #[test_case("10.0.0/24")]
    #[test_case("fafa::/64")]
    #[test_case("")]
    fn parse_rejects(s: &str) {
        assert!(s.parse::<Cidr>().is_err());
    }

    #[test]
    fn mask_has_prefix_leading_ones() {
        for prefix in 0..=32u8 {
            let mask = u32::from_be_bytes(mask_octets(prefix));
            assert_eq!(mask.leading_ones(), u32::from(prefix));
            assert_eq!(mask.count_ones(), u32::from(prefix));
        }
    }
}
