#![cfg_attr(not(feature = "user"), no_std)]
mod jhash;
mod record;

pub use jhash::{jhash, HashError, JHASH_INITVAL, MAX_KEY_LEN};
pub use record::{
    HashKey, Padding, PortOrder, RuleBytes, RuleLayout, RuleRecord, TableBytes, TableRecord,
    HASH_KEY_LEN, RULE_RECORD_LEN, TABLE_RECORD_LEN,
};

#[cfg(feature = "user")]
pub use record::DecodeError;

use strum_macros::{Display, EnumString};

// These are also defined in aya-bpf::bindings (xdp_action)
// We redefine them here as not to depend on aya-bpf in this crate
const XDP_DROP: u8 = 1;
const XDP_PASS: u8 = 2;

const IPPROTO_ICMP: u8 = 1;
const IPPROTO_TCP: u8 = 6;
const IPPROTO_UDP: u8 = 17;

/// Verdict stored in a rule record, returned by the XDP program on match.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Display)]
#[cfg_attr(feature = "user", derive(num_derive::FromPrimitive))]
#[strum(ascii_case_insensitive)]
pub enum Action {
    /// Drop matching packets.
    #[strum(serialize = "deny")]
    Deny = XDP_DROP,
    /// Let matching packets through.
    #[strum(serialize = "allow")]
    Allow = XDP_PASS,
}

/// IP protocols a rule can match on.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Display)]
#[cfg_attr(feature = "user", derive(num_derive::FromPrimitive))]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Protocol {
    /// ICMP carries no ports, port ranges are ignored.
    ICMP = IPPROTO_ICMP,
    TCP = IPPROTO_TCP,
    UDP = IPPROTO_UDP,
}

impl Protocol {
    pub fn has_ports(&self) -> bool {
        !matches!(self, Protocol::ICMP)
    }
}
