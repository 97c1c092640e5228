
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use xdp_acl_common::{Action, HashKey, Protocol, RuleRecord};

use crate::{cidr::Cidr, Field, ParseError, Result};

const ALL_PORTS: RangeInclusive<u16> = 0..=u16::MAX;
const NO_PORTS: RangeInclusive<u16> = 0..=0;

/// A rule description with 5-tuple, action and priority, as found in the rules file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDesc {
    /// Source CIDR like "192.168.0.0/24".
    pub saddr: String,
    /// Destination CIDR like "192.168.0.0/24".
    pub daddr: String,
    /// Source port like "80" or "80-90", or "*"/"all" for all ports.
    /// Ignored, and can be left out, for ICMP.
    #[serde(default)]
    pub sport: String,
    /// Destination port, same format as `sport`.
    #[serde(default)]
    pub dport: String,
    /// "tcp", "udp" or "icmp", case insensitive.
    pub proto: String,
    /// "allow" or "deny", case insensitive.
    pub action: String,
    /// The higher the value, the higher the priority.
    pub priority: u64,
}

/// A validated rule.
///
/// `table_id` and `hash` are 0 until the rule is classified, see [`Classifier`](crate::Classifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub(crate) table_id: u32,
    pub(crate) hash: u32,
    pub(crate) protocol: Protocol,
    pub(crate) source: Cidr,
    pub(crate) dest: Cidr,
    pub(crate) sports: RangeInclusive<u16>,
    pub(crate) dports: RangeInclusive<u16>,
    pub(crate) action: Action,
    pub(crate) priority: u64,
}

impl TryFrom<&RuleDesc> for Rule {
    type Error = ParseError;

    fn try_from(desc: &RuleDesc) -> std::result::Result<Self, Self::Error> {
        let source = parse_cidr(&desc.saddr, Field::Saddr)?;
        let dest = parse_cidr(&desc.daddr, Field::Daddr)?;
        let protocol: Protocol = desc
            .proto
            .parse()
            .map_err(|_| ParseError::InvalidProtocol(desc.proto.clone()))?;

        let (sports, dports) = if protocol.has_ports() {
            (
                parse_ports(&desc.sport, Field::Sport)?,
                parse_ports(&desc.dport, Field::Dport)?,
            )
        } else {
            (NO_PORTS, NO_PORTS)
        };
        for (field, ports) in [(Field::Sport, &sports), (Field::Dport, &dports)] {
            if ports.is_empty() {
                tracing::warn!(%field, ?ports, "port range is reversed, it will never match");
            }
        }

        let action: Action = desc
            .action
            .parse()
            .map_err(|_| ParseError::InvalidAction(desc.action.clone()))?;

        Ok(Self {
            table_id: 0,
            hash: 0,
            protocol,
            source,
            dest,
            sports,
            dports,
            action,
            priority: desc.priority,
        })
    }
}

impl Rule {
    pub fn table_id(&self) -> u32 {
        self.table_id
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn source(&self) -> &Cidr {
        &self.source
    }

    pub fn dest(&self) -> &Cidr {
        &self.dest
    }

    /// Source port range, `0..=0` for ICMP.
    pub fn sports(&self) -> &RangeInclusive<u16> {
        &self.sports
    }

    /// Destination port range, `0..=0` for ICMP.
    pub fn dports(&self) -> &RangeInclusive<u16> {
        &self.dports
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn priority(&self) -> u64 {
        self.priority
    }

    pub(crate) fn hash_key(&self) -> HashKey {
        HashKey {
            saddr: self.source.addr(),
            daddr: self.dest.addr(),
            protocol: self.protocol as u8,
        }
    }

    /// Places the rule in the table `table_id`, which also seeds its hash.
    pub(crate) fn set_table(&mut self, table_id: u32) -> Result<()> {
        self.table_id = table_id;
        self.hash = self.hash_key().hash(table_id)?;
        Ok(())
    }

    pub fn to_record(&self) -> RuleRecord {
        RuleRecord {
            table_id: self.table_id,
            hash: self.hash,
            protocol: self.protocol,
            saddr: self.source.addr(),
            smask: self.source.mask(),
            daddr: self.dest.addr(),
            dmask: self.dest.mask(),
            sport_start: *self.sports.start(),
            sport_end: *self.sports.end(),
            dport_start: *self.dports.start(),
            dport_end: *self.dports.end(),
            action: self.action,
        }
    }
}

fn parse_cidr(s: &str, field: Field) -> std::result::Result<Cidr, ParseError> {
    s.parse().map_err(|_| ParseError::InvalidCidr {
        field,
        value: s.to_string(),
    })
}

// No check that start <= end, a reversed range is kept as written.
fn parse_ports(s: &str, field: Field) -> std::result::Result<RangeInclusive<u16>, ParseError> {
    let invalid = || ParseError::InvalidPort {
        field,
        value: s.to_string(),
    };
    let port = |p: &str| p.parse::<u16>().map_err(|_| invalid());

    let ports = s.to_ascii_lowercase();
    if ports == "*" || ports == "all" {
        return Ok(ALL_PORTS);
    }
    match ports.split_once('-') {
        Some((start, end)) => Ok(port(start)?..=port(end)?),
        None => {
            let port = port(&ports)?;
            Ok(port..=port)
        }
    }
}
