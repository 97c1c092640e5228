mod user;

#[cfg(feature = "user")]
pub use user::DecodeError;

use crate::{jhash, Action, HashError, Protocol};

/// sizeof(struct acl_rule_hash_key), the struct is packed.
pub const HASH_KEY_LEN: usize = 9;
/// sizeof(struct acl_rule), both layouts in [`Padding`] agree on it.
pub const RULE_RECORD_LEN: usize = 36;
/// sizeof(struct acl_rule_table)
pub const TABLE_RECORD_LEN: usize = 12;

pub type RuleBytes = [u8; RULE_RECORD_LEN];
pub type TableBytes = [u8; TABLE_RECORD_LEN];

// table_id + hash + protocol + 4 x [u8; 4]
const MASKS_END: usize = 25;

/// Key hashed by both the control plane and the XDP program to pick a bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashKey {
    pub saddr: [u8; 4],
    pub daddr: [u8; 4],
    pub protocol: u8,
}

impl HashKey {
    pub fn to_bytes(&self) -> [u8; HASH_KEY_LEN] {
        let mut buf = [0u8; HASH_KEY_LEN];
        let mut writer = Writer::new(&mut buf);
        writer.put(&self.saddr);
        writer.put(&self.daddr);
        writer.put(&[self.protocol]);
        buf
    }

    pub fn hash(&self, seed: u32) -> Result<u32, HashError> {
        jhash(&self.to_bytes(), seed)
    }
}

/// Where the explicit padding bytes of a rule record go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "user",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Padding {
    /// `__attribute__((packed))` kernel struct: ports right after the masks,
    /// two trailing pad bytes.
    #[default]
    Packed,
    /// Naturally aligned struct: one pad byte before the `u16` ports, one after
    /// the action.
    Aligned,
}

/// Byte order of the port fields of a rule record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "user",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum PortOrder {
    /// Big-endian, compared as-is against `__be16` ports in packet headers.
    #[default]
    Network,
    /// Host byte order.
    Native,
}

/// Layout of a rule record as expected by the program reading the maps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "user",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RuleLayout {
    pub padding: Padding,
    pub port_order: PortOrder,
}

impl RuleLayout {
    pub const fn new(padding: Padding, port_order: PortOrder) -> Self {
        Self {
            padding,
            port_order,
        }
    }

    /// Offset of `sport_start`, the first port field.
    pub const fn ports_offset(&self) -> usize {
        match self.padding {
            Padding::Packed => MASKS_END,
            Padding::Aligned => MASKS_END + 1,
        }
    }

    pub const fn action_offset(&self) -> usize {
        self.ports_offset() + 4 * core::mem::size_of::<u16>()
    }

    fn port_bytes(&self, port: u16) -> [u8; 2] {
        match self.port_order {
            PortOrder::Network => port.to_be_bytes(),
            PortOrder::Native => port.to_ne_bytes(),
        }
    }

    #[cfg(feature = "user")]
    fn port_from_bytes(&self, bytes: [u8; 2]) -> u16 {
        match self.port_order {
            PortOrder::Network => u16::from_be_bytes(bytes),
            PortOrder::Native => u16::from_ne_bytes(bytes),
        }
    }
}

/// One entry of a rule bucket, mirrors `struct acl_rule`.
///
/// The priority used to order a bucket is not part of the record, entries are
/// written in priority order instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleRecord {
    pub table_id: u32,
    pub hash: u32,
    pub protocol: Protocol,
    pub saddr: [u8; 4],
    pub smask: [u8; 4],
    pub daddr: [u8; 4],
    pub dmask: [u8; 4],
    pub sport_start: u16,
    pub sport_end: u16,
    pub dport_start: u16,
    pub dport_end: u16,
    pub action: Action,
}

impl RuleRecord {
    pub fn encode(&self, layout: &RuleLayout) -> RuleBytes {
        let mut buf = [0u8; RULE_RECORD_LEN];
        let mut writer = Writer::new(&mut buf);
        writer.put(&self.table_id.to_ne_bytes());
        writer.put(&self.hash.to_ne_bytes());
        writer.put(&[self.protocol as u8]);
        writer.put(&self.saddr);
        writer.put(&self.smask);
        writer.put(&self.daddr);
        writer.put(&self.dmask);
        if layout.padding == Padding::Aligned {
            writer.pad(1);
        }
        for port in [
            self.sport_start,
            self.sport_end,
            self.dport_start,
            self.dport_end,
        ] {
            writer.put(&layout.port_bytes(port));
        }
        writer.put(&[self.action as u8]);
        writer.pad_to_end();
        buf
    }
}

/// Mirrors `struct acl_rule_table`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableRecord {
    pub id: u32,
    pub smask: [u8; 4],
    pub dmask: [u8; 4],
}

impl TableRecord {
    pub fn encode(&self) -> TableBytes {
        let mut buf = [0u8; TABLE_RECORD_LEN];
        let mut writer = Writer::new(&mut buf);
        writer.put(&self.id.to_ne_bytes());
        writer.put(&self.smask);
        writer.put(&self.dmask);
        buf
    }
}

struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buf[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    fn pad(&mut self, len: usize) {
        let end = self.pos + len;
        self.buf[self.pos..end].fill(0);
        self.pos = end;
    }

    fn pad_to_end(&mut self) {
        self.pad(self.buf.len() - self.pos);
    }
}
