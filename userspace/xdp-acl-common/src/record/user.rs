#![cfg(feature = "user")]

use crate::record::{
    Padding, RuleBytes, RuleLayout, RuleRecord, TableBytes, TableRecord, MASKS_END,
};
use crate::{Action, Protocol};
use num_traits::FromPrimitive;
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown protocol number {0}")]
    UnknownProtocol(u8),
    #[error("unknown action {0}")]
    UnknownAction(u8),
}

impl RuleRecord {
    /// Reads back a record written by [`encode`](Self::encode) with the same layout.
    pub fn decode(bytes: &RuleBytes, layout: &RuleLayout) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);
        let table_id = u32::from_ne_bytes(reader.take());
        let hash = u32::from_ne_bytes(reader.take());
        let protocol = reader.byte();
        let protocol =
            Protocol::from_u8(protocol).ok_or(DecodeError::UnknownProtocol(protocol))?;
        let saddr = reader.take();
        let smask = reader.take();
        let daddr = reader.take();
        let dmask = reader.take();
        debug_assert_eq!(reader.pos, MASKS_END);
        if layout.padding == Padding::Aligned {
            reader.skip(1);
        }
        let sport_start = layout.port_from_bytes(reader.take());
        let sport_end = layout.port_from_bytes(reader.take());
        let dport_start = layout.port_from_bytes(reader.take());
        let dport_end = layout.port_from_bytes(reader.take());
        let action = reader.byte();
        let action = Action::from_u8(action).ok_or(DecodeError::UnknownAction(action))?;

        Ok(Self {
            table_id,
            hash,
            protocol,
            saddr,
            smask,
            daddr,
            dmask,
            sport_start,
            sport_end,
            dport_start,
            dport_end,
            action,
        })
    }
}

impl TableRecord {
    pub fn decode(bytes: &TableBytes) -> Self {
        let mut reader = Reader::new(bytes);
        Self {
            id: u32::from_ne_bytes(reader.take()),
            smask: reader.take(),
            dmask: reader.take(),
        }
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    // Callers only read fixed-size records, every offset is in bounds.
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn byte(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn skip(&mut self, len: usize) {
        self.pos += len;
    }
}
