
use rand::RngCore;
use xdp_acl_common::TableRecord;

use crate::{cidr::mask_octets, Error, Result, Rule};

/// Random ids drawn for a new table before giving up on finding an unused one.
pub const MAX_ID_ATTEMPTS: usize = 32;

/// A group of rules sharing a hash seed.
///
/// The XDP program masks the packet addresses with the table's masks before hashing,
/// so a rule may only be placed in a table at most as specific as the rule itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Table {
    id: u32,
    smask_bits: u8,
    dmask_bits: u8,
}

impl Table {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn smask_bits(&self) -> u8 {
        self.smask_bits
    }

    pub fn dmask_bits(&self) -> u8 {
        self.dmask_bits
    }

    // xbits <= ybits means ybits is a subset of xbits
    fn accepts(&self, smask_bits: u8, dmask_bits: u8) -> bool {
        self.smask_bits <= smask_bits && self.dmask_bits <= dmask_bits
    }

    pub fn to_record(&self) -> TableRecord {
        TableRecord {
            id: self.id,
            smask: mask_octets(self.smask_bits),
            dmask: mask_octets(self.dmask_bits),
        }
    }
}

/// Assigns rules to tables, creating tables with random ids as needed.
///
/// Tables are matched first-fit in creation order: a rule goes to the first table
/// whose masks are no more specific than its own, even if a closer one exists.
#[derive(Debug)]
pub struct Classifier<R> {
    rng: R,
    tables: Vec<Table>,
}

impl<R: RngCore> Classifier<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            tables: Vec::new(),
        }
    }

    /// Tables in creation order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Sets the table id and hash of `rule`.
    pub fn classify(&mut self, rule: &mut Rule) -> Result<()> {
        let smask_bits = rule.source().prefix();
        let dmask_bits = rule.dest().prefix();
        let id = match self
            .tables
            .iter()
            .find(|table| table.accepts(smask_bits, dmask_bits))
        {
            Some(table) => table.id,
            None => self.new_table(smask_bits, dmask_bits)?.id,
        };
        rule.set_table(id)
    }

    /// Tables sorted by mask specificity, least specific first.
    pub fn into_tables(self) -> Vec<Table> {
        let mut tables = self.tables;
        tables.sort_by_key(|table| (table.smask_bits, table.dmask_bits));
        tables
    }

    fn new_table(&mut self, smask_bits: u8, dmask_bits: u8) -> Result<Table> {
        let table = Table {
            id: self.unused_id()?,
            smask_bits,
            dmask_bits,
        };
        tracing::debug!(id = table.id, smask_bits, dmask_bits, "new acl table");
        self.tables.push(table);
        Ok(table)
    }

    fn unused_id(&mut self) -> Result<u32> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let mut id = [0u8; 4];
            self.rng.try_fill_bytes(&mut id)?;
            let id = u32::from_le_bytes(id);
            if self.tables.iter().all(|table| table.id != id) {
                return Ok(id);
            }
            tracing::debug!(id, "table id already in use");
        }
        Err(Error::TableIdExhausted(MAX_ID_ATTEMPTS))
    }
}

/// Classifies `rules` in order, see [`Classifier`].
pub fn classify<R: RngCore>(rules: &mut [Rule], rng: R) -> Result<Vec<Table>> {
    let mut classifier = Classifier::new(rng);
    for rule in rules.iter_mut() {
        classifier.classify(rule)?;
    }
    Ok(classifier.into_tables())
}
