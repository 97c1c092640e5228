
use rand::RngCore;
use xdp_acl_common::{RuleBytes, RuleLayout};

use crate::{
    classifier::classify, AclConfig, BucketSet, BucketStore, Error, Result, Rule, RuleDesc, Table,
    TableStore,
};

/// A compiled rule set, ready to be written into the XDP maps.
///
/// Building an [Acl] never touches the maps, so a failed reload leaves the running
/// rule set alone. See example at the [crate-level doc](crate#example).
#[derive(Debug, Clone)]
pub struct Acl {
    rules: Vec<Rule>,
    tables: Vec<Table>,
}

impl Acl {
    /// Parses and classifies `descs` in order, `rng` draws the table ids.
    ///
    /// Fails on the first malformed description, reporting its index.
    pub fn new(descs: &[RuleDesc], rng: impl RngCore) -> Result<Acl> {
        let mut rules = descs
            .iter()
            .enumerate()
            .map(|(index, desc)| {
                Rule::try_from(desc).map_err(|source| Error::Parse { index, source })
            })
            .collect::<Result<Vec<_>>>()?;
        let tables = classify(&mut rules, rng)?;
        tracing::info!(rules = rules.len(), tables = tables.len(), "acl built");
        Ok(Self { rules, tables })
    }

    /// Rules in input order, classified.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Tables sorted by mask specificity, in the order they are stored.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn buckets(&self, count: u32) -> Result<BucketSet<'_>> {
        BucketSet::assign(&self.rules, count)
    }

    /// Writes every table, then every non-empty bucket once.
    ///
    /// The bucket count is checked before anything is written. A store error aborts
    /// the install, already written entries are left as they are.
    pub fn install(
        &self,
        config: &AclConfig,
        tables: &mut impl TableStore,
        buckets: &mut impl BucketStore,
    ) -> Result<()> {
        config.validate()?;
        let bucket_set = self.buckets(config.bucket_count)?;

        for (index, table) in (0u32..).zip(&self.tables) {
            tables
                .insert(index, table.to_record().encode())
                .map_err(|source| Error::TableStore { index, source })?;
        }

        for (bucket, rules) in bucket_set.iter() {
            let records = encode_bucket(rules, &config.layout);
            buckets
                .insert(bucket, &records)
                .map_err(|source| Error::BucketStore { bucket, source })?;
            tracing::debug!(bucket, rules = records.len(), "stored rule bucket");
        }

        tracing::info!(
            tables = self.tables.len(),
            buckets = bucket_set.len(),
            "acl installed"
        );
        Ok(())
    }
}

fn encode_bucket(rules: &[&Rule], layout: &RuleLayout) -> Vec<RuleBytes> {
    rules
        .iter()
        .map(|rule| rule.to_record().encode(layout))
        .collect()
}
