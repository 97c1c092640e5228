mod test;

use std::collections::BTreeMap;

use crate::{Error, Result, Rule};

/// Classified rules grouped by `hash & (count - 1)`.
///
/// Within a bucket rules are ordered by descending priority, which is the order the
/// XDP program scans them in. Only non-empty buckets are kept.
#[derive(Debug)]
pub struct BucketSet<'a> {
    count: u32,
    buckets: BTreeMap<u32, Vec<&'a Rule>>,
}

impl<'a> BucketSet<'a> {
    pub fn assign(rules: &'a [Rule], count: u32) -> Result<Self> {
        if !count.is_power_of_two() {
            return Err(Error::InvalidBucketCount(count));
        }

        let mut buckets: BTreeMap<u32, Vec<&Rule>> = BTreeMap::new();
        for rule in rules {
            buckets
                .entry(bucket_index(rule.hash(), count))
                .or_default()
                .push(rule);
        }
        // Equal priorities keep no particular order
        for bucket in buckets.values_mut() {
            bucket.sort_unstable_by(|a, b| b.priority().cmp(&a.priority()));
        }

        Ok(Self { count, buckets })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn get(&self, bucket: u32) -> Option<&[&'a Rule]> {
        self.buckets.get(&bucket).map(Vec::as_slice)
    }

    /// Non-empty buckets in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[&'a Rule])> {
        self.buckets
            .iter()
            .map(|(bucket, rules)| (*bucket, rules.as_slice()))
    }

    /// Number of non-empty buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// `count` must be a power of two.
pub(crate) fn bucket_index(hash: u32, count: u32) -> u32 {
    hash & (count - 1)
}
