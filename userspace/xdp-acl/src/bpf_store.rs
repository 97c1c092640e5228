use std::collections::BTreeMap;

use aya::maps::{HashMap, MapData};
use xdp_acl_common::{RuleBytes, TableBytes, TABLE_RECORD_LEN};

use crate::StoreError;

/// Sink for encoded table records, keyed by the table's position in sorted order.
pub trait TableStore {
    fn insert(&mut self, index: u32, record: TableBytes) -> Result<(), StoreError>;
}

/// Sink for the encoded rules of one bucket, in lookup order.
///
/// On the kernel side this is an inner array map placed at `bucket` in
/// [`ACL_RULE_BUCKETS`](crate::ACL_RULE_BUCKETS).
pub trait BucketStore {
    fn insert(&mut self, bucket: u32, records: &[RuleBytes]) -> Result<(), StoreError>;
}

impl<T: AsMut<MapData> + AsRef<MapData>> TableStore for HashMap<T, u32, [u8; TABLE_RECORD_LEN]> {
    fn insert(&mut self, index: u32, record: TableBytes) -> Result<(), StoreError> {
        HashMap::insert(self, &index, record, 0)?;
        Ok(())
    }
}

/// In-memory store, mostly useful for tests and dry runs.
#[derive(Debug, Clone)]
pub struct MemoryStore<V> {
    entries: BTreeMap<u32, V>,
    max_entries: Option<usize>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            max_entries: None,
        }
    }
}

impl<V> MemoryStore<V> {
    /// Store that fails like a full map once it holds `max_entries` keys.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            max_entries: Some(max_entries),
        }
    }

    pub fn get(&self, key: u32) -> Option<&V> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &V)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    fn store(&mut self, key: u32, value: V) -> Result<(), StoreError> {
        match self.max_entries {
            Some(max) if self.entries.len() >= max && !self.entries.contains_key(&key) => {
                Err(StoreError::Exhausted(max))
            }
            _ => {
                self.entries.insert(key, value);
                Ok(())
            }
        }
    }
}

impl TableStore for MemoryStore<TableBytes> {
    fn insert(&mut self, index: u32, record: TableBytes) -> Result<(), StoreError> {
        self.store(index, record)
    }
}

impl BucketStore for MemoryStore<Vec<RuleBytes>> {
    fn insert(&mut self, bucket: u32, records: &[RuleBytes]) -> Result<(), StoreError> {
        self.store(bucket, records.to_vec())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn full_store_rejects_new_keys_only() {
        let mut store: MemoryStore<TableBytes> = MemoryStore::with_max_entries(1);
        TableStore::insert(&mut store, 0, [1; TABLE_RECORD_LEN]).unwrap();
        TableStore::insert(&mut store, 0, [2; TABLE_RECORD_LEN]).unwrap();
        assert!(matches!(
            TableStore::insert(&mut store, 1, [3; TABLE_RECORD_LEN]),
            Err(StoreError::Exhausted(1))
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0), Some(&[2; TABLE_RECORD_LEN]));
    }

    #[test]
    fn bucket_records_are_copied() {
        let mut store: MemoryStore<Vec<RuleBytes>> = MemoryStore::default();
        let records = [[7; xdp_acl_common::RULE_RECORD_LEN]; 3];
        BucketStore::insert(&mut store, 42, &records).unwrap();
        assert_eq!(store.get(42).map(Vec::len), Some(3));
        assert_eq!(store.iter().map(|(k, _)| k).collect::<Vec<_>>(), [42]);
    }
}
