use std::fmt;

use aya::maps::MapError;
use thiserror::Error;
use xdp_acl_common::HashError;

/// ACL errors.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// A rule description is malformed, `index` is its position in the input.
    #[error("rule {index} is invalid: {source}")]
    Parse {
        index: usize,
        #[source]
        source: ParseError,
    },
    /// Hash key longer than `jhash` supports.
    #[error(transparent)]
    Hash(#[from] HashError),
    /// The bucket array size must be a power of two so a hash can be masked into it.
    #[error("bucket count {0} is not a power of two")]
    InvalidBucketCount(u32),
    /// Every random table id drawn was already taken.
    #[error("no unused table id found after {0} attempts")]
    TableIdExhausted(usize),
    /// The random source failed while drawing a table id.
    #[error(transparent)]
    Random(#[from] rand::Error),
    /// Error when writing a table record, `index` is its position in the sorted tables.
    #[error("failed to store table {index}: {source}")]
    TableStore {
        index: u32,
        #[source]
        source: StoreError,
    },
    /// Error when writing the rule records of a bucket.
    #[error("failed to store rule bucket {bucket}: {source}")]
    BucketStore {
        bucket: u32,
        #[source]
        source: StoreError,
    },
}

/// Errors returned by a [`TableStore`](crate::TableStore) or [`BucketStore`](crate::BucketStore).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StoreError {
    // Aya's error seems clear enough to just let it bubble up
    #[error(transparent)]
    MapError(#[from] MapError),
    /// Normally, space exhaustion.
    #[error("maximum number of entries ({0}) reached")]
    Exhausted(usize),
}

/// Field of a [`RuleDesc`](crate::RuleDesc) that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Saddr,
    Daddr,
    Sport,
    Dport,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Saddr => "saddr",
            Field::Daddr => "daddr",
            Field::Sport => "sport",
            Field::Dport => "dport",
        };
        f.write_str(name)
    }
}

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid {field}: {value:?} is not an IPv4 CIDR")]
    InvalidCidr { field: Field, value: String },
    #[error("invalid {field}: {value:?} is not a port, a port range or \"*\"")]
    InvalidPort { field: Field, value: String },
    #[error("invalid proto: {0:?}")]
    InvalidProtocol(String),
    #[error("invalid action: {0:?}")]
    InvalidAction(String),
}
