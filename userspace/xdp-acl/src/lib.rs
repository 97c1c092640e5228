//! Control plane for an XDP access-control list.
//!
//! Rules are parsed from [`RuleDesc`]s, grouped into tables of compatible mask
//! specificity, hashed into buckets and encoded into the fixed-size records the
//! XDP program looks up, see [`Acl`].
//!
//! # Example
//! ```
//! # use xdp_acl::{Acl, AclConfig, AclDocument, MemoryStore, RuleBytes, TableBytes};
//! let doc: AclDocument =
//!     r#"{"rules": [{"saddr": "10.0.0.0/24", "daddr": "10.0.1.0/24",
//!        "sport": "80", "dport": "*", "proto": "tcp", "action": "allow", "priority": 10}]}"#
//!         .parse()
//!         .unwrap();
//! let acl = Acl::new(&doc.rules, rand::rngs::OsRng).unwrap();
//!
//! let mut tables = MemoryStore::<TableBytes>::default();
//! let mut buckets = MemoryStore::<Vec<RuleBytes>>::default();
//! acl.install(&AclConfig::default(), &mut tables, &mut buckets).unwrap();
//! assert_eq!(tables.len(), 1);
//! assert_eq!(buckets.len(), 1);
//! ```
mod acl;
mod bpf_store;
mod bucket;
mod cidr;
mod classifier;
mod config;
mod error;
mod rule;
mod test_data;

pub use crate::acl::Acl;
pub use bpf_store::{BucketStore, MemoryStore, TableStore};
pub use bucket::BucketSet;
pub use cidr::Cidr;
pub use classifier::{classify, Classifier, Table};
pub use config::{AclConfig, AclDocument};
pub use error::{Error, Field, ParseError, StoreError};
pub use rule::{Rule, RuleDesc};
pub use xdp_acl_common::{
    Action, Padding, PortOrder, Protocol, RuleBytes, RuleLayout, TableBytes, RULE_RECORD_LEN,
    TABLE_RECORD_LEN,
};

pub type Result<T> = std::result::Result<T, Error>;

/// Hash map of [`TableBytes`] keyed by table index.
pub const ACL_TABLES: &str = "acl_tables";
/// Array of maps, one inner [`ACL_RULES`] map per non-empty bucket.
pub const ACL_RULE_BUCKETS: &str = "acl_rule_buckets";
/// Inner map template holding the [`RuleBytes`] of a bucket.
pub const ACL_RULES: &str = "acl_rules";

/// Size of [`ACL_RULE_BUCKETS`] the XDP program is built with.
pub const RULE_BUCKETS_NUM: u32 = 0x8000;
