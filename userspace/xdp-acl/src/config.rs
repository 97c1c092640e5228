use std::{io::Read, str::FromStr};

use serde::{Deserialize, Serialize};
use xdp_acl_common::RuleLayout;

use crate::{Error, Result, RuleDesc, RULE_BUCKETS_NUM};

/// How rules are laid out in the kernel maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Size of the outer bucket array, must be a power of two.
    pub bucket_count: u32,
    pub layout: RuleLayout,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            bucket_count: RULE_BUCKETS_NUM,
            layout: RuleLayout::default(),
        }
    }
}

impl AclConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bucket_count.is_power_of_two() {
            Ok(())
        } else {
            Err(Error::InvalidBucketCount(self.bucket_count))
        }
    }
}

/// Rules file: `{"rules": [...]}`, rules in the order they should be classified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclDocument {
    pub rules: Vec<RuleDesc>,
}

impl AclDocument {
    pub fn from_reader(reader: impl Read) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

impl FromStr for AclDocument {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}
