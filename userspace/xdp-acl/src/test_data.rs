#![cfg(test)]

use std::collections::VecDeque;

use rand::{Rng, RngCore};

use crate::{Rule, RuleDesc};

const PROTOS: [&str; 3] = ["tcp", "udp", "icmp"];
const ACTIONS: [&str; 2] = ["allow", "deny"];

pub(crate) fn desc(
    saddr: &str,
    daddr: &str,
    proto: &str,
    sport: &str,
    dport: &str,
    action: &str,
    priority: u64,
) -> RuleDesc {
    RuleDesc {
        saddr: saddr.to_string(),
        daddr: daddr.to_string(),
        sport: sport.to_string(),
        dport: dport.to_string(),
        proto: proto.to_string(),
        action: action.to_string(),
        priority,
    }
}

/// The two rules of the tuple-merge walkthrough: a /24 pair and a /16 pair.
pub(crate) fn walkthrough() -> Vec<RuleDesc> {
    vec![
        desc("10.0.0.0/24", "10.0.1.0/24", "tcp", "80", "*", "allow", 10),
        desc("10.0.0.0/16", "10.0.1.0/16", "tcp", "*", "*", "deny", 5),
    ]
}

fn random_cidr(rng: &mut impl Rng) -> String {
    let ip: [u8; 4] = rng.gen();
    let prefix = rng.gen_range(0..=32);
    format!("{}.{}.{}.{}/{prefix}", ip[0], ip[1], ip[2], ip[3])
}

fn random_ports(rng: &mut impl Rng) -> String {
    match rng.gen_range(0..3) {
        0 => "*".to_string(),
        1 => rng.gen::<u16>().to_string(),
        _ => {
            let start = rng.gen_range(0..=1024u16);
            format!("{start}-{}", rng.gen_range(start..=u16::MAX))
        }
    }
}

pub(crate) fn random_desc(rng: &mut impl Rng) -> RuleDesc {
    RuleDesc {
        saddr: random_cidr(rng),
        daddr: random_cidr(rng),
        sport: random_ports(rng),
        dport: random_ports(rng),
        proto: PROTOS[rng.gen_range(0..PROTOS.len())].to_string(),
        action: ACTIONS[rng.gen_range(0..ACTIONS.len())].to_string(),
        priority: rng.gen_range(0..8),
    }
}

pub(crate) fn random_rules(rng: &mut impl Rng, len: usize) -> Vec<Rule> {
    (0..len)
        .map(|_| Rule::try_from(&random_desc(rng)).unwrap())
        .collect()
}

/// Hands out the given table ids in order, then repeats the last one.
pub(crate) struct IdSequence(VecDeque<u32>);

impl IdSequence {
    pub(crate) fn new(ids: &[u32]) -> Self {
        Self(ids.iter().copied().collect())
    }
}

impl RngCore for IdSequence {
    fn next_u32(&mut self) -> u32 {
        if self.0.len() > 1 {
            self.0.pop_front().unwrap()
        } else {
            self.0[0]
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u32().into()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Random source that always fails.
pub(crate) struct BrokenRng;

impl RngCore for BrokenRng {
    fn next_u32(&mut self) -> u32 {
        unimplemented!("only try_fill_bytes is used")
    }

    fn next_u64(&mut self) -> u64 {
        unimplemented!("only try_fill_bytes is used")
    }

    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        unimplemented!("only try_fill_bytes is used")
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        Err(rand::Error::new("entropy source exhausted"))
    }
}
