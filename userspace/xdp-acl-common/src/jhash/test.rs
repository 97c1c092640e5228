#![cfg(test)]

use crate::{jhash, HashError, HashKey, Protocol, JHASH_INITVAL};
use test_case::test_case;

#[test_case([192, 168, 1, 0], 0xb2de_a0d4)]
#[test_case([0, 1, 168, 192], 0x95e3_afc7)]
fn known_kernel_values(addr: [u8; 4], expected: u32) {
    let key = HashKey {
        saddr: addr,
        daddr: addr,
        protocol: Protocol::ICMP as u8,
    };
    assert_eq!(jhash(&key.to_bytes(), 1), Ok(expected));
    assert_eq!(key.hash(1), Ok(expected));
}

#[test_case(0)]
#[test_case(1)]
#[test_case(0xdead_beef)]
#[test_case(u32::MAX)]
fn empty_key_is_initial_state(seed: u32) {
    assert_eq!(jhash(&[], seed), Ok(JHASH_INITVAL.wrapping_add(seed)));
}

#[test_case(13, 0)]
#[test_case(13, 1)]
#[test_case(16, 0x1234_5678)]
#[test_case(64, u32::MAX)]
fn long_keys_are_rejected(len: usize, seed: u32) {
    let key = [0xAAu8; 64];
    assert_eq!(jhash(&key[..len], seed), Err(HashError::KeyTooLong(len)));
}

#[test]
fn every_length_up_to_twelve_hashes() {
    let key = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
    for len in 0..=12 {
        let first = jhash(&key[..len], 7);
        assert!(first.is_ok(), "length {len} rejected");
        assert_eq!(first, jhash(&key[..len], 7), "length {len} not deterministic");
    }
}

#[test]
fn seed_and_byte_order_change_the_hash() {
    let key = HashKey {
        saddr: [10, 0, 0, 0],
        daddr: [10, 0, 1, 0],
        protocol: Protocol::TCP as u8,
    };
    let swapped = HashKey {
        saddr: [0, 0, 0, 10],
        daddr: [0, 1, 0, 10],
        ..key
    };
    assert_ne!(key.hash(1), key.hash(2));
    assert_ne!(key.hash(1), swapped.hash(1));
}
