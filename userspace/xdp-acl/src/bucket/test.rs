#![cfg(test)]

use rand::{rngs::StdRng, SeedableRng};
use test_case::test_case;

use super::{bucket_index, BucketSet};
use crate::{
    classify,
    test_data::{desc, random_rules, IdSequence},
    Error, Rule,
};

#[test_case(0)]
#[test_case(3)]
#[test_case(6)]
#[test_case(0x8001)]
#[test_case(u32::MAX)]
fn count_must_be_power_of_two(count: u32) {
    let err = BucketSet::assign(&[], count).unwrap_err();
    assert!(matches!(err, Error::InvalidBucketCount(c) if c == count));
}

#[test_case(1)]
#[test_case(2)]
#[test_case(0x8000)]
#[test_case(1 << 31)]
fn power_of_two_is_accepted(count: u32) {
    let set = BucketSet::assign(&[], count).unwrap();
    assert_eq!(set.count(), count);
    assert!(set.is_empty());
}

#[test_case(0xdead_beef, 0x8000, 0x3eef)]
#[test_case(0xdead_beef, 1, 0)]
#[test_case(0x0000_0007, 4, 3)]
#[test_case(u32::MAX, 1 << 31, (1 << 31) - 1)]
fn index_masks_hash(hash: u32, count: u32, expected: u32) {
    assert_eq!(bucket_index(hash, count), expected);
}

#[test]
fn single_bucket_orders_by_priority() {
    let mut rules: Vec<Rule> = [3, 9, 1, 9, 5]
        .into_iter()
        .enumerate()
        .map(|(i, priority)| {
            let saddr = format!("10.0.{i}.0/24");
            Rule::try_from(&desc(&saddr, "0.0.0.0/0", "udp", "*", "53", "deny", priority))
                .unwrap()
        })
        .collect();
    classify(&mut rules, IdSequence::new(&[1])).unwrap();

    let set = BucketSet::assign(&rules, 1).unwrap();
    assert_eq!(set.len(), 1);
    let priorities: Vec<u64> = set.get(0).unwrap().iter().map(|r| r.priority()).collect();
    assert_eq!(priorities, [9, 9, 5, 3, 1]);
}

#[test]
fn random_rules_land_in_their_bucket() {
    let mut rng = StdRng::seed_from_u64(7);
    for count in [1, 2, 16, 0x8000] {
        let mut rules = random_rules(&mut rng, 64);
        classify(&mut rules, StdRng::seed_from_u64(count.into())).unwrap();
        let set = BucketSet::assign(&rules, count).unwrap();

        let mut total = 0;
        let mut last = None;
        for (bucket, bucket_rules) in set.iter() {
            assert!(bucket < count);
            assert!(!bucket_rules.is_empty());
            assert!(last < Some(bucket));
            last = Some(bucket);
            total += bucket_rules.len();

            for rule in bucket_rules {
                assert_eq!(rule.hash() & (count - 1), bucket);
            }
            for pair in bucket_rules.windows(2) {
                assert!(pair[0].priority() >= pair[1].priority());
            }
        }
        assert_eq!(total, rules.len());
    }
}
