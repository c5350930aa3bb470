// PrimeHashMap property tests through the public API.
//
// Property 1: distinct values under `Find`.
//  - Invariant: len == number of distinct inputs; every input is found;
//    iteration yields the distinct set.
//
// Property 2: put/remove round trip.
//  - Invariant: each removed value equals what was inserted and is no
//    longer found; values not removed are untouched.
//
// Property 3: `Stack` multiplicity.
//  - Invariant: k stacked puts of one value leave k removable copies.
//
// Property 4: capacity ladder.
//  - Invariant: capacity is 0 or on the prime ladder, never shrinks, and
//    `ensure_size(n)` leaves capacity >= n.
use prime_hashmap::primes::is_prime_capacity;
use prime_hashmap::{PrimeHashMap, PutKind, Resolution};
use proptest::prelude::*;
use std::collections::BTreeSet;

// Property 1: distinct values are stored once each.
proptest! {
    #[test]
    fn prop_find_policy_stores_distinct_values(values in proptest::collection::vec(any::<i32>(), 0..400)) {
        let mut m: PrimeHashMap<i32> = PrimeHashMap::new();
        let mut distinct = BTreeSet::new();
        for v in &values {
            let kind = m.put(*v, Resolution::Find).unwrap().kind();
            let expected = if distinct.insert(*v) { PutKind::Put } else { PutKind::Found };
            prop_assert_eq!(kind, expected);
        }
        prop_assert_eq!(m.len(), distinct.len());
        for v in &distinct {
            prop_assert_eq!(m.find(v), Some(v));
        }
        let seen: BTreeSet<i32> = m.iter().copied().collect();
        prop_assert_eq!(seen, distinct);
    }
}

// Property 2: removal round trip.
proptest! {
    #[test]
    fn prop_remove_round_trip(
        values in proptest::collection::btree_set("[a-z]{1,6}", 0..100),
        mask in proptest::collection::vec(any::<bool>(), 100),
    ) {
        let mut m: PrimeHashMap<String> = PrimeHashMap::new();
        for v in &values {
            m.put(v.clone(), Resolution::Find).unwrap();
        }
        let mut kept = 0;
        for (v, &drop_it) in values.iter().zip(&mask) {
            if drop_it {
                let removed = m.remove(v);
                prop_assert_eq!(removed.as_ref(), Some(v));
                prop_assert!(m.find(v).is_none());
            } else {
                kept += 1;
            }
        }
        prop_assert_eq!(m.len(), kept);
        for (v, &drop_it) in values.iter().zip(&mask) {
            prop_assert_eq!(m.contains(v), !drop_it);
        }
    }
}

// Property 3: stacked duplicates come back out one at a time.
proptest! {
    #[test]
    fn prop_stack_multiplicity(k in 1usize..40, others in proptest::collection::vec(1000u32..2000, 0..50)) {
        let mut m: PrimeHashMap<u32> = PrimeHashMap::new();
        for _ in 0..k {
            m.put(7, Resolution::Stack).unwrap();
        }
        for o in &others {
            m.put(*o, Resolution::Find).unwrap();
        }
        for _ in 0..k {
            prop_assert_eq!(m.remove(&7), Some(7));
        }
        prop_assert_eq!(m.remove(&7), None);
        prop_assert_eq!(m.len(), others.iter().collect::<BTreeSet<_>>().len());
    }
}

// Property 4: capacity stays on the ladder and never shrinks.
proptest! {
    #[test]
    fn prop_capacity_ladder(ops in proptest::collection::vec((0u8..3, 0u32..3000), 1..200)) {
        let mut m: PrimeHashMap<u32> = PrimeHashMap::new();
        let mut last = 0;
        for (op, x) in ops {
            match op {
                0 => { m.put(x, Resolution::Stack).unwrap(); }
                1 => { m.remove(&x); }
                _ => {
                    m.ensure_size(x as usize).unwrap();
                    prop_assert!(m.capacity() >= x as usize);
                }
            }
            let cap = m.capacity();
            prop_assert!(cap == 0 || is_prime_capacity(cap));
            prop_assert!(cap >= last);
            prop_assert!(m.len() <= cap);
            last = cap;
        }
    }
}
