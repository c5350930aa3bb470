#![cfg(test)]

// Property tests for PrimeHashMap kept inside the crate so they can check
// bucket-level structure directly.

use crate::ops::{FnOps, ValueOps};
use crate::primes;
use crate::{Hooks, PrimeHashMap, PutKind, Resolution};
use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

// Keys drawn from a small pool so duplicates are common; the payload is
// ignored by comparison and hashing.
#[derive(Clone, Debug)]
struct Rec {
    key: String,
    payload: i32,
}

#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32, Resolution),
    Remove(usize),
    Find(usize),
    Ensure(usize),
    Iterate,
}

fn arb_resolution() -> impl Strategy<Value = Resolution> {
    prop_oneof![
        Just(Resolution::Find),
        Just(Resolution::Replace),
        Just(Resolution::Swap),
        Just(Resolution::Stack),
    ]
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=10).prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>(), arb_resolution())
                .prop_map(|(i, p, r)| Op::Put(i, p, r)),
            2 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Find),
            1 => (0usize..300).prop_map(Op::Ensure),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn rec(pool: &[String], i: usize, payload: i32) -> Rec {
    Rec {
        key: pool[i].clone(),
        payload,
    }
}

// Model: per key, the payloads stored under it (several when stacked).
type Model = BTreeMap<String, Vec<i32>>;

fn check_structure<O, A>(sut: &PrimeHashMap<Rec, O, A>, model: &Model) -> Result<(), TestCaseError>
where
    O: ValueOps<Rec>,
    A: Hooks,
{
    let buckets = sut.table.buckets();
    let total: usize = buckets.iter().map(|b| b.len()).sum();
    prop_assert_eq!(total, sut.len());
    prop_assert_eq!(sut.len(), model.values().map(Vec::len).sum::<usize>());
    prop_assert!(sut.capacity() == 0 || primes::is_prime_capacity(sut.capacity()));
    prop_assert!(sut.len() <= sut.capacity());
    for (index, b) in buckets.iter().enumerate() {
        prop_assert!(b.capacity() == 0 || primes::is_prime_capacity(b.capacity()));
        prop_assert!(b.len() <= b.capacity());
        for v in b.entries() {
            let expected = (sut.ops.hash(v) % sut.capacity() as u64) as usize;
            prop_assert_eq!(expected, index, "value stored in the wrong bucket");
        }
    }
    Ok(())
}

fn run<O: ValueOps<Rec>>(ops: O, pool: Vec<String>, script: Vec<Op>) -> Result<(), TestCaseError> {
    let mut sut = PrimeHashMap::with_ops(ops);
    let mut model = Model::new();
    let mut last_capacity = 0;

    for op in script {
        match op {
            Op::Put(i, payload, resolution) => {
                let value = rec(&pool, i, payload);
                let key = value.key.clone();
                let existing = model.get(&key).and_then(|v| v.first().copied());
                let out = sut.put(value, resolution).expect("system allocator");
                match (existing, resolution) {
                    (None, _) => {
                        prop_assert_eq!(out.kind(), PutKind::Put);
                        model.entry(key).or_default().push(payload);
                    }
                    (Some(old), Resolution::Find) => {
                        prop_assert_eq!(out.kind(), PutKind::Found);
                        prop_assert_eq!(out.into_stored().payload, old);
                    }
                    (Some(_), Resolution::Replace) => {
                        prop_assert_eq!(out.kind(), PutKind::Replaced);
                        model.get_mut(&key).unwrap()[0] = payload;
                    }
                    (Some(old), Resolution::Swap) => {
                        match out {
                            crate::PutOutcome::Swapped { stored, previous } => {
                                prop_assert_eq!(stored.payload, payload);
                                prop_assert_eq!(previous.payload, old);
                            }
                            other => prop_assert!(false, "expected Swapped, got {:?}", other.kind()),
                        }
                        model.get_mut(&key).unwrap()[0] = payload;
                    }
                    (Some(old), Resolution::Stack) => {
                        match out {
                            crate::PutOutcome::Stacked { stored, existing } => {
                                prop_assert_eq!(stored.payload, payload);
                                prop_assert_eq!(existing.payload, old);
                            }
                            other => prop_assert!(false, "expected Stacked, got {:?}", other.kind()),
                        }
                        model.get_mut(&key).unwrap().push(payload);
                    }
                }
            }
            Op::Remove(i) => {
                let probe = rec(&pool, i, 0);
                let removed = sut.remove(&probe);
                match model.get_mut(&probe.key) {
                    Some(payloads) => {
                        let r = removed.expect("model says present");
                        prop_assert_eq!(&r.key, &probe.key);
                        // Within a bucket the earliest stored copy goes first.
                        prop_assert_eq!(r.payload, payloads.remove(0));
                        if payloads.is_empty() {
                            model.remove(&probe.key);
                        }
                    }
                    None => prop_assert!(removed.is_none()),
                }
            }
            Op::Find(i) => {
                let probe = rec(&pool, i, 0);
                let found = sut.find(&probe).map(|r| r.payload);
                let expected = model.get(&probe.key).map(|v| v[0]);
                prop_assert_eq!(found, expected);
            }
            Op::Ensure(n) => {
                sut.ensure_size(n).expect("system allocator");
                prop_assert!(sut.capacity() >= n);
            }
            Op::Iterate => {
                let mut seen: Model = Model::new();
                for r in sut.iter() {
                    seen.entry(r.key.clone()).or_default().push(r.payload);
                }
                for v in seen.values_mut() {
                    v.sort_unstable();
                }
                let mut expected = model.clone();
                for v in expected.values_mut() {
                    v.sort_unstable();
                }
                prop_assert_eq!(seen, expected);
            }
        }

        prop_assert!(sut.capacity() >= last_capacity, "capacity shrank");
        last_capacity = sut.capacity();
        check_structure(&sut, &model)?;
    }
    Ok(())
}

fn key_hash(r: &Rec) -> u64 {
    r.key
        .bytes()
        .fold(5381u64, |h, c| h.wrapping_mul(33).wrapping_add(c as u64))
}

fn key_cmp(a: &Rec, b: &Rec) -> Ordering {
    a.key.cmp(&b.key)
}

// Property: state-machine equivalence against a multiset model.
// Invariants exercised across random operation sequences:
// - Each resolution policy reports the right outcome and only `Put`/`Stack`
//   change `len`; `Find` never mutates the stored value.
// - `remove` peels stacked duplicates oldest-first and reports absence
//   once the key is gone.
// - `iter` yields exactly the model's multiset.
// - Sum of bucket sizes equals `len`; every value sits in `hash % capacity`.
// - Table and bucket capacities are on the prime ladder and never shrink.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, script) in arb_scenario()) {
        run(FnOps::new(key_cmp, key_hash), pool, script)?;
    }
}

// Property: same invariants when every value lands in one bucket, so
// equality alone separates values and buckets climb the ladder.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, script) in arb_scenario()) {
        run(FnOps::new(key_cmp, |_: &Rec| 0u64), pool, script)?;
    }
}

// Property: a delete-safe pass yields every value exactly once whatever is
// removed along the way.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_safe_iteration_yields_each_value_once(
        n in 0u32..200,
        removals in proptest::collection::vec((0u32..200, 0u32..200), 0..200),
    ) {
        let mut sut: PrimeHashMap<u32> = PrimeHashMap::new();
        for v in 0..n {
            sut.put(v, Resolution::Find).unwrap();
        }
        let mut seen = Vec::new();
        let mut removed = BTreeSet::new();
        let mut plan = removals.into_iter();
        let mut it = sut.iter_safe();
        while let Some(v) = it.next() {
            seen.push(v);
            if let Some((a, b)) = plan.next() {
                for target in [a, b] {
                    if it.remove(&target).is_some() {
                        prop_assert!(removed.insert(target));
                    }
                }
            }
        }
        drop(it);
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..n).collect::<Vec<u32>>());
        prop_assert_eq!(sut.len(), n as usize - removed.len());
        for v in &removed {
            prop_assert!(sut.find(v).is_none());
        }
    }
}
