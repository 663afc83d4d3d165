#![cfg(test)]

// Property tests for OrderedTable kept inside the crate so they can call
// the internal invariant checker after every step.

use crate::ordered_table::{OrderedTable, TableError};
use proptest::prelude::*;
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Get(usize),
    Remove(usize),
    Contains(String),
    Ends,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<OpI>)> {
    (1usize..=8, proptest::collection::vec("[a-z]{0,4}", 1..=12)).prop_flat_map(|(cap, pool)| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Get),
            1 => "[a-z]{0,4}".prop_map(OpI::Contains),
            1 => Just(OpI::Ends),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (cap, pool.clone(), ops))
    })
}

// Reference model: entries oldest to newest.
#[derive(Default)]
struct Model(Vec<(String, i32)>);

impl Model {
    fn position(&self, k: &str) -> Option<usize> {
        self.0.iter().position(|(mk, _)| mk == k)
    }
    fn get(&self, k: &str) -> Option<i32> {
        self.position(k).map(|i| self.0[i].1)
    }
}

fn run<S: BuildHasher>(
    mut sut: OrderedTable<String, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let cap = sut.capacity();
    let mut model = Model::default();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let prev = model.get(&k);
                match sut.insert(k.clone(), v) {
                    Ok(old) => {
                        prop_assert_eq!(old, prev);
                        if let Some(pos) = model.position(&k) {
                            model.0.remove(pos);
                        }
                        model.0.push((k, v));
                    }
                    Err(TableError::TableFull) => {
                        prop_assert!(prev.is_none(), "update must never report full");
                        prop_assert_eq!(model.0.len(), cap);
                    }
                    Err(e) => prop_assert!(false, "unexpected insert error {:?}", e),
                }
            }
            OpI::Get(i) => {
                let k = &pool[i];
                match model.get(k) {
                    Some(v) => prop_assert_eq!(sut.get(k.as_str()), Ok(&v)),
                    None => prop_assert_eq!(sut.get(k.as_str()), Err(TableError::KeyNotFound)),
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                match model.position(k) {
                    Some(pos) => {
                        let (_, v) = model.0.remove(pos);
                        prop_assert_eq!(sut.remove(k.as_str()), Ok(v));
                    }
                    None => prop_assert_eq!(sut.remove(k.as_str()), Err(TableError::KeyNotFound)),
                }
                // Every survivor is still reachable after the cluster rehash.
                for (mk, mv) in &model.0 {
                    prop_assert_eq!(sut.get(mk.as_str()), Ok(mv));
                }
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.position(&s).is_some());
            }
            OpI::Ends => {
                prop_assert_eq!(sut.get_first(), model.0.first().map(|(_, v)| v));
                prop_assert_eq!(sut.get_last(), model.0.last().map(|(_, v)| v));
            }
        }

        // Post-conditions after each op
        sut.check_invariants();
        prop_assert_eq!(sut.len(), model.0.len());
        prop_assert!(sut.len() <= cap);
        let order: Vec<(&String, &i32)> = sut.iter().collect();
        let expected: Vec<(&String, &i32)> = model.0.iter().map(|(k, v)| (k, v)).collect();
        prop_assert_eq!(order, expected);
    }
    Ok(())
}

// Property: state-machine equivalence against an ordered Vec model.
// Invariants exercised across random operation sequences:
// - `get` returns the last value inserted for a key; absent keys fail.
// - TableFull only for a new key at capacity; count never exceeds capacity.
// - Updates move the key to the newest position; reads never reorder.
// - After any removal every other key stays reachable (probe-chain integrity).
// - Slots and order list hold the same entries; the order list is acyclic.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((cap, pool, ops) in arb_scenario()) {
        run(OrderedTable::new(cap), &pool, ops)?;
    }
}

// Collision variant: every key homes to slot 0, so all entries form a
// single cluster and each removal relocates the whole tail of it.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Few-bucket variant: digests collapse to a handful of values, producing
// several interleaved clusters that wrap around the end of the store.
#[derive(Clone, Default)]
struct FewBucketsBuildHasher;
#[derive(Default)]
struct FewBucketsHasher(u64);
impl BuildHasher for FewBucketsBuildHasher {
    type Hasher = FewBucketsHasher;
    fn build_hasher(&self) -> Self::Hasher {
        FewBucketsHasher(0)
    }
}
impl Hasher for FewBucketsHasher {
    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = self.0.wrapping_add(u64::from(*b));
        }
    }
    fn finish(&self) -> u64 {
        self.0 % 3 + 5
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((cap, pool, ops) in arb_scenario()) {
        run(OrderedTable::with_hasher(cap, ConstBuildHasher), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_with_few_buckets((cap, pool, ops) in arb_scenario()) {
        run(OrderedTable::with_hasher(cap, FewBucketsBuildHasher), &pool, ops)?;
    }
}
