// OrderedTable unit test suite (public API).
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Round trip: `get` returns the last value inserted for a key.
// - Capacity: a new key beyond capacity fails with TableFull; count never
//   exceeds capacity, and an update on a full table still succeeds.
// - Order: first/last follow insertion order; an update moves the key to
//   the newest position; reads do not.
// - Deletion: removing any key leaves every other key reachable.
// - Errors leave the table unchanged and usable.
use ordered_table::{OrderedTable, TableError};
use std::sync::{Arc, Mutex};
use std::thread;

// Test: the capacity-4 walkthrough.
// Verifies: ends after three inserts, removal of a middle key, refill to
// capacity, then TableFull on the fifth distinct live key.
#[test]
fn capacity_four_walkthrough() {
    let mut t = OrderedTable::new(4);
    t.insert("A", 1).unwrap();
    t.insert("B", 2).unwrap();
    t.insert("C", 3).unwrap();
    assert_eq!(t.get_first(), Some(&1));
    assert_eq!(t.get_last(), Some(&3));
    assert_eq!(t.len(), 3);

    t.remove("B").unwrap();
    assert_eq!(t.get("B"), Err(TableError::KeyNotFound));
    assert_eq!(t.get("A"), Ok(&1));
    assert_eq!(t.get("C"), Ok(&3));
    assert_eq!(t.len(), 2);

    assert!(t.insert("D", 4).is_ok());
    assert_eq!(t.len(), 3);
    assert!(t.insert("E", 5).is_ok());
    assert_eq!(t.len(), 4);
    assert_eq!(t.insert("F", 6), Err(TableError::TableFull));
    assert_eq!(t.len(), 4);
    assert_eq!(t.capacity(), 4);
}

// Test: ordering without updates.
// Verifies: first is the oldest insert, last the newest; keys come back
// with their values.
#[test]
fn first_and_last_follow_insertion() {
    let mut t = OrderedTable::new(8);
    for (k, v) in [("k1", 10), ("k2", 20), ("k3", 30)] {
        t.insert(k.to_string(), v).unwrap();
    }
    assert_eq!(t.get_first(), Some(&10));
    assert_eq!(t.get_last(), Some(&30));
    assert_eq!(t.first(), Some((&"k1".to_string(), &10)));
    assert_eq!(t.last(), Some((&"k3".to_string(), &30)));
}

// Test: update semantics.
// Verifies: insert on an existing key returns the old value, becomes the
// newest entry, and does not change the count.
#[test]
fn update_reorders() {
    let mut t = OrderedTable::new(4);
    t.insert("k1", 1).unwrap();
    t.insert("k2", 2).unwrap();
    assert_eq!(t.insert("k1", 100), Ok(Some(1)));
    assert_eq!(t.get_last(), Some(&100));
    assert_eq!(t.get_first(), Some(&2));
    assert_eq!(t.len(), 2);
    let keys: Vec<_> = t.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, ["k2", "k1"]);
}

// Test: deletion in a dense table.
// Verifies: after removing each key in turn from a full table, all other
// keys remain retrievable with their values.
#[test]
fn every_removal_preserves_lookups() {
    const N: u64 = 64;
    for victim in 0..N {
        let mut t = OrderedTable::new(N as usize);
        for k in 0..N {
            t.insert(k, k * 3).unwrap();
        }
        assert_eq!(t.remove(&victim), Ok(victim * 3));
        for k in (0..N).filter(|&k| k != victim) {
            assert_eq!(t.get(&k), Ok(&(k * 3)), "lost key {k} after removing {victim}");
        }
        assert_eq!(t.len(), N as usize - 1);
    }
}

// Test: absence is idempotent.
// Verifies: repeated get/remove of a never-inserted key keep failing and
// do not alter the table.
#[test]
fn missing_key_fails_repeatably() {
    let mut t: OrderedTable<String, u8> = OrderedTable::new(2);
    t.insert("present".into(), 1).unwrap();
    for _ in 0..5 {
        assert_eq!(t.get("absent"), Err(TableError::KeyNotFound));
        assert_eq!(t.remove("absent"), Err(TableError::KeyNotFound));
    }
    assert_eq!(t.len(), 1);
    assert_eq!(t.get("present"), Ok(&1));
}

// Test: removing the same key twice.
// Verifies: the second removal reports KeyNotFound.
#[test]
fn double_remove_is_not_found() {
    let mut t = OrderedTable::new(3);
    t.insert(1u32, 'a').unwrap();
    assert_eq!(t.remove(&1), Ok('a'));
    assert_eq!(t.remove(&1), Err(TableError::KeyNotFound));
    assert!(t.is_empty());
    assert_eq!(t.get_first(), None);
}

// Test: caller-side eviction built on first().
// Assumes: the table itself never evicts.
// Verifies: evict-oldest-then-insert keeps the newest `capacity` keys.
#[test]
fn evict_oldest_then_insert() {
    let mut t = OrderedTable::new(3);
    for id in 0u64..10 {
        if let Err(TableError::TableFull) = t.insert(id, id * 10) {
            let oldest = *t.first().map(|(k, _)| k).unwrap();
            t.remove(&oldest).unwrap();
            t.insert(id, id * 10).unwrap();
        }
    }
    let ids: Vec<u64> = t.iter().map(|(k, _)| *k).collect();
    assert_eq!(ids, [7, 8, 9]);
    assert_eq!(t.get_first(), Some(&70));
    assert_eq!(t.get_last(), Some(&90));
}

// Test: shared use behind a single lock.
// Assumes: OrderedTable is Send; one Mutex serializes each call.
// Verifies: concurrent inserts from several threads all land.
#[test]
fn shared_behind_mutex() {
    let t = Arc::new(Mutex::new(OrderedTable::new(64)));
    let handles: Vec<_> = (0..4u64)
        .map(|w| {
            let t = Arc::clone(&t);
            thread::spawn(move || {
                for i in 0..16u64 {
                    let id = w * 16 + i;
                    t.lock().unwrap().insert(id, format!("trade-{id}")).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let t = t.lock().unwrap();
    assert!(t.is_full());
    for id in 0..64u64 {
        assert_eq!(t.get(&id).map(String::as_str), Ok(format!("trade-{id}").as_str()));
    }
}
