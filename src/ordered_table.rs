//! OrderedTable: fixed-capacity linear-probing table with insertion/update order.

use crate::order_list::{self, OrderList};
use crate::probe::{Occupant, Probe, SlotStore};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Errors returned by [`OrderedTable`] operations. Neither leaves the table
/// in a modified state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TableError {
    /// A new key was inserted while every slot was occupied.
    #[error("table is full")]
    TableFull,
    /// The key is not present.
    #[error("key not found")]
    KeyNotFound,
}

/// Fixed-capacity key-value table that remembers which entry was inserted
/// or updated first and last.
///
/// Collisions are resolved by linear probing without tombstones: `remove`
/// re-places the cluster that follows the freed slot. Order is kept in a
/// separate linked list, so relocation never changes it. Reads do not touch
/// order; an `insert` on an existing key moves it to the newest position.
pub struct OrderedTable<K, V, S = DefaultHashBuilder> {
    hasher: S,
    slots: SlotStore,
    order: OrderList<K, V>,
    reentrancy: DebugReentrancy,
}

impl<K, V> OrderedTable<K, V>
where
    K: Eq + Hash,
{
    /// Create a table with `capacity` slots and the default hasher.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> OrderedTable<K, V, S> {
    /// Fixed number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.order.len() == self.slots.capacity()
    }

    /// Value of the oldest entry, or `None` when the table is empty.
    pub fn get_first(&self) -> Option<&V> {
        self.first().map(|(_, v)| v)
    }

    /// Value of the newest entry, or `None` when the table is empty.
    pub fn get_last(&self) -> Option<&V> {
        self.last().map(|(_, v)| v)
    }

    /// Key and value of the oldest entry.
    pub fn first(&self) -> Option<(&K, &V)> {
        let _g = self.reentrancy.enter();
        let node = self.order.head()?;
        Some((self.order.key(node)?, self.order.value(node)?))
    }

    /// Key and value of the newest entry.
    pub fn last(&self) -> Option<(&K, &V)> {
        let _g = self.reentrancy.enter();
        let node = self.order.tail()?;
        Some((self.order.key(node)?, self.order.value(node)?))
    }

    /// Iterate entries from oldest to newest.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.order.iter(),
        }
    }

    /// Remove every entry, keeping the capacity.
    pub fn clear(&mut self) {
        let g = self.reentrancy.enter();
        self.slots.clear();
        // Take the nodes out first so user `Drop` runs outside the guard.
        let old = core::mem::replace(
            &mut self.order,
            OrderList::with_capacity(self.slots.capacity()),
        );
        drop(g);
        drop(old);
    }
}

impl<K, V, S> OrderedTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Create a table with `capacity` slots hashing keys with `hasher`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            slots: SlotStore::new(capacity),
            order: OrderList::with_capacity(capacity),
            reentrancy: DebugReentrancy::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn find_slot<Q>(&self, hash: u64, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let order = &self.order;
        self.slots.locate(hash, |node| {
            order.key(node).map(|k| k.borrow() == q).unwrap_or(false)
        })
    }

    /// Insert or update `key`.
    ///
    /// A new key is appended as the newest entry; an existing key gets its
    /// value replaced, is moved to the newest position, and the old value is
    /// returned. Fails with [`TableError::TableFull`] only for a new key when
    /// every slot is occupied.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        let g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        match self.find_slot(hash, &key) {
            Probe::Found(_, node) => {
                let old = self
                    .order
                    .value_mut(node)
                    .map(|v| core::mem::replace(v, value));
                self.order.move_to_tail(node);
                drop(g);
                drop(key);
                Ok(old)
            }
            Probe::Vacant(idx) => {
                debug_assert!(self.order.len() < self.slots.capacity());
                let node = self.order.append_tail(key, value);
                self.slots.put(idx, Occupant { hash, node });
                Ok(None)
            }
            Probe::Exhausted => {
                tracing::debug!(
                    capacity = self.slots.capacity(),
                    "insert rejected: table full"
                );
                Err(TableError::TableFull)
            }
        }
    }

    /// Value stored under `q`. Does not change order.
    pub fn get<Q>(&self, q: &Q) -> Result<&V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        match self.find_slot(hash, q) {
            Probe::Found(_, node) => self.order.value(node).ok_or(TableError::KeyNotFound),
            Probe::Vacant(_) | Probe::Exhausted => Err(TableError::KeyNotFound),
        }
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        matches!(self.find_slot(hash, q), Probe::Found(..))
    }

    /// Remove `q` and return its value.
    ///
    /// The freed slot is followed by a cluster rehash, so cost is
    /// proportional to the length of the cluster after the slot.
    pub fn remove<Q>(&mut self, q: &Q) -> Result<V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let idx = match self.find_slot(hash, q) {
            Probe::Found(idx, _) => idx,
            Probe::Vacant(_) | Probe::Exhausted => return Err(TableError::KeyNotFound),
        };
        let occ = self.slots.take(idx).ok_or(TableError::KeyNotFound)?;
        let (key, value) = self
            .order
            .unlink(occ.node)
            .ok_or(TableError::KeyNotFound)?;
        let stats = self.slots.rehash_cluster(idx);
        tracing::trace!(
            freed = idx,
            scanned = stats.scanned,
            relocated = stats.relocated,
            "cluster rehashed"
        );
        // Structure is consistent again; user `Drop` may reenter.
        drop(g);
        drop(key);
        Ok(value)
    }

    /// Assert every structural invariant; used by tests after each step.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        use crate::order_list::NodeKey;
        use std::collections::HashSet;

        let len = self.order.len();
        assert!(len <= self.slots.capacity(), "count exceeds capacity");

        let mut slot_nodes: HashSet<NodeKey> = HashSet::new();
        for (idx, occ) in self.slots.iter() {
            let key = self.order.key(occ.node).expect("slot refers to a live node");
            assert_eq!(self.make_hash(key), occ.hash, "stale digest at {idx}");
            assert!(slot_nodes.insert(occ.node), "node held by two slots");
            // No empty slot between home and actual position.
            let mut i = self.slots.home(occ.hash);
            while i != idx {
                assert!(self.slots.get(i).is_some(), "hole at {i} before {idx}");
                i = self.slots.next(i);
            }
            // First equal key on the chain is this one: keys are unique.
            assert_eq!(self.find_slot(occ.hash, key), Probe::Found(idx, occ.node));
        }
        assert_eq!(slot_nodes.len(), len, "slot count != entry count");

        let listed: Vec<NodeKey> = self.order.iter().take(len + 1).map(|(n, _, _)| n).collect();
        assert_eq!(listed.len(), len, "order list length mismatch or cycle");
        assert_eq!(self.order.head(), listed.first().copied());
        assert_eq!(self.order.tail(), listed.last().copied());
        let listed: HashSet<NodeKey> = listed.into_iter().collect();
        assert_eq!(listed, slot_nodes, "order list and slots disagree");
    }
}

impl<K, V, S> fmt::Debug for OrderedTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over entries from oldest to newest.
pub struct Iter<'a, K, V> {
    inner: order_list::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a OrderedTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
