//! Slot store and linear prober.
//!
//! A fixed array of `capacity` slots, each empty or holding an [`Occupant`]:
//! the entry's precomputed digest and the handle of its order node. Keys
//! and values live in the order list; probing compares keys through a
//! caller-supplied equality closure.
//!
//! `locate` is the only probing routine. Lookup, insertion and cluster
//! relocation all go through it, which is what keeps every entry reachable
//! from its home index.

use crate::order_list::NodeKey;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Occupant {
    pub(crate) hash: u64,
    pub(crate) node: NodeKey,
}

/// Outcome of walking a probe sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Probe {
    /// Slot holding an equal key, and that key's node.
    Found(usize, NodeKey),
    /// First empty slot on the sequence; the key is absent.
    Vacant(usize),
    /// Every slot was visited and each held a different key.
    Exhausted,
}

/// Counters reported by [`SlotStore::rehash_cluster`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct RehashStats {
    /// Occupants visited after the freed slot.
    pub(crate) scanned: usize,
    /// Occupants that ended up in a different slot.
    pub(crate) relocated: usize,
}

#[derive(Debug)]
pub(crate) struct SlotStore {
    slots: Box<[Option<Occupant>]>,
}

impl SlotStore {
    /// Panics if `capacity` is zero.
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "slot store capacity must be non-zero");
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn home(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    #[inline]
    pub(crate) fn next(&self, idx: usize) -> usize {
        let n = idx + 1;
        if n == self.slots.len() {
            0
        } else {
            n
        }
    }

    /// Walk `home(hash), home(hash)+1, ..` (wrapping) and stop at the first
    /// slot that is empty or whose node satisfies `eq`.
    pub(crate) fn locate<F>(&self, hash: u64, mut eq: F) -> Probe
    where
        F: FnMut(NodeKey) -> bool,
    {
        let mut idx = self.home(hash);
        for _ in 0..self.slots.len() {
            match self.slots[idx] {
                None => return Probe::Vacant(idx),
                Some(occ) if occ.hash == hash && eq(occ.node) => {
                    return Probe::Found(idx, occ.node)
                }
                Some(_) => idx = self.next(idx),
            }
        }
        Probe::Exhausted
    }

    #[cfg(test)]
    pub(crate) fn get(&self, idx: usize) -> Option<Occupant> {
        self.slots.get(idx).copied().flatten()
    }

    /// Empty slot `idx`, returning what it held.
    #[inline]
    pub(crate) fn take(&mut self, idx: usize) -> Option<Occupant> {
        self.slots.get_mut(idx).and_then(Option::take)
    }

    #[inline]
    pub(crate) fn put(&mut self, idx: usize, occ: Occupant) {
        debug_assert!(self.slots[idx].is_none(), "put into occupied slot {idx}");
        self.slots[idx] = Some(occ);
    }

    /// Restore probe-chain integrity after slot `freed` was emptied.
    ///
    /// Walks forward from `freed` until the first empty slot (or a full
    /// wrap), taking each occupant out and placing it back through `locate`
    /// as if it were a fresh key. Only stored digests are consulted and node
    /// handles are moved unchanged, so the order list is untouched.
    pub(crate) fn rehash_cluster(&mut self, freed: usize) -> RehashStats {
        let mut stats = RehashStats::default();
        let mut idx = self.next(freed);
        while idx != freed {
            let Some(occ) = self.take(idx) else { break };
            stats.scanned += 1;
            // `idx` itself is now empty, so the probe always ends vacant.
            let to = match self.locate(occ.hash, |_| false) {
                Probe::Vacant(to) => to,
                Probe::Found(..) | Probe::Exhausted => idx,
            };
            if to != idx {
                stats.relocated += 1;
            }
            self.put(to, occ);
            idx = self.next(idx);
        }
        stats
    }

    pub(crate) fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, Occupant)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|occ| (i, occ)))
    }
}
