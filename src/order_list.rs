//! OrderList: doubly linked insertion/update order over a generational arena.
//!
//! Nodes live in a `SlotMap` and link to each other by `NodeKey`, never by
//! reference. The slot store refers to nodes by the same key, so both
//! structures can reach a node without shared ownership. Removed keys are
//! recycled by the arena's free list; the generation bump keeps a stale
//! key from resolving to the node that reuses its slot.

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to an entry's order node.
    pub(crate) struct NodeKey;
}

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

#[derive(Debug)]
pub(crate) struct OrderList<K, V> {
    nodes: SlotMap<NodeKey, Node<K, V>>,
    head: Option<NodeKey>, // oldest
    tail: Option<NodeKey>, // newest
}

impl<K, V> OrderList<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn head(&self) -> Option<NodeKey> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<NodeKey> {
        self.tail
    }

    pub(crate) fn key(&self, node: NodeKey) -> Option<&K> {
        self.nodes.get(node).map(|n| &n.key)
    }

    pub(crate) fn value(&self, node: NodeKey) -> Option<&V> {
        self.nodes.get(node).map(|n| &n.value)
    }

    pub(crate) fn value_mut(&mut self, node: NodeKey) -> Option<&mut V> {
        self.nodes.get_mut(node).map(|n| &mut n.value)
    }

    /// Allocate a node for `(key, value)` and link it as the new tail.
    pub(crate) fn append_tail(&mut self, key: K, value: V) -> NodeKey {
        let node = self.nodes.insert(Node {
            key,
            value,
            prev: None,
            next: None,
        });
        self.link_tail(node);
        node
    }

    /// Unlink `node` and release it, returning the owned key and value.
    pub(crate) fn unlink(&mut self, node: NodeKey) -> Option<(K, V)> {
        if !self.nodes.contains_key(node) {
            return None;
        }
        self.detach(node);
        self.nodes.remove(node).map(|n| (n.key, n.value))
    }

    /// Move `node` to the tail. No-op if it is already the tail or stale.
    pub(crate) fn move_to_tail(&mut self, node: NodeKey) {
        if self.tail == Some(node) || !self.nodes.contains_key(node) {
            return;
        }
        self.detach(node);
        self.link_tail(node);
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.nodes.len(),
        }
    }

    // Both helpers assume `node` is live in the arena.

    fn link_tail(&mut self, node: NodeKey) {
        let old_tail = self.tail;
        if let Some(n) = self.nodes.get_mut(node) {
            n.prev = old_tail;
            n.next = None;
        }
        match old_tail.and_then(|t| self.nodes.get_mut(t)) {
            Some(t) => t.next = Some(node),
            None => self.head = Some(node),
        }
        self.tail = Some(node);
    }

    fn detach(&mut self, node: NodeKey) {
        let (prev, next) = match self.nodes.get_mut(node) {
            Some(n) => (n.prev.take(), n.next.take()),
            None => return,
        };
        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.nodes.get_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
    }
}

/// Head-to-tail iterator over `(NodeKey, &K, &V)`.
pub(crate) struct Iter<'a, K, V> {
    list: &'a OrderList<K, V>,
    cursor: Option<NodeKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (NodeKey, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.cursor?;
        let node = self.list.nodes.get(at)?;
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((at, &node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
