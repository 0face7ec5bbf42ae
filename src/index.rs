use std::hash::Hash;
use std::sync::Arc;
use ahash::AHashMap;

/// Sentinel indices in the `nodes` arena.
const HEAD: usize = 0; // most-recently-used end
const TAIL: usize = 1; // least-recently-used end
const NULL: usize = usize::MAX;

/// A cached key/value pair together with its weighted size.
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: Arc<V>,
    pub(crate) size: u64,
}

struct Node<K, V> {
    /// `None` for the HEAD and TAIL sentinels and for free slots.
    entry: Option<Entry<K, V>>,
    /// Index toward HEAD (more recently used).
    prev: usize,
    /// Index toward TAIL (less recently used).
    next: usize,
}

impl<K, V> Node<K, V> {
    fn sentinel(prev: usize, next: usize) -> Self {
        Node {
            entry: None,
            prev,
            next,
        }
    }
}

/// Recency-ordered entry index: a hash map from key to a slot in an
/// index-linked arena list, plus the running sum of entry sizes.
///
/// Not synchronised; the owning [`Cache`](crate::Cache) wraps it in a lock.
pub(crate) struct LruIndex<K, V> {
    /// Index 0 = HEAD sentinel, 1 = TAIL sentinel, 2+ = real entries.
    nodes: Vec<Node<K, V>>,
    map: AHashMap<K, usize>,
    /// Indices of freed (reusable) slots.
    free_list: Vec<usize>,
    /// Exact `Σ size`; wide enough that no number of `u64` sizes overflows it.
    total_size: u128,
}

impl<K: Hash + Eq + Clone, V> LruIndex<K, V> {
    pub(crate) fn with_capacity(entries: usize) -> Self {
        let mut nodes = Vec::with_capacity(entries.saturating_add(2));
        nodes.push(Node::sentinel(NULL, TAIL));
        nodes.push(Node::sentinel(HEAD, NULL));

        LruIndex {
            nodes,
            map: AHashMap::with_capacity(entries),
            free_list: Vec::new(),
            total_size: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    /// `Σ size`, saturated to `u64::MAX`.
    #[inline]
    pub(crate) fn total_size(&self) -> u64 {
        u64::try_from(self.total_size).unwrap_or(u64::MAX)
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the value for `key` and marks it most-recently-used.
    pub(crate) fn get(&mut self, key: &K) -> Option<&Arc<V>> {
        let idx = *self.map.get(key)?;
        self.move_to_front(idx);
        self.nodes[idx].entry.as_ref().map(|e| &e.value)
    }

    /// Returns the value for `key` without touching recency.
    pub(crate) fn peek(&self, key: &K) -> Option<&Arc<V>> {
        let idx = *self.map.get(key)?;
        self.nodes[idx].entry.as_ref().map(|e| &e.value)
    }

    /// Writes `value` for `key` at the head of the list.
    ///
    /// An existing entry is updated in place; its key (the one passed in,
    /// which the map did not need) and previous value are handed back.
    pub(crate) fn upsert(&mut self, key: K, value: Arc<V>, size: u64) -> Option<(K, Arc<V>)> {
        if let Some(&idx) = self.map.get(&key) {
            let entry = self.nodes[idx].entry.as_mut()?;
            let old_value = std::mem::replace(&mut entry.value, value);
            self.total_size = self.total_size - u128::from(entry.size) + u128::from(size);
            entry.size = size;
            self.move_to_front(idx);
            return Some((key, old_value));
        }

        self.total_size += u128::from(size);
        let idx = self.alloc_node(Entry {
            key: key.clone(),
            value,
            size,
        });
        self.map.insert(key, idx);
        self.link_after_head(idx);
        None
    }

    /// Unlinks and returns the entry for `key`.
    pub(crate) fn remove(&mut self, key: &K) -> Option<Entry<K, V>> {
        let idx = self.map.remove(key)?;
        self.release(idx)
    }

    /// Unlinks and returns the least-recently-used entry.
    pub(crate) fn remove_back(&mut self) -> Option<Entry<K, V>> {
        let lru_idx = self.nodes[TAIL].prev;
        if lru_idx == HEAD {
            return None;
        }
        let entry = self.release(lru_idx)?;
        self.map.remove(&entry.key);
        Some(entry)
    }

    /// Evicts from the cold end until `total_size <= capacity`.
    ///
    /// The head entry is never evicted, so an entry larger than `capacity`
    /// survives its own write as the sole resident. Evicted entries are
    /// returned coldest first.
    pub(crate) fn trim(&mut self, capacity: u64) -> Vec<Entry<K, V>> {
        let mut evicted = Vec::new();
        while self.total_size > u128::from(capacity) && self.map.len() > 1 {
            match self.remove_back() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        evicted
    }

    /// Removes every entry, coldest first.
    pub(crate) fn drain(&mut self) -> Vec<Entry<K, V>> {
        let mut drained = Vec::with_capacity(self.map.len());
        while let Some(entry) = self.remove_back() {
            drained.push(entry);
        }
        self.nodes.truncate(2);
        self.free_list.clear();
        drained
    }

    /// Links `idx` immediately after the HEAD sentinel (marks it most-recently-used).
    fn link_after_head(&mut self, idx: usize) {
        let old_first = self.nodes[HEAD].next;
        self.nodes[idx].prev = HEAD;
        self.nodes[idx].next = old_first;
        self.nodes[HEAD].next = idx;
        self.nodes[old_first].prev = idx;
    }

    /// Detaches `idx` from its current position in the list.
    fn unlink(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[idx].prev = NULL;
        self.nodes[idx].next = NULL;
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.nodes[HEAD].next != idx {
            self.unlink(idx);
            self.link_after_head(idx);
        }
    }

    /// Allocates a node for `entry`, reusing a freed slot when available.
    fn alloc_node(&mut self, entry: Entry<K, V>) -> usize {
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx].entry = Some(entry);
            idx
        } else {
            self.nodes.push(Node {
                entry: Some(entry),
                prev: NULL,
                next: NULL,
            });
            self.nodes.len() - 1
        }
    }

    /// Unlinks slot `idx`, frees it and settles the size account.
    /// The map entry is the caller's responsibility.
    fn release(&mut self, idx: usize) -> Option<Entry<K, V>> {
        self.unlink(idx);
        let entry = self.nodes[idx].entry.take()?;
        self.free_list.push(idx);
        self.total_size -= u128::from(entry.size);
        Some(entry)
    }
}
