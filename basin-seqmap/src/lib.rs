//! Insertion-ordered hash map.
//!
//! `SequencedMap` keeps its entries in an append-only slot array and a hash
//! index from key to slot. Iteration walks the slot array, so entries come
//! out in the order their keys were first inserted.
//!
//! # Layout
//!
//! - **Index**: `HashMap<K, usize>` from key to slot position.
//! - **Slots**: `Vec<Option<(K, V)>>`. `None` is a tombstone.
//! - **Deletes**: drop the index entry and turn the slot into a tombstone.
//!   The payload is released right away; only the empty slot lingers.
//! - **Compaction**: once tombstones exceed the compaction threshold *and*
//!   make up more than half of the slots, the array is rewritten without
//!   them. Survivors keep their relative order, so compaction is invisible to
//!   iteration. Amortized cost is O(1) per delete.
//!
//! Updating an existing key replaces its value in place; it keeps its
//! original position. A key that is removed and inserted again goes to the
//! end.
//!
//! The map is single-threaded. Concurrent users wrap it in a lock, as
//! `basin-map` does once per shard.
//!
//! # Example
//!
//! ```rust
//! use basin_seqmap::SequencedMap;
//!
//! let mut map = SequencedMap::new();
//! map.insert("b", 2);
//! map.insert("a", 1);
//! map.insert("b", 20);
//!
//! let pairs: Vec<_> = map.iter().collect();
//! assert_eq!(pairs, vec![(&"b", &20), (&"a", &1)]);
//! ```

#![warn(missing_docs)]

use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use foldhash::fast::FixedState;
use std::collections::HashMap;
use tracing::trace;

/// Default number of tombstones a map tolerates before it considers compacting.
pub const DEFAULT_COMPACT_THRESHOLD: usize = 1024;

/// Insertion-ordered hash map with tombstone deletes.
pub struct SequencedMap<K, V, S = FixedState> {
    index: HashMap<K, usize, S>,
    slots: Vec<Option<(K, V)>>,
    deleted: usize,
    compact_threshold: usize,
}

impl<K, V> SequencedMap<K, V, FixedState>
where
    K: Hash + Eq + Clone,
{
    /// Creates an empty map hashing with FoldHash.
    pub fn new() -> Self {
        Self::with_capacity_and_hasher(0, FixedState::default())
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FixedState::default())
    }
}

impl<K, V, S> SequencedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Creates an empty map using `hasher` for the key index.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    /// Creates an empty map with room for `capacity` entries and a custom hasher.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            index: HashMap::with_capacity_and_hasher(capacity, hasher),
            slots: Vec::with_capacity(capacity),
            deleted: 0,
            compact_threshold: DEFAULT_COMPACT_THRESHOLD,
        }
    }

    /// Sets how many tombstones are tolerated before compaction is considered.
    ///
    /// Compaction runs once the tombstone count is above `threshold` and also
    /// above half of the slot array.
    pub fn with_compact_threshold(mut self, threshold: usize) -> Self {
        self.compact_threshold = threshold;
        self
    }

    /// Returns the configured compaction threshold.
    pub fn compact_threshold(&self) -> usize {
        self.compact_threshold
    }

    /// Returns a reference to the value for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.slots[idx].as_ref().map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value for `key`.
    ///
    /// Mutating through the reference does not change the key's position.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        self.slots[idx].as_mut().map(|(_, v)| v)
    }

    /// Returns the value for `key`, or `default` when the key is absent.
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns true if `key` has a live entry.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Inserts `value` under `key`, returning the previous value.
    ///
    /// A new key is appended after every existing entry. An existing key
    /// keeps its position; only the value changes.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&idx) = self.index.get(&key) {
            if let Some((_, slot)) = self.slots[idx].as_mut() {
                return Some(core::mem::replace(slot, value));
            }
        }

        self.index.insert(key.clone(), self.slots.len());
        self.slots.push(Some((key, value)));
        None
    }

    /// Chaining form of [`SequencedMap::insert`].
    pub fn set(&mut self, key: K, value: V) -> &mut Self {
        self.insert(key, value);
        self
    }

    /// Removes `key`, returning its value.
    ///
    /// The slot becomes a tombstone and may trigger compaction.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        self.take_slot(idx).map(|(_, v)| v)
    }

    /// Chaining form of [`SequencedMap::remove`].
    pub fn unset<Q>(&mut self, key: &Q) -> &mut Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(key);
        self
    }

    /// Removes and returns the oldest entry.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let idx = self.slots.iter().position(Option::is_some)?;
        self.pop_at(idx)
    }

    /// Removes and returns the newest entry.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let idx = self.slots.iter().rposition(Option::is_some)?;
        self.pop_at(idx)
    }

    fn pop_at(&mut self, idx: usize) -> Option<(K, V)> {
        let (key, value) = self.slots[idx].take()?;
        self.index.remove(&key);
        self.deleted += 1;
        self.maybe_compact();
        Some((key, value))
    }

    /// Tombstones `idx`. The caller has already dropped the index entry.
    fn take_slot(&mut self, idx: usize) -> Option<(K, V)> {
        let taken = self.slots[idx].take();
        if taken.is_some() {
            self.deleted += 1;
            self.maybe_compact();
        }
        taken
    }

    fn maybe_compact(&mut self) {
        if self.deleted > self.compact_threshold && self.deleted * 2 > self.slots.len() {
            self.compact();
        }
    }

    /// Rewrites the slot array without tombstones.
    ///
    /// Live entries keep their relative order; every survivor is reindexed.
    pub fn compact(&mut self) {
        if self.deleted == 0 {
            return;
        }

        let before = self.slots.len();
        self.slots.retain(Option::is_some);
        for (pos, slot) in self.slots.iter().enumerate() {
            if let Some((key, _)) = slot {
                if let Some(idx) = self.index.get_mut(key) {
                    *idx = pos;
                }
            }
        }
        self.deleted = 0;

        trace!(before, after = self.slots.len(), "compacted sequenced map");
    }

    /// Removes every entry, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.deleted = 0;
    }

    /// Returns a reference to the map's hasher.
    pub fn hasher(&self) -> &S {
        self.index.hasher()
    }
}

impl<K, V, S> SequencedMap<K, V, S> {
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Length of the slot array, tombstones included.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of tombstones waiting for compaction.
    pub fn deleted_count(&self) -> usize {
        self.deleted
    }

    /// Iterates `(key, value)` in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.slots.iter(),
            remaining: self.index.len(),
        }
    }

    /// Iterates `(key, value)` newest first.
    pub fn iter_rev(&self) -> core::iter::Rev<Iter<'_, K, V>> {
        self.iter().rev()
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { iter: self.iter() }
    }

    /// Iterates values in insertion order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { iter: self.iter() }
    }
}

impl<K, V> Default for SequencedMap<K, V, FixedState>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, S: Clone> Clone for SequencedMap<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            index: self.index.clone(),
            slots: self.slots.clone(),
            deleted: self.deleted,
            compact_threshold: self.compact_threshold,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for SequencedMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for SequencedMap<K, V, FixedState>
where
    K: Hash + Eq + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity(iter.size_hint().0);
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for SequencedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a SequencedMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for SequencedMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            slots: self.slots.into_iter(),
        }
    }
}

/// Iterator over live entries in slot order.
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Option<(K, V)>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.slots.by_ref() {
            if let Some((k, v)) = slot {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(slot) = self.slots.next_back() {
            if let Some((k, v)) = slot {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over keys in slot order.
pub struct Keys<'a, K, V> {
    iter: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Iterator over values in slot order.
pub struct Values<'a, K, V> {
    iter: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Owning iterator in slot order.
pub struct IntoIter<K, V> {
    slots: std::vec::IntoIter<Option<(K, V)>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots.by_ref().flatten().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut map = SequencedMap::new();
        assert_eq!(map.insert("a", 1), None);
        assert_eq!(map.insert("b", 2), None);
        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.get("b"), Some(&2));
        assert_eq!(map.get("c"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_update_keeps_position() {
        let mut map = SequencedMap::new();
        map.insert("x", 1);
        map.insert("y", 2);
        assert_eq!(map.insert("x", 10), Some(1));

        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert_eq!(map.slot_count(), 2);
    }

    #[test]
    fn test_reinsert_after_remove_moves_to_end() {
        let mut map = SequencedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(map.remove("a"), Some(1));
        map.insert("a", 3);

        let pairs: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![("b", 2), ("a", 3)]);
    }

    #[test]
    fn test_remove_missing() {
        let mut map: SequencedMap<i32, i32> = SequencedMap::new();
        assert_eq!(map.remove(&7), None);
        assert_eq!(map.deleted_count(), 0);
    }

    #[test]
    fn test_remove_leaves_tombstone() {
        let mut map = SequencedMap::new();
        for i in 0..4 {
            map.insert(i, i);
        }
        map.remove(&1);

        assert_eq!(map.len(), 3);
        assert_eq!(map.slot_count(), 4);
        assert_eq!(map.deleted_count(), 1);
        assert!(!map.contains_key(&1));
    }

    #[test]
    fn test_remove_drops_payload_immediately() {
        use std::rc::Rc;

        let payload = Rc::new(());
        let mut map = SequencedMap::new();
        map.insert(1, Rc::clone(&payload));
        map.insert(2, Rc::clone(&payload));
        drop(map.remove(&1));

        assert_eq!(map.slot_count(), 2);
        assert_eq!(Rc::strong_count(&payload), 2);
    }

    #[test]
    fn test_auto_compaction() {
        let mut map = SequencedMap::new().with_compact_threshold(4);
        for i in 0..10 {
            map.insert(i, i);
        }
        // 5 tombstones out of 10 slots: not more than half yet.
        for i in 0..5 {
            map.remove(&i);
        }
        assert_eq!(map.deleted_count(), 5);
        assert_eq!(map.slot_count(), 10);

        // 6 > 4 and 6 * 2 > 10.
        map.remove(&5);
        assert_eq!(map.deleted_count(), 0);
        assert_eq!(map.slot_count(), 4);

        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![6, 7, 8, 9]);
        for k in 6..10 {
            assert_eq!(map.get(&k), Some(&k));
        }
    }

    #[test]
    fn test_default_threshold_defers_compaction() {
        let mut map = SequencedMap::new();
        for i in 0..100 {
            map.insert(i, ());
        }
        for i in 0..90 {
            map.remove(&i);
        }
        assert_eq!(map.compact_threshold(), DEFAULT_COMPACT_THRESHOLD);
        assert_eq!(map.deleted_count(), 90);
        assert_eq!(map.slot_count(), 100);
    }

    #[test]
    fn test_manual_compact_reindexes() {
        let mut map = SequencedMap::new();
        for i in 0..6 {
            map.insert(i, i * 10);
        }
        map.remove(&0);
        map.remove(&3);
        map.compact();

        assert_eq!(map.slot_count(), 4);
        assert_eq!(map.get(&5), Some(&50));
        map.insert(4, 400);
        map.remove(&1);
        let pairs: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![(2, 20), (4, 400), (5, 50)]);
    }

    #[test]
    fn test_iter_rev_and_pops() {
        let mut map: SequencedMap<_, _> = [(1, 'a'), (2, 'b'), (3, 'c')].into_iter().collect();
        let rev: Vec<_> = map.iter_rev().map(|(k, _)| *k).collect();
        assert_eq!(rev, vec![3, 2, 1]);

        assert_eq!(map.pop_first(), Some((1, 'a')));
        assert_eq!(map.pop_last(), Some((3, 'c')));
        assert_eq!(map.pop_last(), Some((2, 'b')));
        assert_eq!(map.pop_first(), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_chaining_and_get_or() {
        let mut map = SequencedMap::new();
        map.set("a", 1).set("b", 2).unset("a");
        assert_eq!(map.get_or("a", &0), &0);
        assert_eq!(map.get_or("b", &0), &2);
    }

    #[test]
    fn test_get_mut_keeps_position() {
        let mut map = SequencedMap::new();
        map.insert("k1", 1);
        map.insert("k2", 2);
        *map.get_mut("k1").unwrap() += 100;
        let pairs: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![("k1", 101), ("k2", 2)]);
    }

    #[test]
    fn test_clear() {
        let mut map = SequencedMap::new();
        for i in 0..10 {
            map.insert(i, i);
        }
        map.remove(&3);
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.slot_count(), 0);
        assert_eq!(map.deleted_count(), 0);
        assert_eq!(map.iter().next(), None);
    }

    #[test]
    fn test_early_stop_has_no_side_effects() {
        let mut map = SequencedMap::new();
        for i in 0..5 {
            map.insert(i, i);
        }
        let first_two: Vec<_> = map.iter().take(2).map(|(k, _)| *k).collect();
        assert_eq!(first_two, vec![0, 1]);
        assert_eq!(map.len(), 5);
        assert_eq!(map.iter().count(), 5);
    }

    #[test]
    fn test_owned_into_iter_skips_tombstones() {
        let mut map = SequencedMap::new();
        for i in 0..5 {
            map.insert(i, i);
        }
        map.remove(&2);
        let owned: Vec<_> = map.into_iter().collect();
        assert_eq!(owned, vec![(0, 0), (1, 1), (3, 3), (4, 4)]);
    }

    #[test]
    fn test_string_keys_borrow_lookup() {
        let mut map = SequencedMap::new();
        map.insert("hello".to_string(), 1);
        map.insert("world".to_string(), 2);
        assert_eq!(map.get("hello"), Some(&1));
        assert!(map.contains_key("world"));
        assert_eq!(map.remove("hello"), Some(1));
    }
}
