//! One shard: an insertion-ordered store plus a ticket index over it.

use basin_seqmap::SequencedMap;
use core::borrow::Borrow;
use core::hash::Hash;
use core::ops::Bound;
use foldhash::fast::FixedState;
use std::collections::BTreeMap;

/// Seed for the per-shard key index. Every key in a shard shares the low
/// bits of its routing hash, so the index must not reuse the routing hasher.
const STORE_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// A stored value and the ticket of the write that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Entry<V> {
    pub(crate) value: V,
    pub(crate) sequence: u64,
}

/// Shard contents. Always accessed under the shard's lock.
///
/// `store` keeps first-insertion order. `by_ticket` maps each live entry's
/// ticket back to its key, so a merge cursor can resume at "first ticket
/// after N" whatever happened to slot positions in between.
pub(crate) struct Shard<K, V> {
    store: SequencedMap<K, Entry<V>>,
    by_ticket: BTreeMap<u64, K>,
}

impl<K, V> Shard<K, V>
where
    K: Hash + Eq + Clone,
{
    pub(crate) fn new(compact_threshold: usize) -> Self {
        Self {
            store: SequencedMap::with_hasher(FixedState::with_seed(STORE_SEED))
                .with_compact_threshold(compact_threshold),
            by_ticket: BTreeMap::new(),
        }
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&Entry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.get(key)
    }

    /// Writes `value` under ticket `sequence`; returns the replaced value.
    pub(crate) fn put(&mut self, key: K, value: V, sequence: u64) -> Option<V> {
        self.by_ticket.insert(sequence, key.clone());
        let old = self.store.insert(key, Entry { value, sequence })?;
        self.by_ticket.remove(&old.sequence);
        Some(old.value)
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let old = self.store.remove(key)?;
        self.by_ticket.remove(&old.sequence);
        Some(old.value)
    }

    /// The live entry with the smallest ticket strictly greater than `after`.
    pub(crate) fn next_after(&self, after: u64) -> Option<(u64, K, V)>
    where
        V: Clone,
    {
        let (&sequence, key) = self
            .by_ticket
            .range((Bound::Excluded(after), Bound::Unbounded))
            .next()?;
        let entry = self.store.get(key)?;
        debug_assert_eq!(entry.sequence, sequence);
        Some((sequence, key.clone(), entry.value.clone()))
    }

    pub(crate) fn len(&self) -> usize {
        self.store.len()
    }

    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.by_ticket.clear();
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &SequencedMap<K, Entry<V>> {
        &self.store
    }
}
