//! Global-order iteration: a k-way merge of the shards by write ticket.
//!
//! Each shard contributes a cursor that remembers the last ticket taken from
//! it. The head of every live cursor sits in a min-heap keyed by ticket; the
//! root is the next item to yield. Refilling a cursor locks its shard for one
//! lookup and one clone, so a paused iterator holds no lock at all.

use crate::map::ShardedMap;
use basin_heap::{Heap, HeapKind};
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use tracing::trace;

#[derive(Debug, Clone, Copy)]
struct Cursor {
    /// Ticket of the last item pulled; the next pull resumes strictly after it.
    after: u64,
    live: bool,
}

/// Merge iterator yielding `(ticket, key, value)` in ascending ticket order.
///
/// Writes that land behind a cursor are not seen; writes ahead of it may be.
/// A key rewritten while the merge runs can therefore show up once per write.
/// A shard whose refill comes up empty is finished for this iteration: it is
/// not polled again, so anything written to it afterwards is missed.
pub struct Sequenced<'a, K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    map: &'a ShardedMap<K, V, S>,
    cursors: Vec<Cursor>,
    heap: Heap<u64, (usize, K, V)>,
    primed: bool,
}

impl<'a, K, V, S> Sequenced<'a, K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    pub(crate) fn new(map: &'a ShardedMap<K, V, S>) -> Self {
        Self {
            map,
            cursors: Vec::new(),
            heap: Heap::new(),
            primed: false,
        }
    }

    fn prime(&mut self) {
        let shards = self.map.shard_count();
        self.cursors = vec![Cursor { after: 0, live: true }; shards];
        self.heap = Heap::with_capacity(shards, HeapKind::Min);
        for shard in 0..shards {
            if let Some((seq, key, value)) = self.pull(shard) {
                self.heap.insert(seq, (shard, key, value));
            }
        }
        self.primed = true;
    }

    /// Takes the next entry from `shard` after its cursor.
    fn pull(&mut self, shard: usize) -> Option<(u64, K, V)> {
        let cursor = &mut self.cursors[shard];
        if !cursor.live {
            return None;
        }
        let next = self.map.shards[shard].read().next_after(cursor.after);
        match &next {
            Some((seq, ..)) => cursor.after = *seq,
            None => cursor.live = false,
        }
        next
    }

    /// Ends the merge early. Later calls to `next` return `None`.
    ///
    /// Called on drop; explicit calls are only needed to give up the
    /// buffered entries before the iterator goes out of scope.
    pub fn stop(&mut self) {
        let cursors = self.cursors.iter().filter(|c| c.live).count();
        let buffered = self.heap.len();
        for cursor in &mut self.cursors {
            cursor.live = false;
        }
        self.heap.clear();
        self.primed = true;
        if cursors > 0 || buffered > 0 {
            trace!(cursors, buffered, "global-order iteration stopped early");
        }
    }
}

impl<K, V, S> Iterator for Sequenced<'_, K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    type Item = (u64, K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.primed {
            self.prime();
        }
        let (_, &(shard, ..)) = self.heap.peek()?;
        let head = match self.pull(shard) {
            Some((seq, key, value)) => self.heap.replace(seq, (shard, key, value)),
            None => self.heap.pop(),
        };
        head.map(|(seq, (_, key, value))| (seq, key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len(), None)
    }
}

impl<K, V, S> FusedIterator for Sequenced<'_, K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
}

impl<K, V, S> Drop for Sequenced<'_, K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn drop(&mut self) {
        self.stop();
    }
}

impl<K, V, S> fmt::Debug for Sequenced<'_, K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequenced")
            .field("primed", &self.primed)
            .field("live_shards", &self.cursors.iter().filter(|c| c.live).count())
            .field("buffered", &self.heap.len())
            .finish()
    }
}

macro_rules! projection {
    ($(#[$doc:meta])* $name:ident, $item:ty, |$seq:pat_param, $k:pat_param, $v:pat_param| $out:expr) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name<'a, K, V, S>
        where
            K: Hash + Eq + Clone,
            V: Clone,
            S: BuildHasher,
        {
            inner: Sequenced<'a, K, V, S>,
        }

        impl<'a, K, V, S> $name<'a, K, V, S>
        where
            K: Hash + Eq + Clone,
            V: Clone,
            S: BuildHasher,
        {
            pub(crate) fn new(inner: Sequenced<'a, K, V, S>) -> Self {
                Self { inner }
            }

            /// Ends the merge early. See [`Sequenced::stop`].
            pub fn stop(&mut self) {
                self.inner.stop();
            }
        }

        impl<K, V, S> Iterator for $name<'_, K, V, S>
        where
            K: Hash + Eq + Clone,
            V: Clone,
            S: BuildHasher,
        {
            type Item = $item;

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                self.inner.next().map(|($seq, $k, $v)| $out)
            }

            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }
        }

        impl<K, V, S> FusedIterator for $name<'_, K, V, S>
        where
            K: Hash + Eq + Clone,
            V: Clone,
            S: BuildHasher,
        {
        }
    };
}

projection!(
    /// Entries in global write order. Created by
    /// [`ShardedMap::iter_in_global_order`].
    GlobalOrder, (K, V), |_, k, v| (k, v)
);
projection!(
    /// Keys in global write order.
    Keys, K, |_, k, _| k
);
projection!(
    /// Values in global write order.
    Values, V, |_, _, v| v
);
