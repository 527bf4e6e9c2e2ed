//! Array-backed binary heap keyed by an explicit priority.
//!
//! Unlike `std::collections::BinaryHeap`, the priority is stored next to the
//! payload instead of being derived from it, the heap direction (min or max)
//! is chosen at construction, and the two operations a K-way merge leans on
//! are first class:
//!
//! - [`Heap::replace`] overwrites the root and sifts it down. A merge that
//!   pops one run's head and immediately pushes that run's successor pays a
//!   single sift-down instead of a sift-down plus a sift-up.
//! - [`Heap::fix`] restores the heap property after the priority at one index
//!   was changed through [`Heap::get_mut`].
//!
//! # Stability
//!
//! The heap is **unstable**: entries with equal priorities come out in no
//! particular order. Callers that need a tie-break must fold it into `P`.
//!
//! # Example
//!
//! ```rust
//! use basin_heap::Heap;
//!
//! let mut heap = Heap::new();
//! heap.insert(10, "low");
//! heap.insert(1, "high");
//! heap.insert(5, "mid");
//!
//! assert_eq!(heap.pop(), Some((1, "high")));
//! assert_eq!(heap.peek(), Some((&5, &"mid")));
//! ```

#![warn(missing_docs)]

use core::fmt;
use core::mem;

/// Which end of the priority order sits at the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeapKind {
    /// Smallest priority first.
    #[default]
    Min,
    /// Largest priority first.
    Max,
}

#[derive(Clone)]
struct Entry<P, T> {
    priority: P,
    value: T,
}

/// Binary heap of `(priority, value)` pairs.
#[derive(Clone)]
pub struct Heap<P, T> {
    data: Vec<Entry<P, T>>,
    kind: HeapKind,
}

impl<P: Ord, T> Heap<P, T> {
    /// Creates an empty min-heap.
    pub fn new() -> Self {
        Self::with_capacity(0, HeapKind::Min)
    }

    /// Creates an empty max-heap.
    pub fn new_max() -> Self {
        Self::with_capacity(0, HeapKind::Max)
    }

    /// Creates an empty heap of the given kind with room for `capacity` entries.
    pub fn with_capacity(capacity: usize, kind: HeapKind) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            kind,
        }
    }

    /// Returns whether this is a min- or a max-heap.
    pub fn kind(&self) -> HeapKind {
        self.kind
    }

    /// Number of entries in the heap.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the heap holds no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Adds `value` with `priority`. O(log n).
    pub fn insert(&mut self, priority: P, value: T) {
        self.data.push(Entry { priority, value });
        self.up(self.data.len() - 1);
    }

    /// Overwrites the root with `(priority, value)` and returns the old root.
    ///
    /// Equivalent to `pop` followed by `insert`, but only sifts down. On an
    /// empty heap this is a plain `insert` and returns `None`.
    pub fn replace(&mut self, priority: P, value: T) -> Option<(P, T)> {
        if self.data.is_empty() {
            self.insert(priority, value);
            return None;
        }
        let old = mem::replace(&mut self.data[0], Entry { priority, value });
        self.down(0, self.data.len());
        Some((old.priority, old.value))
    }

    /// Mutable access to the entry at `index` of the backing array.
    ///
    /// Changing the priority breaks the heap property until [`Heap::fix`] is
    /// called with the same index.
    pub fn get_mut(&mut self, index: usize) -> Option<(&mut P, &mut T)> {
        self.data
            .get_mut(index)
            .map(|e| (&mut e.priority, &mut e.value))
    }

    /// Re-establishes heap order after the priority at `index` changed.
    ///
    /// Out-of-range indices are ignored.
    pub fn fix(&mut self, index: usize) {
        if index >= self.data.len() {
            return;
        }
        if !self.down(index, self.data.len()) {
            self.up(index);
        }
    }

    /// Removes and returns the root. O(log n).
    ///
    /// The root is moved out of the backing array, so the heap keeps no
    /// reference to the returned payload.
    pub fn pop(&mut self) -> Option<(P, T)> {
        if self.data.is_empty() {
            return None;
        }
        let root = self.data.swap_remove(0);
        let n = self.data.len();
        if n > 1 {
            self.down(0, n);
        }
        Some((root.priority, root.value))
    }

    /// Removes the root and discards it. Returns `self` for chaining.
    pub fn discard(&mut self) -> &mut Self {
        self.pop();
        self
    }

    /// Returns the root without removing it. O(1).
    pub fn peek(&self) -> Option<(&P, &T)> {
        self.data.first().map(|e| (&e.priority, &e.value))
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Iterates over entries in backing-array order (not priority order).
    pub fn iter(&self) -> Iter<'_, P, T> {
        Iter {
            inner: self.data.iter(),
        }
    }

    /// Lazily pops entries in priority order until the heap is empty.
    ///
    /// Entries that were not pulled when the iterator is dropped stay in the
    /// heap.
    pub fn drain(&mut self) -> Drain<'_, P, T> {
        Drain { heap: self }
    }

    fn less(&self, i: usize, j: usize) -> bool {
        let (a, b) = (&self.data[i].priority, &self.data[j].priority);
        match self.kind {
            HeapKind::Min => a < b,
            HeapKind::Max => a > b,
        }
    }

    fn up(&mut self, mut j: usize) {
        while j > 0 {
            let parent = (j - 1) / 2;
            if !self.less(j, parent) {
                break;
            }
            self.data.swap(parent, j);
            j = parent;
        }
    }

    /// Sifts `i0` down within `data[..n]`; returns true if it moved.
    fn down(&mut self, i0: usize, n: usize) -> bool {
        let mut i = i0;
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let mut child = left;
            let right = left + 1;
            if right < n && self.less(right, left) {
                child = right;
            }
            if !self.less(child, i) {
                break;
            }
            self.data.swap(i, child);
            i = child;
        }
        i > i0
    }

    fn heapify(&mut self) {
        let n = self.data.len();
        for i in (0..n / 2).rev() {
            self.down(i, n);
        }
    }
}

impl<P: Ord, T> Default for Heap<P, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: fmt::Debug, T: fmt::Debug> fmt::Debug for Heap<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("kind", &self.kind)
            .field(
                "entries",
                &self
                    .data
                    .iter()
                    .map(|e| (&e.priority, &e.value))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builds a min-heap in O(n).
impl<P: Ord, T> FromIterator<(P, T)> for Heap<P, T> {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut heap = Heap::new();
        heap.data = iter
            .into_iter()
            .map(|(priority, value)| Entry { priority, value })
            .collect();
        heap.heapify();
        heap
    }
}

impl<P: Ord, T> Extend<(P, T)> for Heap<P, T> {
    fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
        for (priority, value) in iter {
            self.insert(priority, value);
        }
    }
}

/// Iterator over heap entries in arbitrary order. See [`Heap::iter`].
pub struct Iter<'a, P, T> {
    inner: core::slice::Iter<'a, Entry<P, T>>,
}

impl<'a, P, T> Iterator for Iter<'a, P, T> {
    type Item = (&'a P, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (&e.priority, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Popping iterator returned by [`Heap::drain`].
pub struct Drain<'a, P: Ord, T> {
    heap: &'a mut Heap<P, T>,
}

impl<P: Ord, T> Iterator for Drain<'_, P, T> {
    type Item = (P, T);

    fn next(&mut self) -> Option<Self::Item> {
        self.heap.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len(), Some(self.heap.len()))
    }
}
