//! Terminal operations. Each one drives the pipeline, then checks the poison
//! cell before returning anything.

use crate::{Poison, Stream, StreamError};
use std::collections::HashMap;
use std::hash::Hash;

pub(crate) fn settle<R>(poison: &Poison, value: R) -> Result<R, StreamError> {
    match poison.error() {
        Some(err) => Err(StreamError::Failed(err)),
        None => Ok(value),
    }
}

impl<I: Iterator> Stream<I> {
    /// Collects every item into a `Vec`.
    pub fn collect(self) -> Result<Vec<I::Item>, StreamError> {
        self.collect_into()
    }

    /// Collects every item into any `FromIterator` container.
    pub fn collect_into<C>(self) -> Result<C, StreamError>
    where
        C: FromIterator<I::Item>,
    {
        let poison = self.poison.clone();
        let out: C = Iterator::collect(self);
        settle(&poison, out)
    }

    /// Number of items.
    pub fn count(self) -> Result<usize, StreamError> {
        let poison = self.poison.clone();
        let n = Iterator::count(self);
        settle(&poison, n)
    }

    /// Runs `f` on every item.
    pub fn for_each<F>(self, f: F) -> Result<(), StreamError>
    where
        F: FnMut(I::Item),
    {
        let poison = self.poison.clone();
        Iterator::for_each(self, f);
        settle(&poison, ())
    }

    /// Folds every item into an accumulator starting at `init`.
    pub fn fold<B, F>(self, init: B, f: F) -> Result<B, StreamError>
    where
        F: FnMut(B, I::Item) -> B,
    {
        let poison = self.poison.clone();
        let acc = Iterator::fold(self, init, f);
        settle(&poison, acc)
    }

    /// Folds using the first item as the accumulator.
    ///
    /// An empty stream is an error, not a default value.
    pub fn reduce<F>(self, f: F) -> Result<I::Item, StreamError>
    where
        F: FnMut(I::Item, I::Item) -> I::Item,
    {
        let poison = self.poison.clone();
        let acc = Iterator::reduce(self, f);
        settle(&poison, acc)?.ok_or(StreamError::Empty("reduce"))
    }

    /// The first item. Only one item is pulled; the rest of the pipeline is
    /// dropped right after.
    pub fn first(mut self) -> Result<I::Item, StreamError> {
        let poison = self.poison.clone();
        let item = Iterator::next(&mut self);
        drop(self);
        settle(&poison, item)?.ok_or(StreamError::Empty("first"))
    }

    /// The last item.
    pub fn last(self) -> Result<I::Item, StreamError> {
        let poison = self.poison.clone();
        let item = Iterator::last(self);
        settle(&poison, item)?.ok_or(StreamError::Empty("last"))
    }

    /// True if any item matches. Stops at the first match.
    pub fn any<F>(mut self, f: F) -> Result<bool, StreamError>
    where
        F: FnMut(I::Item) -> bool,
    {
        let found = Iterator::any(&mut self, f);
        settle(&self.poison, found)
    }

    /// True if every item matches. Stops at the first mismatch.
    pub fn all<F>(mut self, f: F) -> Result<bool, StreamError>
    where
        F: FnMut(I::Item) -> bool,
    {
        let all = Iterator::all(&mut self, f);
        settle(&self.poison, all)
    }

    /// Buckets items by `key_fn`, keeping stream order inside each bucket.
    pub fn group_by<K, F>(self, mut key_fn: F) -> Result<HashMap<K, Vec<I::Item>>, StreamError>
    where
        K: Hash + Eq,
        F: FnMut(&I::Item) -> K,
    {
        self.fold(HashMap::new(), |mut groups, item| {
            groups.entry(key_fn(&item)).or_insert_with(Vec::new).push(item);
            groups
        })
    }
}
