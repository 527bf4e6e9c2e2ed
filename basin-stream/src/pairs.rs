//! Keyed-pair pipelines: streams whose items are `(K, V)`.

use crate::terminal::settle;
use crate::{Stream, StreamError};
use std::collections::HashMap;
use std::hash::Hash;

impl<I, K, V> Stream<I>
where
    I: Iterator<Item = (K, V)>,
{
    /// Projects each pair onto its key.
    pub fn keys(self) -> Stream<impl Iterator<Item = K>> {
        self.map(|(k, _)| k)
    }

    /// Projects each pair onto its value.
    pub fn values(self) -> Stream<impl Iterator<Item = V>> {
        self.map(|(_, v)| v)
    }

    /// Transforms values, keeping keys.
    pub fn map_values<U, F>(self, mut f: F) -> Stream<impl Iterator<Item = (K, U)>>
    where
        F: FnMut(V) -> U,
    {
        self.map(move |(k, v)| (k, f(v)))
    }

    /// Keeps pairs for which `f(&key, &value)` is true.
    pub fn filter_pairs<F>(self, mut f: F) -> Stream<impl Iterator<Item = (K, V)>>
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.filter(move |(k, v)| f(k, v))
    }

    /// Collects pairs into a `HashMap`. Later pairs overwrite earlier ones.
    pub fn collect_map(self) -> Result<HashMap<K, V>, StreamError>
    where
        K: Hash + Eq,
    {
        let poison = self.poison.clone();
        let map: HashMap<K, V> = Iterator::collect(self);
        settle(&poison, map)
    }
}
