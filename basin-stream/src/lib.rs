//! Lazy, poison-aware pipelines over any iterator.
//!
//! A [`Stream`] wraps an iterator together with a [`Poison`] cell shared by
//! every stage built from it. Stages (`filter`, `take`, `skip`, `map`,
//! `flat_map`, `try_map`, ...) only describe work; nothing is pulled until a
//! terminal (`collect`, `count`, `fold`, `reduce`, `first`, `any`, ...)
//! drives the pipeline.
//!
//! # Failure
//!
//! Fallible stages (`try_map`, `try_filter`) record their first error in the
//! shared cell and end the pipeline there. Terminals check the cell after
//! consuming and return [`StreamError::Failed`] instead of a partial result.
//! Terminals that need at least one element return [`StreamError::Empty`]
//! rather than a default value.
//!
//! # Stopping early
//!
//! `take(n)` pulls at most `n` items from upstream. Dropping a stream drops
//! every stage and the source with it, so a source that holds resources
//! (such as the global-order iterator of `basin-map`) releases them as soon
//! as the consumer stops.
//!
//! # Example
//!
//! ```rust
//! use basin_stream::Stream;
//!
//! let evens = Stream::new(1..=10)
//!     .filter(|n| n % 2 == 0)
//!     .take(3)
//!     .collect()
//!     .unwrap();
//! assert_eq!(evens, vec![2, 4, 6]);
//! ```
//!
//! ```rust
//! use basin_stream::Stream;
//!
//! let parsed = Stream::new(["1", "2", "x", "4"])
//!     .try_map(|s| s.parse::<i32>())
//!     .collect();
//! assert!(parsed.is_err());
//! ```

#![warn(missing_docs)]

mod error;
mod math;
mod pairs;
mod poison;
mod terminal;

pub use error::{SharedError, StreamError};
pub use math::ToF64;
pub use poison::Poison;

use core::iter::{Filter, FlatMap, Inspect, Map, Skip, Take};
use std::error::Error;

/// A lazy pipeline stage sharing one [`Poison`] cell with its neighbours.
pub struct Stream<I> {
    iter: I,
    poison: Poison,
}

/// Wraps any iterable in a fresh pipeline.
pub fn from_iter<T: IntoIterator>(iter: T) -> Stream<T::IntoIter> {
    Stream::new(iter)
}

/// A stream of exactly one value.
pub fn once<T>(value: T) -> Stream<core::iter::Once<T>> {
    Stream::new(core::iter::once(value))
}

/// A stream with no values.
pub fn empty<T>() -> Stream<core::iter::Empty<T>> {
    Stream::new(core::iter::empty())
}

impl<I: Iterator> Stream<I> {
    /// Starts a pipeline with its own poison cell.
    pub fn new<T: IntoIterator<IntoIter = I>>(iter: T) -> Self {
        Self::with_poison(iter, Poison::new())
    }

    /// Starts a pipeline on an existing poison cell.
    ///
    /// The source keeps a clone of `poison` and trips it to report its own
    /// failure; the stream then ends and terminals return the error.
    pub fn with_poison<T: IntoIterator<IntoIter = I>>(iter: T, poison: Poison) -> Self {
        Self {
            iter: iter.into_iter(),
            poison,
        }
    }

    /// The pipeline's poison cell.
    pub fn poison(&self) -> &Poison {
        &self.poison
    }

    fn stage<J>(self, build: impl FnOnce(Self) -> J) -> Stream<J> {
        let poison = self.poison.clone();
        Stream {
            iter: build(self),
            poison,
        }
    }

    /// Keeps items for which `f` returns true.
    pub fn filter<F>(self, f: F) -> Stream<Filter<Self, F>>
    where
        F: FnMut(&I::Item) -> bool,
    {
        self.stage(|s| Iterator::filter(s, f))
    }

    /// Yields at most `n` items and never pulls more than that from upstream.
    pub fn take(self, n: usize) -> Stream<Take<Self>> {
        self.stage(|s| Iterator::take(s, n))
    }

    /// Drops the first `n` items.
    pub fn skip(self, n: usize) -> Stream<Skip<Self>> {
        self.stage(|s| Iterator::skip(s, n))
    }

    /// Transforms every item.
    pub fn map<U, F>(self, f: F) -> Stream<Map<Self, F>>
    where
        F: FnMut(I::Item) -> U,
    {
        self.stage(|s| Iterator::map(s, f))
    }

    /// Calls `f` on every item as it passes through.
    pub fn inspect<F>(self, f: F) -> Stream<Inspect<Self, F>>
    where
        F: FnMut(&I::Item),
    {
        self.stage(|s| Iterator::inspect(s, f))
    }

    /// Replaces every item with the items of the iterable `f` returns.
    pub fn flat_map<U, F>(self, f: F) -> Stream<FlatMap<Self, U, F>>
    where
        U: IntoIterator,
        F: FnMut(I::Item) -> U,
    {
        self.stage(|s| Iterator::flat_map(s, f))
    }

    /// Fallible transformation. The first `Err` poisons the pipeline and
    /// ends it.
    pub fn try_map<U, E, F>(self, f: F) -> Stream<TryMap<Self, F>>
    where
        F: FnMut(I::Item) -> Result<U, E>,
        E: Error + Send + Sync + 'static,
    {
        let poison = self.poison.clone();
        self.stage(|s| TryMap { iter: s, f, poison })
    }

    /// Fallible predicate. The first `Err` poisons the pipeline and ends it.
    pub fn try_filter<E, F>(self, f: F) -> Stream<TryFilter<Self, F>>
    where
        F: FnMut(&I::Item) -> Result<bool, E>,
        E: Error + Send + Sync + 'static,
    {
        let poison = self.poison.clone();
        self.stage(|s| TryFilter { iter: s, f, poison })
    }
}

impl<I: Iterator> Iterator for Stream<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poison.is_tripped() {
            return None;
        }
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.poison.is_tripped() {
            return (0, Some(0));
        }
        (0, self.iter.size_hint().1)
    }
}

/// Stage produced by [`Stream::try_map`].
pub struct TryMap<I, F> {
    iter: I,
    f: F,
    poison: Poison,
}

impl<I, F, U, E> Iterator for TryMap<I, F>
where
    I: Iterator,
    F: FnMut(I::Item) -> Result<U, E>,
    E: Error + Send + Sync + 'static,
{
    type Item = U;

    fn next(&mut self) -> Option<U> {
        let item = self.iter.next()?;
        match (self.f)(item) {
            Ok(mapped) => Some(mapped),
            Err(err) => {
                self.poison.trip(err);
                None
            }
        }
    }
}

/// Stage produced by [`Stream::try_filter`].
pub struct TryFilter<I, F> {
    iter: I,
    f: F,
    poison: Poison,
}

impl<I, F, E> Iterator for TryFilter<I, F>
where
    I: Iterator,
    F: FnMut(&I::Item) -> Result<bool, E>,
    E: Error + Send + Sync + 'static,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        for item in self.iter.by_ref() {
            match (self.f)(&item) {
                Ok(true) => return Some(item),
                Ok(false) => continue,
                Err(err) => {
                    self.poison.trip(err);
                    return None;
                }
            }
        }
        None
    }
}
