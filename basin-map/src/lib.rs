//! Sharded concurrent hash map with iteration in global write order
//!
//! `ShardedMap` spreads its keys over a fixed number of shards, each behind
//! its own reader-writer lock. Point operations lock exactly one shard. On
//! top of that, every write is stamped with a ticket from a map-wide
//! sequencer, and the map can replay its live entries in ticket order by
//! merging the shards lazily.
//!
//! # Features
//!
//! - **Sharded Locking**: `parking_lot` reader-writer lock per shard, cache-padded
//! - **Global Write Order**: a quiescent map iterates in the order its live
//!   entries were last written, across all shards
//! - **Lazy Merge**: iteration locks one shard at a time for a single lookup;
//!   a paused or abandoned iterator blocks nobody
//! - **Stream Integration**: [`ShardedMap::to_stream`] feeds the merge into a
//!   `basin-stream` pipeline
//! - **Flexible Hashing**: `foldhash` by default, any `BuildHasher` via
//!   [`MapBuilder`]
//!
//! # Ordering under concurrency
//!
//! The merge yields strictly ascending tickets. A write that lands behind a
//! shard's cursor is not observed by that iteration; one that lands ahead of
//! it may be, so a key rewritten mid-iteration can appear once per write.
//! With no concurrent writers, every live key appears exactly once.
//!
//! # Example
//!
//! ```rust
//! use basin_map::ShardedMap;
//!
//! let map = ShardedMap::new();
//! map.put("b", 2);
//! map.put("a", 1);
//! map.put("b", 3);
//!
//! let order: Vec<_> = map.iter_in_global_order().collect();
//! assert_eq!(order, vec![("a", 1), ("b", 3)]);
//!
//! let total: i32 = map.to_stream().values().sum().unwrap();
//! assert_eq!(total, 4);
//! ```

#![warn(missing_docs)]

mod error;
mod iter;
mod map;
mod router;
mod sequencer;
mod shard;

pub use error::MapError;
pub use iter::{GlobalOrder, Keys, Sequenced, Values};
pub use map::{MapBuilder, ShardedMap, DEFAULT_SHARD_COUNT};
pub use router::ShardRouter;
pub use sequencer::Sequencer;

pub use basin_seqmap::DEFAULT_COMPACT_THRESHOLD;
