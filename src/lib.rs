//! Concurrent, ordering-aware containers
//!
//! This crate bundles the `basin-*` family under one dependency:
//!
//! - [`map`]: `ShardedMap`, a sharded concurrent hash map whose entries can
//!   be replayed in global write order
//! - [`seqmap`]: `SequencedMap`, a single-threaded insertion-ordered map with
//!   tombstone compaction
//! - [`heap`]: `Heap`, a binary heap over `(priority, value)` pairs with
//!   replace-root and in-place fix
//! - [`stream`]: `Stream`, lazy pipelines with short-circuiting and
//!   first-error-wins failure propagation
//!
//! # Example
//!
//! ```rust
//! use basin::ShardedMap;
//!
//! let map = ShardedMap::new();
//! map.put("A", 10);
//! map.put("B", 20);
//! map.put("C", 30);
//! map.put("D", 40);
//!
//! let middle: Vec<_> = map
//!     .to_stream()
//!     .filter_pairs(|_, v| *v > 10 && *v < 40)
//!     .collect()
//!     .unwrap();
//! assert_eq!(middle, vec![("B", 20), ("C", 30)]);
//! ```

#![warn(missing_docs)]

pub use basin_heap as heap;
pub use basin_map as map;
pub use basin_seqmap as seqmap;
pub use basin_stream as stream;

pub use basin_heap::{Heap, HeapKind};
pub use basin_map::{MapBuilder, MapError, ShardedMap};
pub use basin_seqmap::SequencedMap;
pub use basin_stream::{Poison, Stream, StreamError};
