use crate::error::MapError;
use crate::iter::{GlobalOrder, Keys, Sequenced, Values};
use crate::router::ShardRouter;
use crate::sequencer::Sequencer;
use crate::shard::Shard;
use basin_seqmap::DEFAULT_COMPACT_THRESHOLD;
use basin_stream::Stream;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use crossbeam_utils::CachePadded;
use foldhash::fast::FixedState;
use parking_lot::RwLock;
use tracing::debug;

/// Shard count used by [`ShardedMap::new`].
pub const DEFAULT_SHARD_COUNT: usize = 256;

const _: () = assert!(DEFAULT_SHARD_COUNT.is_power_of_two());

pub(crate) type ShardLock<K, V> = CachePadded<RwLock<Shard<K, V>>>;

/// A concurrent hash map split into independently locked shards.
///
/// Every successful [`put`](Self::put) takes a ticket from a map-wide
/// sequencer. Point operations touch exactly one shard. The global-order
/// iterators merge the shards by ticket, so a quiescent map is replayed in
/// the order its live entries were last written.
///
/// Values are returned by clone; no reference into a shard escapes its lock.
pub struct ShardedMap<K, V, S = FixedState> {
    pub(crate) shards: Box<[ShardLock<K, V>]>,
    router: ShardRouter<S>,
    sequencer: Sequencer,
}

impl<K, V> ShardedMap<K, V, FixedState>
where
    K: Hash + Eq + Clone,
{
    /// Creates a map with [`DEFAULT_SHARD_COUNT`] shards.
    pub fn new() -> Self {
        Self::from_parts(
            ShardRouter::with_default_shards(FixedState::default()),
            DEFAULT_COMPACT_THRESHOLD,
        )
    }

    /// Creates a map with `shard_count` shards.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidShardCount`] unless `shard_count` is a non-zero
    /// power of two.
    pub fn with_shard_count(shard_count: usize) -> Result<Self, MapError> {
        Self::builder().shard_count(shard_count).build()
    }

    /// Starts configuring a map.
    pub fn builder() -> MapBuilder {
        MapBuilder::new()
    }
}

impl<K, V, S> ShardedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn from_parts(router: ShardRouter<S>, compact_threshold: usize) -> Self {
        let shards = (0..router.shard_count())
            .map(|_| CachePadded::new(RwLock::new(Shard::new(compact_threshold))))
            .collect();
        debug!(
            shards = router.shard_count(),
            compact_threshold, "created sharded map"
        );
        Self {
            shards,
            router,
            sequencer: Sequencer::new(),
        }
    }

    #[inline]
    fn shard<Q: Hash + ?Sized>(&self, key: &Q) -> &ShardLock<K, V> {
        &self.shards[self.router.shard_of(key)]
    }

    /// Inserts or updates `key`, returning the value it replaced.
    ///
    /// The write's ticket is taken while the shard is held exclusively, so
    /// within a shard ticket order matches the order writes land.
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let mut shard = self.shard(&key).write();
        let sequence = self.sequencer.next();
        shard.put(key, value, sequence)
    }

    /// Returns a clone of the value for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.shard(key).read().get(key).map(|e| e.value.clone())
    }

    /// Returns the value for `key`, or `default` when it is absent.
    pub fn get_or<Q>(&self, key: &Q, default: V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get(key).unwrap_or(default)
    }

    /// Returns true if `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).read().get(key).is_some()
    }

    /// Ticket of the write that produced the current value of `key`.
    pub fn sequence_of<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).read().get(key).map(|e| e.sequence)
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).write().remove(key)
    }

    /// Removes `key`. Returns whether it was present.
    ///
    /// Deletes do not consume a ticket.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove(key).is_some()
    }

    /// Number of live entries.
    ///
    /// Shards are counted one after another; under concurrent writes the
    /// result is a weak snapshot.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }

    /// Returns true if no shard holds an entry.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.read().len() == 0)
    }

    /// Empties every shard, one at a time. The sequencer keeps counting.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.write().clear();
        }
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Shard that owns `key`.
    pub fn shard_of<Q: Hash + ?Sized>(&self, key: &Q) -> usize {
        self.router.shard_of(key)
    }

    /// Most recently issued ticket, or 0 before the first write.
    pub fn last_sequence(&self) -> u64 {
        self.sequencer.current()
    }

    /// The hash builder used for routing.
    pub fn hasher(&self) -> &S {
        self.router.hasher()
    }
}

impl<K, V, S> ShardedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    /// Entries with their tickets, in ascending ticket order.
    pub fn iter_sequenced(&self) -> Sequenced<'_, K, V, S> {
        Sequenced::new(self)
    }

    /// Entries in global write order.
    ///
    /// Lazy: shards are only locked while an item is pulled from them, and
    /// never across a yield. Dropping the iterator releases everything.
    pub fn iter_in_global_order(&self) -> GlobalOrder<'_, K, V, S> {
        GlobalOrder::new(self.iter_sequenced())
    }

    /// Keys in global write order.
    pub fn keys_in_global_order(&self) -> Keys<'_, K, V, S> {
        Keys::new(self.iter_sequenced())
    }

    /// Values in global write order.
    pub fn values_in_global_order(&self) -> Values<'_, K, V, S> {
        Values::new(self.iter_sequenced())
    }

    /// Global-order entries as a lazy [`Stream`].
    pub fn to_stream(&self) -> Stream<GlobalOrder<'_, K, V, S>> {
        Stream::new(self.iter_in_global_order())
    }
}

impl<K, V> Default for ShardedMap<K, V, FixedState>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> fmt::Debug for ShardedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedMap")
            .field("shards", &self.shard_count())
            .field("len", &self.len())
            .field("last_sequence", &self.last_sequence())
            .finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ShardedMap<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ShardedMap<K, V, FixedState>
where
    K: Hash + Eq + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

/// Builder for [`ShardedMap`].
///
/// ```
/// use basin_map::{MapBuilder, ShardedMap};
///
/// let map: ShardedMap<u64, u64> = MapBuilder::new()
///     .shard_count(64)
///     .compact_threshold(128)
///     .build()
///     .unwrap();
/// assert_eq!(map.shard_count(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct MapBuilder<S = FixedState> {
    shard_count: usize,
    compact_threshold: usize,
    hasher: S,
}

impl MapBuilder {
    /// Defaults: [`DEFAULT_SHARD_COUNT`] shards, [`DEFAULT_COMPACT_THRESHOLD`]
    /// tombstones per shard, `foldhash` routing.
    pub fn new() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            compact_threshold: DEFAULT_COMPACT_THRESHOLD,
            hasher: FixedState::default(),
        }
    }
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> MapBuilder<S> {
    /// Number of shards; must be a non-zero power of two.
    pub fn shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Tombstones a shard tolerates before compacting.
    pub fn compact_threshold(mut self, threshold: usize) -> Self {
        self.compact_threshold = threshold;
        self
    }

    /// Routes keys with `hasher` instead of `foldhash`.
    pub fn hasher<H>(self, hasher: H) -> MapBuilder<H> {
        MapBuilder {
            shard_count: self.shard_count,
            compact_threshold: self.compact_threshold,
            hasher,
        }
    }

    /// Builds the map.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidShardCount`] for a shard count that is zero or not
    /// a power of two.
    pub fn build<K, V>(self) -> Result<ShardedMap<K, V, S>, MapError>
    where
        K: Hash + Eq + Clone,
        S: BuildHasher,
    {
        let router = ShardRouter::new(self.shard_count, self.hasher)?;
        Ok(ShardedMap::from_parts(router, self.compact_threshold))
    }
}
