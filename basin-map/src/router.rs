use crate::error::MapError;
use crate::map::DEFAULT_SHARD_COUNT;
use core::hash::{BuildHasher, Hash};

/// Maps keys to shard indices with `hash(key) & (shard_count - 1)`.
///
/// Pure and deterministic for the lifetime of the hasher. With the default
/// `foldhash::fast::FixedState` the mapping is also stable across maps in the
/// same process; it is not a cross-version or cross-process contract.
#[derive(Debug, Clone)]
pub struct ShardRouter<S> {
    hasher: S,
    mask: usize,
}

impl<S: BuildHasher> ShardRouter<S> {
    /// Creates a router over `shard_count` shards.
    ///
    /// Fails unless `shard_count` is a non-zero power of two.
    pub fn new(shard_count: usize, hasher: S) -> Result<Self, MapError> {
        if !shard_count.is_power_of_two() {
            return Err(MapError::InvalidShardCount(shard_count));
        }
        Ok(Self {
            hasher,
            mask: shard_count - 1,
        })
    }

    pub(crate) fn with_default_shards(hasher: S) -> Self {
        Self {
            hasher,
            mask: DEFAULT_SHARD_COUNT - 1,
        }
    }

    /// Number of shards routed to.
    #[inline]
    pub fn shard_count(&self) -> usize {
        self.mask + 1
    }

    /// Full 64-bit hash of `key`.
    #[inline(always)]
    pub fn hash<Q: Hash + ?Sized>(&self, key: &Q) -> u64 {
        self.hasher.hash_one(key)
    }

    /// Shard owning `key`.
    #[inline(always)]
    pub fn shard_of<Q: Hash + ?Sized>(&self, key: &Q) -> usize {
        (self.hash(key) as usize) & self.mask
    }

    /// The hash builder.
    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldhash::fast::FixedState;

    #[test]
    fn test_rejects_bad_shard_counts() {
        for n in [0, 3, 6, 100, 255] {
            assert_eq!(
                ShardRouter::new(n, FixedState::default()).unwrap_err(),
                MapError::InvalidShardCount(n)
            );
        }
        assert!(ShardRouter::new(1, FixedState::default()).is_ok());
        assert!(ShardRouter::new(256, FixedState::default()).is_ok());
    }

    #[test]
    fn test_routing_is_deterministic() {
        let a = ShardRouter::new(64, FixedState::default()).unwrap();
        let b = ShardRouter::new(64, FixedState::default()).unwrap();
        for key in 0..1000u64 {
            let shard = a.shard_of(&key);
            assert!(shard < 64);
            assert_eq!(shard, a.shard_of(&key));
            assert_eq!(shard, b.shard_of(&key));
        }
    }

    #[test]
    fn test_borrowed_and_owned_keys_agree() {
        let router = ShardRouter::new(16, FixedState::default()).unwrap();
        let owned = String::from("basin");
        assert_eq!(router.shard_of(&owned), router.shard_of("basin"));
    }

    #[test]
    fn test_distribution_is_roughly_uniform() {
        let router = ShardRouter::new(16, FixedState::default()).unwrap();
        let mut counts = [0usize; 16];
        for key in 0..16_000u64 {
            counts[router.shard_of(&key)] += 1;
        }
        // Expected 1000 per shard; allow generous slack.
        for &c in &counts {
            assert!((500..1500).contains(&c), "skewed shard: {counts:?}");
        }
    }
}
