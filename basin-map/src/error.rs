use thiserror::Error;

/// Errors raised while constructing a [`crate::ShardedMap`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Shard counts must be non-zero powers of two so routing can mask the hash.
    #[error("shard count must be a non-zero power of two, got {0}")]
    InvalidShardCount(usize),
}
