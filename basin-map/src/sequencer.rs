use core::sync::atomic::Ordering;
use portable_atomic::AtomicU64;

/// Issues the global write tickets of one map.
///
/// A single fetch-add per write; the only point every writer touches. Ticket
/// 0 is never issued so it can stand for "no ticket".
#[derive(Debug, Default)]
pub struct Sequencer {
    counter: AtomicU64,
}

impl Sequencer {
    /// Creates a sequencer whose first ticket is 1.
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Returns a fresh ticket, strictly greater than every ticket issued before.
    #[inline]
    pub fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// The most recently issued ticket, or 0 if none was issued.
    #[inline]
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::Acquire)
    }
}
