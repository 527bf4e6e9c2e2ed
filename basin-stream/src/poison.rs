use crate::error::SharedError;
use std::cell::OnceCell;
use std::error::Error;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

/// Pipeline-scoped failure cell.
///
/// Every stage of one pipeline holds a clone of the same `Poison`. The first
/// recorded error wins; later ones are dropped. Once tripped, every stage
/// stops yielding and every terminal reports the error.
///
/// A source that can fail on its own (I/O, decoding) takes a clone through
/// [`crate::Stream::with_poison`] and trips it before ending early.
#[derive(Clone, Default)]
pub struct Poison {
    cell: Rc<OnceCell<SharedError>>,
}

impl Poison {
    /// Creates an untripped cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `err` if nothing was recorded yet. Returns true if this call
    /// was the one that tripped the cell.
    pub fn trip<E>(&self, err: E) -> bool
    where
        E: Error + Send + Sync + 'static,
    {
        self.trip_shared(Arc::new(err))
    }

    /// Same as [`Poison::trip`] for an already shared error.
    pub fn trip_shared(&self, err: SharedError) -> bool {
        if self.cell.set(err).is_err() {
            return false;
        }
        if let Some(err) = self.cell.get() {
            debug!(error = %err, "stream poisoned");
        }
        true
    }

    /// Returns true once an error was recorded.
    pub fn is_tripped(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The recorded error, if any.
    pub fn error(&self) -> Option<SharedError> {
        self.cell.get().cloned()
    }
}

impl fmt::Debug for Poison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poison")
            .field("error", &self.cell.get().map(|e| e.to_string()))
            .finish()
    }
}
