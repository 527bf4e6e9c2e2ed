use std::error::Error;
use std::sync::Arc;
use thiserror::Error;

/// Error recorded by a failing stage, shared by every handle to the pipeline.
pub type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Failure reported by a stream terminal.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    /// The terminal needs at least one element and the stream had none.
    /// Carries the terminal's name.
    #[error("{0} called on an empty stream")]
    Empty(&'static str),

    /// A stage upstream failed and poisoned the pipeline.
    #[error("stream stage failed: {0}")]
    Failed(#[source] SharedError),
}

impl StreamError {
    /// Returns true for [`StreamError::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, StreamError::Empty(_))
    }

    /// The stage error, when the pipeline was poisoned.
    pub fn stage_error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            StreamError::Failed(err) => Some(err.as_ref()),
            StreamError::Empty(_) => None,
        }
    }
}
