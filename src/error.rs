use thiserror::Error;

use crate::types::{ColumnKind, CursorState};

/// Error raised by a [`RowSource`](crate::source::RowSource) while fetching or releasing.
///
/// Wraps whatever the driver reported so the cursor does not need to know the driver's
/// error type.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SourceError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl SourceError {
    /// A source error carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a driver error, keeping it reachable through [`std::error::Error::source`].
    pub fn from_driver<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum SqlCursorError {
    #[error("Invalid cursor state: cannot {operation} while cursor is {state}")]
    InvalidState {
        operation: &'static str,
        state: CursorState,
    },

    #[error("Source failure: {0}")]
    SourceFailure(#[from] SourceError),

    #[error("Coercion error: column {index} ({column}) declared {kind}: {reason}")]
    CoercionFailure {
        column: String,
        index: usize,
        kind: ColumnKind,
        reason: String,
    },

    #[error("Field count mismatch: {expected} columns declared, driver returned {actual}")]
    FieldCountMismatch { expected: usize, actual: usize },

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),
}

impl SqlCursorError {
    /// True for failures that leave the cursor usable (coercion and shape errors).
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::CoercionFailure { .. } | Self::FieldCountMismatch { .. }
        )
    }
}
