//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{CursorOptions, CursorOptionsBuilder, FieldCountPolicy, NaiveTimestampPolicy};
pub use crate::cursor::{RowCursor, RowIter};
pub use crate::error::{SourceError, SqlCursorError};
pub use crate::results::Row;
pub use crate::source::RowSource;
pub use crate::types::{ColumnDescriptor, ColumnKind, CursorState, DriverKind, RawValue, RowValues};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteExecution, open_reader as sqlite_open_reader};
