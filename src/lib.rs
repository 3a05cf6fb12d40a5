//! Forward-only result-set cursors.
//!
//! A [`RowCursor`] wraps a query that a driver has already started executing, pulls one row
//! at a time through the [`RowSource`] trait, coerces every cell to its column's declared
//! [`ColumnKind`], and releases the driver handle exactly once.
//!
//! ```rust
//! use sql_cursor::prelude::*;
//!
//! # fn demo() -> Result<(), SqlCursorError> {
//! let conn = rusqlite::Connection::open_in_memory()?;
//! conn.execute_batch("CREATE TABLE users (id INTEGER, name TEXT); INSERT INTO users VALUES (1, 'a');")?;
//! let mut stmt = conn.prepare("SELECT id, name FROM users WHERE id = ?1")?;
//! let mut cursor = sqlite_open_reader(&mut stmt, &[RowValues::Int(1)], CursorOptions::default())?;
//! assert!(cursor.advance()?);
//! assert_eq!(cursor.current_row()?.get("name"), Some(&RowValues::Text("a".into())));
//! cursor.close();
//! # Ok(()) }
//! # demo().unwrap();
//! ```

pub mod coercion;
pub mod config;
pub mod cursor;
pub mod error;
pub mod prelude;
pub mod results;
pub mod source;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use coercion::coerce_value;
pub use config::{CursorOptions, FieldCountPolicy, NaiveTimestampPolicy};
pub use cursor::RowCursor;
pub use error::{SourceError, SqlCursorError};
pub use results::Row;
pub use source::RowSource;
pub use types::{ColumnDescriptor, ColumnKind, CursorState, DriverKind, RawValue, RowValues};
