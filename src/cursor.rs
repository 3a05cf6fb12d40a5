use std::collections::HashMap;
use std::sync::Arc;

use tracing::{trace, warn};

use crate::coercion::coerce_value;
use crate::config::{CursorOptions, FieldCountPolicy};
use crate::error::SqlCursorError;
use crate::results::Row;
use crate::results::row::build_column_index;
use crate::source::RowSource;
use crate::types::{ColumnDescriptor, CursorState, RawValue, RowValues};

/// Forward-only cursor over the rows of one executing query.
///
/// The cursor owns its [`RowSource`] exclusively and releases it exactly once, either on
/// [`close`](RowCursor::close) or when dropped. Every mutating call takes `&mut self`, so a
/// cursor cannot be advanced and closed concurrently without external locking.
///
/// ```rust
/// use sql_cursor::prelude::*;
/// use sql_cursor::test_utils::MemorySource;
///
/// # fn demo() -> Result<(), SqlCursorError> {
/// let source = MemorySource::new(vec![vec![RawValue::Int(1), RawValue::Text("a".into())]]);
/// let columns = vec![
///     ColumnDescriptor::new("id", ColumnKind::Integer),
///     ColumnDescriptor::new("name", ColumnKind::Text),
/// ];
/// let mut cursor = RowCursor::new(source, columns);
/// while cursor.advance()? {
///     let row = cursor.current_row()?;
///     assert_eq!(row.get("id"), Some(&RowValues::Int(1)));
/// }
/// cursor.close();
/// # Ok(()) }
/// # demo().unwrap();
/// ```
#[derive(Debug)]
pub struct RowCursor<S: RowSource> {
    source: Option<S>,
    columns: Arc<[ColumnDescriptor]>,
    column_names: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
    state: CursorState,
    current_row: Option<Row>,
    options: CursorOptions,
}

impl<S: RowSource> RowCursor<S> {
    /// Bind a cursor to an already-executing result. No row is fetched until `advance`.
    pub fn new(source: S, columns: Vec<ColumnDescriptor>) -> Self {
        Self::with_options(source, columns, CursorOptions::default())
    }

    pub fn with_options(source: S, columns: Vec<ColumnDescriptor>, options: CursorOptions) -> Self {
        let columns: Arc<[ColumnDescriptor]> = columns
            .into_iter()
            .enumerate()
            .map(|(i, col)| col.with_ordinal(i))
            .collect();
        let column_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
        let column_index = Arc::new(build_column_index(&column_names));

        trace!(
            driver = options.driver.log_prefix(),
            columns = columns.len(),
            "cursor created"
        );

        Self {
            source: Some(source),
            columns,
            column_names: Arc::new(column_names),
            column_index,
            state: CursorState::Fresh,
            current_row: None,
            options,
        }
    }

    /// Move to the next row.
    ///
    /// Returns `Ok(false)` at end of data, and keeps returning it on later calls without
    /// touching the source again.
    ///
    /// # Errors
    ///
    /// - `InvalidState` once the cursor is closed.
    /// - `SourceFailure` when the driver fetch fails; the cursor keeps its previous state and
    ///   the caller is expected to close it.
    /// - `CoercionFailure` / `FieldCountMismatch` when the fetched row cannot be decoded; the
    ///   cursor keeps its previous state and the next call moves on to the following row.
    pub fn advance(&mut self) -> Result<bool, SqlCursorError> {
        match self.state {
            CursorState::Closed => {
                return Err(SqlCursorError::InvalidState {
                    operation: "advance",
                    state: self.state,
                });
            }
            CursorState::Exhausted => return Ok(false),
            CursorState::Fresh | CursorState::Positioned => {}
        }

        let Some(source) = self.source.as_mut() else {
            return Err(SqlCursorError::InvalidState {
                operation: "advance",
                state: self.state,
            });
        };

        match source.fetch_next_row()? {
            Some(raw) => {
                let values = self.decode_row(raw)?;
                self.current_row = Some(Row::with_index(
                    Arc::clone(&self.column_names),
                    Arc::clone(&self.column_index),
                    values,
                ));
                self.transition(CursorState::Positioned);
                Ok(true)
            }
            None => {
                self.current_row = None;
                self.transition(CursorState::Exhausted);
                Ok(false)
            }
        }
    }

    /// The row captured by the last successful `advance`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the cursor is positioned on a row.
    pub fn current_row(&self) -> Result<&Row, SqlCursorError> {
        match (&self.state, &self.current_row) {
            (CursorState::Positioned, Some(row)) => Ok(row),
            _ => Err(SqlCursorError::InvalidState {
                operation: "read the current row",
                state: self.state,
            }),
        }
    }

    /// Column metadata; available in every state, including after close.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    #[must_use]
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// The underlying source, until the cursor is closed.
    #[must_use]
    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    #[must_use]
    pub fn options(&self) -> &CursorOptions {
        &self.options
    }

    /// Release the underlying source and move to `Closed`.
    ///
    /// Safe to call any number of times from any state; the source is released only on the
    /// first call. A failing release is logged, never returned.
    pub fn close(&mut self) {
        if let Some(mut source) = self.source.take() {
            if let Err(err) = source.release() {
                warn!(
                    driver = self.options.driver.log_prefix(),
                    error = %err,
                    "failed to release result source"
                );
            }
        }
        self.current_row = None;
        if self.state != CursorState::Closed {
            self.transition(CursorState::Closed);
        }
    }

    /// Iterate the remaining rows, yielding owned copies.
    ///
    /// Iteration ends after the source is drained or after the first error is yielded.
    pub fn rows(&mut self) -> RowIter<'_, S> {
        RowIter {
            cursor: self,
            done: false,
        }
    }

    fn decode_row(&self, mut raw: Vec<RawValue>) -> Result<Vec<RowValues>, SqlCursorError> {
        let expected = self.columns.len();
        if raw.len() != expected {
            match self.options.field_count_policy {
                FieldCountPolicy::Strict => {
                    return Err(SqlCursorError::FieldCountMismatch {
                        expected,
                        actual: raw.len(),
                    });
                }
                FieldCountPolicy::Tolerate => {
                    warn!(
                        driver = self.options.driver.log_prefix(),
                        expected,
                        actual = raw.len(),
                        "row width differs from declared columns; padding/truncating"
                    );
                    raw.resize(expected, RawValue::Null);
                }
            }
        }

        raw.into_iter()
            .zip(self.columns.iter())
            .map(|(value, column)| coerce_value(value, column, self.options.naive_timestamps))
            .collect()
    }

    fn transition(&mut self, next: CursorState) {
        if self.state != next {
            trace!(from = %self.state, to = %next, "cursor state change");
        }
        self.state = next;
    }
}

impl<S: RowSource> Drop for RowCursor<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Iterator returned by [`RowCursor::rows`].
pub struct RowIter<'a, S: RowSource> {
    cursor: &'a mut RowCursor<S>,
    done: bool,
}

impl<S: RowSource> Iterator for RowIter<'_, S> {
    type Item = Result<Row, SqlCursorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.advance() {
            Ok(true) => Some(self.cursor.current_row().cloned()),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
