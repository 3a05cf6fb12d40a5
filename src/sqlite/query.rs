use rusqlite::types::ValueRef;
use rusqlite::{Rows, Statement};
use tracing::{Level, debug, enabled};

use crate::config::CursorOptions;
use crate::cursor::RowCursor;
use crate::error::{SourceError, SqlCursorError};
use crate::source::RowSource;
use crate::types::{ColumnDescriptor, ColumnKind, RawValue, RowValues};

use super::params::Params;

/// Live `SQLite` result: the rows of a statement that has started stepping.
///
/// Releasing drops the `Rows` handle, which resets the borrowed statement so it can be
/// executed again.
pub struct SqliteExecution<'stmt> {
    rows: Option<Rows<'stmt>>,
    column_count: usize,
}

impl RowSource for SqliteExecution<'_> {
    fn fetch_next_row(&mut self) -> Result<Option<Vec<RawValue>>, SourceError> {
        let rows = self
            .rows
            .as_mut()
            .ok_or_else(|| SourceError::new("sqlite execution already released"))?;

        let Some(row) = rows.next().map_err(SourceError::from_driver)? else {
            return Ok(None);
        };

        let mut values = Vec::with_capacity(self.column_count);
        for idx in 0..self.column_count {
            values.push(sqlite_extract_value_sync(row, idx)?);
        }
        Ok(Some(values))
    }

    fn release(&mut self) -> Result<(), SourceError> {
        self.rows.take();
        Ok(())
    }
}

impl std::fmt::Debug for SqliteExecution<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecution")
            .field("open", &self.rows.is_some())
            .field("column_count", &self.column_count)
            .finish()
    }
}

/// Extract the driver-native value of column `idx` from a `SQLite` row.
///
/// # Errors
///
/// Returns `SourceError` if the column cannot be read.
pub fn sqlite_extract_value_sync(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> Result<RawValue, SourceError> {
    let value = row.get_ref(idx).map_err(SourceError::from_driver)?;
    Ok(match value {
        ValueRef::Null => RawValue::Null,
        ValueRef::Integer(i) => RawValue::Int(i),
        ValueRef::Real(f) => RawValue::Float(f),
        // Keep the stored bytes; the Text coercion validates UTF-8 instead of replacing.
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) => RawValue::Text(s.to_owned()),
            Err(_) => RawValue::Bytes(bytes.to_vec()),
        },
        ValueRef::Blob(b) => RawValue::Bytes(b.to_vec()),
    })
}

/// Map a `SQLite` declared column type to the kind the cursor coerces to.
///
/// Follows `SQLite`'s affinity rules, with a few common spellings (BOOLEAN, DATE, DATETIME,
/// JSON, the SQL-standard `WITH TIME ZONE` forms) recognised before affinity is applied.
/// Length and precision modifiers are ignored. Columns with no declared type (expressions,
/// aggregates, untyped table columns) are [`ColumnKind::Dynamic`].
///
/// `TIME WITH TIME ZONE` is read as text: a time of day with an offset has no lossless
/// [`RowValues`] form.
#[must_use]
pub fn column_kind_from_decltype(decl_type: Option<&str>) -> ColumnKind {
    let Some(decl) = decl_type else {
        return ColumnKind::Dynamic;
    };
    let base = normalize_decltype(decl);

    match base.as_str() {
        "" => return ColumnKind::Dynamic,
        "BOOL" | "BOOLEAN" => return ColumnKind::Boolean,
        "DATE" => return ColumnKind::Date,
        "TIME" | "TIME WITHOUT TIME ZONE" => return ColumnKind::Time,
        "TIMETZ" | "TIME WITH TIME ZONE" => return ColumnKind::Text,
        "DATETIME" | "TIMESTAMP" | "TIMESTAMP WITHOUT TIME ZONE" => {
            return ColumnKind::Timestamp;
        }
        "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => return ColumnKind::TimestampTz,
        "JSON" | "JSONB" => return ColumnKind::Json,
        "DECIMAL" | "NUMERIC" => return ColumnKind::Decimal,
        _ => {}
    }

    if base.contains("INT") {
        ColumnKind::Integer
    } else if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
        ColumnKind::Text
    } else if base.contains("BLOB") {
        ColumnKind::Binary
    } else if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
        ColumnKind::Float
    } else {
        ColumnKind::Decimal
    }
}

/// Uppercase, drop `(...)` modifiers and collapse whitespace: `timestamp(3)  with time zone`
/// becomes `TIMESTAMP WITH TIME ZONE`.
fn normalize_decltype(decl: &str) -> String {
    let mut stripped = String::with_capacity(decl.len());
    let mut depth = 0_usize;
    for ch in decl.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => stripped.push(ch.to_ascii_uppercase()),
            _ => {}
        }
    }
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Column descriptors for a prepared statement, from its declared types.
#[must_use]
pub fn column_descriptors(stmt: &Statement<'_>) -> Vec<ColumnDescriptor> {
    stmt.columns()
        .iter()
        .map(|col| ColumnDescriptor::new(col.name(), column_kind_from_decltype(col.decl_type())))
        .collect()
}

/// Bind `params`, start executing `stmt`, and wrap the live result in a cursor.
///
/// The query (with bound values expanded) is logged at debug level, prefixed with the
/// driver label, e.g. `[Sqlite3] SELECT * FROM users WHERE id = 1`.
///
/// # Errors
///
/// Returns `SqlCursorError::ParameterError` if the parameter count does not match the
/// statement, or `SqlCursorError::SqliteError` if binding fails.
pub fn open_reader<'stmt>(
    stmt: &'stmt mut Statement<'_>,
    params: &[RowValues],
    options: CursorOptions,
) -> Result<RowCursor<SqliteExecution<'stmt>>, SqlCursorError> {
    let columns = column_descriptors(stmt);
    Params::convert(params).bind(stmt)?;

    if enabled!(Level::DEBUG) {
        let sql = stmt.expanded_sql().unwrap_or_default();
        debug!("[{}] {}", options.driver.log_prefix(), sql);
    }

    let execution = SqliteExecution {
        column_count: columns.len(),
        rows: Some(stmt.raw_query()),
    };
    Ok(RowCursor::with_options(execution, columns, options))
}
