use rusqlite::types::Value;

use crate::error::SqlCursorError;
use crate::types::RowValues;

/// Convert a single `RowValues` to a rusqlite `Value`.
///
/// Types `SQLite` has no storage class for are written as text in the same formats the
/// cursor reads back (RFC 3339 timestamps, ISO dates, decimal strings, JSON text).
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Decimal(d) => Value::Text(d.to_string()),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        RowValues::Time(t) => Value::Text(t.format("%H:%M:%S%.f").to_string()),
        RowValues::Timestamp(ts) => Value::Text(ts.to_rfc3339()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Unified `SQLite` parameter container.
pub struct Params(pub Vec<Value>);

impl Params {
    /// Convert row values into `SQLite` values.
    #[must_use]
    pub fn convert(params: &[RowValues]) -> Self {
        Params(params.iter().map(row_value_to_sqlite_value).collect())
    }

    /// Bind every value positionally onto `stmt`.
    ///
    /// # Errors
    ///
    /// Returns `SqlCursorError::ParameterError` when the number of values does not match the
    /// statement's placeholders, or the driver error if binding fails.
    pub fn bind(&self, stmt: &mut rusqlite::Statement<'_>) -> Result<(), SqlCursorError> {
        let expected = stmt.parameter_count();
        if expected != self.0.len() {
            return Err(SqlCursorError::ParameterError(format!(
                "statement expects {expected} parameters, got {}",
                self.0.len()
            )));
        }
        for (i, value) in self.0.iter().enumerate() {
            stmt.raw_bind_parameter(i + 1, value)?;
        }
        Ok(())
    }

    /// Borrow the underlying values.
    #[must_use]
    pub fn as_values(&self) -> &[Value] {
        &self.0
    }
}
