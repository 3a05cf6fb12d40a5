use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Values produced by the cursor after coercion, one per declared column.
///
/// SQL NULL is always [`RowValues::Null`], whatever the column's declared kind:
/// ```rust
/// use sql_cursor::prelude::*;
///
/// let row = vec![RowValues::Int(1), RowValues::Null];
/// assert!(row[1].is_null());
/// assert_eq!(row[0].as_int(), Some(&1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Exact decimal value
    Decimal(Decimal),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Calendar date without time of day
    Date(NaiveDate),
    /// Time of day without date
    Time(NaiveTime),
    /// Instant, normalised to UTC
    Timestamp(DateTime<Utc>),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        if let RowValues::Decimal(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        if let RowValues::Date(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_time(&self) -> Option<NaiveTime> {
        if let RowValues::Time(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        if let RowValues::Timestamp(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let RowValues::JSON(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }
}

/// A cell exactly as the driver handed it over, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Bool(bool),
}

impl RawValue {
    /// Short name of the driver-native representation, used in coercion messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Int(_) => "integer",
            RawValue::Float(_) => "float",
            RawValue::Text(_) => "text",
            RawValue::Bytes(_) => "bytes",
            RawValue::Bool(_) => "boolean",
        }
    }
}

/// Target kind a column is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Date,
    Time,
    /// Instant; naive driver text is rejected unless the cursor is configured to assume UTC.
    Timestamp,
    /// Instant that must always carry an explicit offset.
    TimestampTz,
    Json,
    /// No declared type; each cell keeps the representation the driver gave it.
    Dynamic,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Decimal => "decimal",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Text => "text",
            ColumnKind::Binary => "binary",
            ColumnKind::Date => "date",
            ColumnKind::Time => "time",
            ColumnKind::Timestamp => "timestamp",
            ColumnKind::TimestampTz => "timestamptz",
            ColumnKind::Json => "json",
            ColumnKind::Dynamic => "dynamic",
        };
        f.write_str(name)
    }
}

/// Name, declared kind and position of one result column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ColumnDescriptor {
    name: String,
    kind: ColumnKind,
    ordinal: usize,
    nullable: bool,
}

impl ColumnDescriptor {
    /// Describe a nullable column. The ordinal is assigned when the cursor is created.
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ordinal: 0,
            nullable: true,
        }
    }

    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub(crate) fn with_ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = ordinal;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Zero-based position in the result.
    #[must_use]
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Whether the driver reported the column as null-capable. Informational only:
    /// a NULL cell always decodes to [`RowValues::Null`].
    #[must_use]
    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

/// Lifecycle of a [`RowCursor`](crate::cursor::RowCursor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CursorState {
    /// Created, nothing fetched yet
    Fresh,
    /// A row is available through `current_row`
    Positioned,
    /// The source reported end of data
    Exhausted,
    /// Resources released; terminal
    Closed,
}

impl fmt::Display for CursorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CursorState::Fresh => "fresh",
            CursorState::Positioned => "positioned",
            CursorState::Exhausted => "exhausted",
            CursorState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// The driver a cursor reads from; used to label log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default)]
pub enum DriverKind {
    /// `SQLite` via rusqlite
    #[default]
    Sqlite,
    /// In-process scripted source
    Memory,
}

impl DriverKind {
    /// Prefix written in front of logged queries, e.g. `[Sqlite3] SELECT 1`.
    #[must_use]
    pub fn log_prefix(self) -> &'static str {
        match self {
            DriverKind::Sqlite => "Sqlite3",
            DriverKind::Memory => "Memory",
        }
    }
}
