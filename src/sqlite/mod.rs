// SQLite module - streams rows from a rusqlite statement into a RowCursor
//
// - params: Parameter conversion between cursor values and SQLite types
// - query: Row source, declared-type mapping and reader construction

pub mod params;
pub mod query;

pub use params::Params;
pub use query::{
    SqliteExecution, column_descriptors, column_kind_from_decltype, open_reader,
    sqlite_extract_value_sync,
};
