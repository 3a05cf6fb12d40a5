//! Column value coercion.
//!
//! Converts driver-native cells into [`RowValues`] according to the column's declared
//! [`ColumnKind`]. NULL short-circuits to [`RowValues::Null`] for every kind.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::config::NaiveTimestampPolicy;
use crate::error::SqlCursorError;
use crate::types::{ColumnDescriptor, ColumnKind, RawValue, RowValues};

const OFFSET_TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M:%S"];

/// Coerce one driver-native cell to the column's declared kind.
///
/// # Errors
///
/// Returns `SqlCursorError::CoercionFailure` naming the column when the raw value is
/// malformed, out of range, or ambiguous for the declared kind.
pub fn coerce_value(
    raw: RawValue,
    column: &ColumnDescriptor,
    naive_timestamps: NaiveTimestampPolicy,
) -> Result<RowValues, SqlCursorError> {
    if matches!(raw, RawValue::Null) {
        return Ok(RowValues::Null);
    }

    let result = match column.kind() {
        ColumnKind::Integer => to_integer(raw),
        ColumnKind::Float => to_float(raw),
        ColumnKind::Decimal => to_decimal(raw),
        ColumnKind::Boolean => to_bool(raw),
        ColumnKind::Text => to_text(raw),
        ColumnKind::Binary => to_binary(raw),
        ColumnKind::Date => to_date(raw),
        ColumnKind::Time => to_time(raw),
        ColumnKind::Timestamp => to_timestamp(raw, naive_timestamps),
        ColumnKind::TimestampTz => to_timestamp(raw, NaiveTimestampPolicy::Reject),
        ColumnKind::Json => to_json(raw),
        ColumnKind::Dynamic => Ok(as_driver_value(raw)),
    };

    result.map_err(|reason| SqlCursorError::CoercionFailure {
        column: column.name().to_string(),
        index: column.ordinal(),
        kind: column.kind(),
        reason,
    })
}

fn unsupported(raw: &RawValue) -> String {
    format!("unsupported driver value of type {}", raw.type_name())
}

fn to_integer(raw: RawValue) -> Result<RowValues, String> {
    match raw {
        RawValue::Int(i) => Ok(RowValues::Int(i)),
        // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound.
        RawValue::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(RowValues::Int(f as i64))
        }
        RawValue::Float(f) => Err(format!("{f} is not an integral value in i64 range")),
        RawValue::Bool(b) => Ok(RowValues::Int(i64::from(b))),
        RawValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map(RowValues::Int)
            .map_err(|e| format!("cannot parse {s:?} as integer: {e}")),
        other => Err(unsupported(&other)),
    }
}

fn to_float(raw: RawValue) -> Result<RowValues, String> {
    match raw {
        RawValue::Float(f) => Ok(RowValues::Float(f)),
        RawValue::Int(i) => {
            let widened = i as f64;
            // compare in i128 so 2^63 does not saturate back to i64::MAX
            if widened as i128 == i128::from(i) {
                Ok(RowValues::Float(widened))
            } else {
                Err(format!("{i} cannot be represented exactly as a float"))
            }
        }
        RawValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(RowValues::Float(f)),
            Ok(f) => Err(format!("{f} is not a finite number")),
            Err(e) => Err(format!("cannot parse {s:?} as float: {e}")),
        },
        other => Err(unsupported(&other)),
    }
}

fn to_decimal(raw: RawValue) -> Result<RowValues, String> {
    match raw {
        RawValue::Int(i) => Ok(RowValues::Decimal(Decimal::from(i))),
        RawValue::Float(f) => Decimal::try_from(f)
            .map(RowValues::Decimal)
            .map_err(|e| format!("cannot represent {f} as decimal: {e}")),
        RawValue::Text(s) => Decimal::from_str(s.trim())
            .map(RowValues::Decimal)
            .map_err(|e| format!("cannot parse {s:?} as decimal: {e}")),
        other => Err(unsupported(&other)),
    }
}

fn to_bool(raw: RawValue) -> Result<RowValues, String> {
    match raw {
        RawValue::Bool(b) => Ok(RowValues::Bool(b)),
        RawValue::Int(1) => Ok(RowValues::Bool(true)),
        RawValue::Int(0) => Ok(RowValues::Bool(false)),
        RawValue::Int(i) => Err(format!("{i} is not a boolean (expected 1 or 0)")),
        RawValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(RowValues::Bool(true)),
            "false" | "f" | "0" => Ok(RowValues::Bool(false)),
            _ => Err(format!("{s:?} is not a boolean")),
        },
        other => Err(unsupported(&other)),
    }
}

fn to_text(raw: RawValue) -> Result<RowValues, String> {
    match raw {
        RawValue::Text(s) => Ok(RowValues::Text(s)),
        RawValue::Bytes(b) => String::from_utf8(b)
            .map(RowValues::Text)
            .map_err(|e| format!("text is not valid UTF-8: {e}")),
        RawValue::Int(i) => Ok(RowValues::Text(i.to_string())),
        RawValue::Float(f) => Ok(RowValues::Text(f.to_string())),
        RawValue::Bool(b) => Ok(RowValues::Text(b.to_string())),
        RawValue::Null => Ok(RowValues::Null),
    }
}

fn to_binary(raw: RawValue) -> Result<RowValues, String> {
    match raw {
        RawValue::Bytes(b) => Ok(RowValues::Blob(b)),
        RawValue::Text(s) => Ok(RowValues::Blob(s.into_bytes())),
        other => Err(unsupported(&other)),
    }
}

fn to_date(raw: RawValue) -> Result<RowValues, String> {
    match raw {
        RawValue::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(RowValues::Date)
            .map_err(|e| format!("cannot parse {s:?} as YYYY-MM-DD date: {e}")),
        other => Err(unsupported(&other)),
    }
}

fn to_time(raw: RawValue) -> Result<RowValues, String> {
    match raw {
        RawValue::Text(s) => {
            let trimmed = s.trim();
            TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
                .map(RowValues::Time)
                .ok_or_else(|| format!("cannot parse {s:?} as HH:MM:SS time"))
        }
        other => Err(unsupported(&other)),
    }
}

fn to_timestamp(raw: RawValue, naive: NaiveTimestampPolicy) -> Result<RowValues, String> {
    match raw {
        RawValue::Int(secs) => DateTime::<Utc>::from_timestamp(secs, 0)
            .map(RowValues::Timestamp)
            .ok_or_else(|| format!("epoch seconds {secs} out of range")),
        RawValue::Text(s) => parse_timestamp_text(s.trim(), naive).map(RowValues::Timestamp),
        other => Err(unsupported(&other)),
    }
}

fn parse_timestamp_text(s: &str, naive: NaiveTimestampPolicy) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(dt.with_timezone(&Utc));
    }

    let wall_clock = NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok());
    match (wall_clock, naive) {
        (Some(dt), NaiveTimestampPolicy::AssumeUtc) => Ok(dt.and_utc()),
        (Some(_), NaiveTimestampPolicy::Reject) => Err(format!(
            "timestamp {s:?} has no UTC offset; refusing to guess a time zone"
        )),
        (None, _) => Err(format!("unrecognised timestamp format {s:?}")),
    }
}

fn as_driver_value(raw: RawValue) -> RowValues {
    match raw {
        RawValue::Null => RowValues::Null,
        RawValue::Int(i) => RowValues::Int(i),
        RawValue::Float(f) => RowValues::Float(f),
        RawValue::Text(s) => RowValues::Text(s),
        RawValue::Bytes(b) => RowValues::Blob(b),
        RawValue::Bool(b) => RowValues::Bool(b),
    }
}

fn to_json(raw: RawValue) -> Result<RowValues, String> {
    match raw {
        RawValue::Text(s) => serde_json::from_str::<JsonValue>(&s)
            .map(RowValues::JSON)
            .map_err(|e| format!("invalid JSON: {e}")),
        RawValue::Bytes(b) => serde_json::from_slice::<JsonValue>(&b)
            .map(RowValues::JSON)
            .map_err(|e| format!("invalid JSON: {e}")),
        RawValue::Int(i) => Ok(RowValues::JSON(JsonValue::from(i))),
        RawValue::Float(f) => serde_json::Number::from_f64(f)
            .map(|n| RowValues::JSON(JsonValue::Number(n)))
            .ok_or_else(|| format!("{f} cannot be represented in JSON")),
        RawValue::Bool(b) => Ok(RowValues::JSON(JsonValue::Bool(b))),
        RawValue::Null => Ok(RowValues::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn col(kind: ColumnKind) -> ColumnDescriptor {
        ColumnDescriptor::new("c", kind).with_ordinal(3)
    }

    fn coerce(raw: RawValue, kind: ColumnKind) -> Result<RowValues, SqlCursorError> {
        coerce_value(raw, &col(kind), NaiveTimestampPolicy::Reject)
    }

    #[test]
    fn null_is_null_for_every_kind() {
        for kind in [
            ColumnKind::Integer,
            ColumnKind::Float,
            ColumnKind::Decimal,
            ColumnKind::Boolean,
            ColumnKind::Text,
            ColumnKind::Binary,
            ColumnKind::Date,
            ColumnKind::Time,
            ColumnKind::Timestamp,
            ColumnKind::TimestampTz,
            ColumnKind::Json,
            ColumnKind::Dynamic,
        ] {
            assert_eq!(coerce(RawValue::Null, kind).unwrap(), RowValues::Null, "{kind}");
        }
    }

    #[test]
    fn integer_accepts_integral_forms() {
        assert_eq!(coerce(RawValue::Int(7), ColumnKind::Integer).unwrap(), RowValues::Int(7));
        assert_eq!(coerce(RawValue::Float(3.0), ColumnKind::Integer).unwrap(), RowValues::Int(3));
        assert_eq!(
            coerce(RawValue::Text(" -42 ".into()), ColumnKind::Integer).unwrap(),
            RowValues::Int(-42)
        );
    }

    #[test]
    fn integer_rejects_malformed_and_out_of_range() {
        let err = coerce(RawValue::Text("abc".into()), ColumnKind::Integer).unwrap_err();
        match err {
            SqlCursorError::CoercionFailure { column, index, kind, .. } => {
                assert_eq!(column, "c");
                assert_eq!(index, 3);
                assert_eq!(kind, ColumnKind::Integer);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(coerce(RawValue::Text("99999999999999999999".into()), ColumnKind::Integer).is_err());
        assert!(coerce(RawValue::Float(1.5), ColumnKind::Integer).is_err());
        assert!(coerce(RawValue::Float(f64::NAN), ColumnKind::Integer).is_err());
        assert!(coerce(RawValue::Float(9.3e18), ColumnKind::Integer).is_err());
        assert!(coerce(RawValue::Bytes(vec![1]), ColumnKind::Integer).is_err());
    }

    #[test]
    fn float_and_decimal() {
        assert_eq!(coerce(RawValue::Int(2), ColumnKind::Float).unwrap(), RowValues::Float(2.0));
        assert_eq!(
            coerce(RawValue::Text("2.5".into()), ColumnKind::Float).unwrap(),
            RowValues::Float(2.5)
        );
        assert!(coerce(RawValue::Text("inf".into()), ColumnKind::Float).is_err());
        assert_eq!(
            coerce(RawValue::Int(1 << 53), ColumnKind::Float).unwrap(),
            RowValues::Float(9_007_199_254_740_992.0)
        );

        assert_eq!(
            coerce(RawValue::Text("12.340".into()), ColumnKind::Decimal).unwrap(),
            RowValues::Decimal(Decimal::new(12340, 3))
        );
        assert_eq!(
            coerce(RawValue::Int(5), ColumnKind::Decimal).unwrap(),
            RowValues::Decimal(Decimal::from(5))
        );
        assert!(coerce(RawValue::Float(f64::NAN), ColumnKind::Decimal).is_err());
        assert!(coerce(RawValue::Text("1.2.3".into()), ColumnKind::Decimal).is_err());
    }

    #[test]
    fn boolean_like_representations() {
        assert_eq!(coerce(RawValue::Int(1), ColumnKind::Boolean).unwrap(), RowValues::Bool(true));
        assert_eq!(coerce(RawValue::Int(0), ColumnKind::Boolean).unwrap(), RowValues::Bool(false));
        assert_eq!(
            coerce(RawValue::Text("TRUE".into()), ColumnKind::Boolean).unwrap(),
            RowValues::Bool(true)
        );
        assert_eq!(
            coerce(RawValue::Text("f".into()), ColumnKind::Boolean).unwrap(),
            RowValues::Bool(false)
        );
        assert!(coerce(RawValue::Int(2), ColumnKind::Boolean).is_err());
        assert!(coerce(RawValue::Text("yes please".into()), ColumnKind::Boolean).is_err());
    }

    #[test]
    fn text_and_binary_pass_through() {
        assert_eq!(
            coerce(RawValue::Text("héllo".into()), ColumnKind::Text).unwrap(),
            RowValues::Text("héllo".into())
        );
        assert_eq!(
            coerce(RawValue::Bytes(vec![0, 159, 146]), ColumnKind::Binary).unwrap(),
            RowValues::Blob(vec![0, 159, 146])
        );
        assert!(coerce(RawValue::Bytes(vec![0xff, 0xfe]), ColumnKind::Text).is_err());
    }

    #[test]
    fn float_rejects_integers_that_lose_precision() {
        for i in [(1_i64 << 53) + 1, i64::MAX, i64::MIN + 1] {
            let err = coerce(RawValue::Int(i), ColumnKind::Float).unwrap_err();
            assert!(
                matches!(err, SqlCursorError::CoercionFailure { kind: ColumnKind::Float, .. }),
                "{i}: {err:?}"
            );
        }
        assert_eq!(
            coerce(RawValue::Int(i64::MIN), ColumnKind::Float).unwrap(),
            RowValues::Float(-9_223_372_036_854_775_808.0)
        );
    }

    #[test]
    fn dynamic_keeps_driver_representation() {
        assert_eq!(coerce(RawValue::Int(2), ColumnKind::Dynamic).unwrap(), RowValues::Int(2));
        assert_eq!(
            coerce(RawValue::Float(1.5), ColumnKind::Dynamic).unwrap(),
            RowValues::Float(1.5)
        );
        assert_eq!(
            coerce(RawValue::Text("5".into()), ColumnKind::Dynamic).unwrap(),
            RowValues::Text("5".into())
        );
        assert_eq!(
            coerce(RawValue::Bytes(vec![0xDE, 0xAD]), ColumnKind::Dynamic).unwrap(),
            RowValues::Blob(vec![0xDE, 0xAD])
        );
        assert_eq!(
            coerce(RawValue::Bool(true), ColumnKind::Dynamic).unwrap(),
            RowValues::Bool(true)
        );
    }

    #[test]
    fn dates_and_times() {
        assert_eq!(
            coerce(RawValue::Text("2024-02-29".into()), ColumnKind::Date).unwrap(),
            RowValues::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert!(coerce(RawValue::Text("02/29/2024".into()), ColumnKind::Date).is_err());
        assert_eq!(
            coerce(RawValue::Text("13:14:15".into()), ColumnKind::Time).unwrap(),
            RowValues::Time(NaiveTime::from_hms_opt(13, 14, 15).unwrap())
        );
    }

    #[test]
    fn timestamps_require_explicit_zone() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 1, 4, 5).unwrap();
        assert_eq!(
            coerce(RawValue::Text("2024-01-02T03:04:05+02:00".into()), ColumnKind::Timestamp)
                .unwrap(),
            RowValues::Timestamp(expected)
        );
        assert_eq!(
            coerce(RawValue::Text("2024-01-02 03:04:05+02:00".into()), ColumnKind::TimestampTz)
                .unwrap(),
            RowValues::Timestamp(expected)
        );
        assert_eq!(
            coerce(RawValue::Int(0), ColumnKind::Timestamp).unwrap(),
            RowValues::Timestamp(DateTime::<Utc>::UNIX_EPOCH)
        );
        assert!(coerce(RawValue::Text("2024-01-02 03:04:05".into()), ColumnKind::Timestamp).is_err());
        assert!(coerce(RawValue::Float(1.5), ColumnKind::Timestamp).is_err());
    }

    #[test]
    fn naive_timestamps_can_assume_utc() {
        let column = col(ColumnKind::Timestamp);
        let value = coerce_value(
            RawValue::Text("2024-01-02 03:04:05".into()),
            &column,
            NaiveTimestampPolicy::AssumeUtc,
        )
        .unwrap();
        assert_eq!(
            value,
            RowValues::Timestamp(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
        );

        // timestamptz never guesses
        let column = col(ColumnKind::TimestampTz);
        assert!(
            coerce_value(
                RawValue::Text("2024-01-02 03:04:05".into()),
                &column,
                NaiveTimestampPolicy::AssumeUtc,
            )
            .is_err()
        );
    }

    #[test]
    fn json_values() {
        assert_eq!(
            coerce(RawValue::Text(r#"{"a":[1,2]}"#.into()), ColumnKind::Json).unwrap(),
            RowValues::JSON(json!({"a": [1, 2]}))
        );
        assert_eq!(coerce(RawValue::Bool(true), ColumnKind::Json).unwrap(), RowValues::JSON(json!(true)));
        assert!(coerce(RawValue::Text("{".into()), ColumnKind::Json).is_err());
    }
}
