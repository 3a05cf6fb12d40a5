use sql_cursor::prelude::*;
use sql_cursor::test_utils::MemorySource;

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", ColumnKind::Integer),
        ColumnDescriptor::new("name", ColumnKind::Text),
    ]
}

#[test]
fn non_numeric_integer_names_the_column() -> Result<(), Box<dyn std::error::Error>> {
    let source = MemorySource::new(vec![
        vec![RawValue::Int(1), RawValue::Text("a".into())],
        vec![RawValue::Text("two".into()), RawValue::Text("b".into())],
        vec![RawValue::Int(3), RawValue::Text("c".into())],
    ]);
    let mut cursor = RowCursor::new(source, columns());

    assert!(cursor.advance()?);
    let err = cursor.advance().unwrap_err();
    match &err {
        SqlCursorError::CoercionFailure {
            column,
            index,
            kind,
            ..
        } => {
            assert_eq!(column, "id");
            assert_eq!(*index, 0);
            assert_eq!(*kind, ColumnKind::Integer);
        }
        other => panic!("expected coercion failure, got {other:?}"),
    }
    assert!(err.is_decode_error());
    assert!(err.to_string().contains("id"));

    // state and previous row untouched
    assert_eq!(cursor.state(), CursorState::Positioned);
    assert_eq!(cursor.current_row()?.get("id"), Some(&RowValues::Int(1)));

    // skipping the bad row is the caller's call
    assert!(cursor.advance()?);
    assert_eq!(cursor.current_row()?.get("id"), Some(&RowValues::Int(3)));
    Ok(())
}

#[test]
fn coercion_failure_on_first_row_keeps_cursor_fresh() {
    let source = MemorySource::new(vec![vec![RawValue::Bytes(vec![1, 2]), RawValue::Null]]);
    let mut cursor = RowCursor::new(source, columns());
    assert!(cursor.advance().is_err());
    assert_eq!(cursor.state(), CursorState::Fresh);
    assert!(cursor.current_row().is_err());
}

#[test]
fn strict_policy_rejects_short_rows() -> Result<(), Box<dyn std::error::Error>> {
    let source = MemorySource::new(vec![vec![RawValue::Int(1)]]);
    let mut cursor = RowCursor::new(source, columns());
    let err = cursor.advance().unwrap_err();
    assert!(matches!(
        err,
        SqlCursorError::FieldCountMismatch {
            expected: 2,
            actual: 1
        }
    ));
    assert_eq!(cursor.state(), CursorState::Fresh);
    assert!(!cursor.advance()?);
    Ok(())
}

#[test]
fn tolerate_policy_pads_and_truncates() -> Result<(), Box<dyn std::error::Error>> {
    let source = MemorySource::new(vec![
        vec![RawValue::Int(1)],
        vec![
            RawValue::Int(2),
            RawValue::Text("b".into()),
            RawValue::Text("extra".into()),
        ],
    ]);
    let options = CursorOptions::builder(DriverKind::Memory)
        .field_count_policy(FieldCountPolicy::Tolerate)
        .finish();
    let mut cursor = RowCursor::with_options(source, columns(), options);

    assert!(cursor.advance()?);
    assert_eq!(
        cursor.current_row()?.values(),
        &[RowValues::Int(1), RowValues::Null]
    );
    assert!(cursor.advance()?);
    assert_eq!(
        cursor.current_row()?.values(),
        &[RowValues::Int(2), RowValues::Text("b".into())]
    );
    Ok(())
}

#[test]
fn row_length_matches_columns() -> Result<(), Box<dyn std::error::Error>> {
    let source = MemorySource::new(vec![vec![RawValue::Int(9), RawValue::Null]]);
    let mut cursor = RowCursor::new(source, columns());
    assert!(cursor.advance()?);
    assert_eq!(cursor.current_row()?.len(), cursor.columns().len());
    Ok(())
}

#[test]
fn float_column_rejects_integer_beyond_double_precision() -> Result<(), Box<dyn std::error::Error>> {
    let source = MemorySource::new(vec![
        vec![RawValue::Int(9_007_199_254_740_993)],
        vec![RawValue::Int(9_007_199_254_740_992)],
    ]);
    let mut cursor = RowCursor::new(source, vec![ColumnDescriptor::new("v", ColumnKind::Float)]);

    let err = cursor.advance().unwrap_err();
    assert!(matches!(
        err,
        SqlCursorError::CoercionFailure {
            kind: ColumnKind::Float,
            index: 0,
            ..
        }
    ));
    assert_eq!(cursor.state(), CursorState::Fresh);

    assert!(cursor.advance()?);
    assert_eq!(
        cursor.current_row()?.get("v"),
        Some(&RowValues::Float(9_007_199_254_740_992.0))
    );
    Ok(())
}
