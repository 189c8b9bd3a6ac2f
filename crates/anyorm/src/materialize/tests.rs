use super::*;
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::CoerceError;

#[derive(Debug, Default, PartialEq)]
struct Account {
    id: i64,
    name: String,
    balance: Option<f64>,
    active: bool,
    opened: Option<NaiveDateTime>,
}

impl Record for Account {
    fn fields() -> &'static [FieldMeta] {
        const FIELDS: &[FieldMeta] = &[
            FieldMeta::new("id", None, <i64 as FromValue>::KIND, false),
            FieldMeta::new("name", Some("account_name"), <String as FromValue>::KIND, false),
            FieldMeta::new("balance", None, <f64 as FromValue>::KIND, true),
            FieldMeta::new("active", None, <bool as FromValue>::KIND, false),
            FieldMeta::new("opened", None, <NaiveDateTime as FromValue>::KIND, true),
        ];
        FIELDS
    }

    fn set_field(&mut self, index: usize, value: Value) -> Result<(), CoerceError> {
        match index {
            0 => self.id = FromValue::from_value(value)?,
            1 => self.name = FromValue::from_value(value)?,
            2 => self.balance = FromValue::from_value(value)?,
            3 => self.active = FromValue::from_value(value)?,
            4 => self.opened = FromValue::from_value(value)?,
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Empty;

impl Record for Empty {
    fn fields() -> &'static [FieldMeta] {
        &[]
    }

    fn set_field(&mut self, _index: usize, _value: Value) -> Result<(), CoerceError> {
        Ok(())
    }
}

fn set(columns: &[&str], rows: Vec<Vec<Value>>) -> ResultSet {
    ResultSet::new(columns.iter().map(|c| c.to_string()).collect(), rows)
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

#[test]
fn collection_maps_by_tag_and_case_insensitive_name() {
    let rs = set(
        &["ID", "account_name", "ACTIVE", "ignored"],
        vec![
            vec![Value::Int(1), text("alice"), text("yes"), Value::Int(9)],
            vec![text("2"), text("bob"), Value::Int(0), Value::Null],
        ],
    );
    let mut out: Vec<Account> = Vec::new();
    let fetched = materialize(rs, &mut out, &MaterializeOptions::default()).unwrap();
    assert_eq!(fetched, Fetched::Rows(2));
    assert_eq!(out[0].id, 1);
    assert_eq!(out[0].name, "alice");
    assert!(out[0].active);
    assert_eq!(out[1].id, 2);
    assert!(!out[1].active);
    // Unmatched field keeps its default.
    assert_eq!(out[1].balance, None);
}

#[test]
fn field_name_matches_alongside_tag() {
    let rs = set(&["name"], vec![vec![text("carol")]]);
    let mut out: Option<Account> = None;
    materialize(rs, &mut out, &MaterializeOptions::default()).unwrap();
    assert_eq!(out.unwrap().name, "carol");
}

#[test]
fn null_leaves_optional_field_unset() {
    let rs = set(
        &["id", "balance", "opened"],
        vec![vec![Value::Int(3), Value::Null, text("2024-01-02")]],
    );
    let mut out: Option<Account> = None;
    let fetched = materialize(rs, &mut out, &MaterializeOptions::default()).unwrap();
    assert!(fetched.is_found());
    let account = out.unwrap();
    assert_eq!(account.balance, None);
    assert_eq!(
        account.opened,
        Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap())
    );
}

#[test]
fn empty_result_is_not_found() {
    let mut out: Option<Account> = Some(Account::default());
    let fetched = materialize(set(&["id"], vec![]), &mut out, &MaterializeOptions::default()).unwrap();
    assert_eq!(fetched, Fetched::NotFound);
    assert!(out.is_none());

    let mut scalar: Scalar<i64> = Scalar::new();
    let fetched = materialize(set(&["n"], vec![]), &mut scalar, &MaterializeOptions::default()).unwrap();
    assert_eq!(fetched, Fetched::NotFound);
    assert_eq!(scalar.into_inner(), None);
}

#[test]
fn surplus_rows_take_first_unless_strict() {
    let rows = vec![vec![Value::Int(1)], vec![Value::Int(2)]];
    let mut out: Option<Account> = None;
    materialize(set(&["id"], rows.clone()), &mut out, &MaterializeOptions::default()).unwrap();
    assert_eq!(out.unwrap().id, 1);

    let mut out: Option<Account> = None;
    let err = materialize(set(&["id"], rows), &mut out, &MaterializeOptions::strict()).unwrap_err();
    assert!(matches!(err, OrmError::TooManyRows { expected: 1, got: 2 }));
}

#[test]
fn coercion_failure_names_field_and_column() {
    let rs = set(
        &["id", "account_name"],
        vec![vec![Value::Int(1), text("ok")], vec![text("abc"), text("bad")]],
    );
    let mut out: Vec<Account> = Vec::new();
    let err = materialize(rs, &mut out, &MaterializeOptions::default()).unwrap_err();
    match err {
        OrmError::Coerce { field, column, source } => {
            assert_eq!(field, "id");
            assert_eq!(column, "id");
            assert_eq!(source.to, "i64");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn scalar_requires_single_column() {
    let mut scalar: Scalar<i64> = Scalar::new();
    let rs = set(&["a", "b"], vec![vec![Value::Int(1), Value::Int(2)]]);
    let err = materialize(rs, &mut scalar, &MaterializeOptions::default()).unwrap_err();
    assert!(err.is_validation());

    let rs = set(&["total"], vec![vec![text("42")]]);
    materialize(rs, &mut scalar, &MaterializeOptions::default()).unwrap();
    assert_eq!(scalar.0, Some(42));
}

#[test]
fn record_without_fields_is_rejected() {
    let mut out: Vec<Empty> = Vec::new();
    let err = materialize(set(&["id"], vec![]), &mut out, &MaterializeOptions::default()).unwrap_err();
    assert!(err.is_validation());
}
