//! Unit tests for the core model, sorting, and provider value types.

use crate::{
  contact::{Contact, ContactSource, PRIVATE_SOURCE, PhoneNumber},
  provider::{Column, Mimetype, Operation, OperationKind, Row, Selection, Table, Value},
  sorting::{SortField, Sorting},
};

fn named(first: &str, surname: &str) -> Contact {
  Contact {
    first_name: first.into(),
    surname: surname.into(),
    ..Contact::default()
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

#[test]
fn private_source_marks_contact_private() {
  let mut c = named("Ada", "Lovelace");
  assert!(!c.is_private());
  c.source = PRIVATE_SOURCE.into();
  assert!(c.is_private());
  assert!(ContactSource::private("Hidden").is_private());
}

#[test]
fn full_name_skips_empty_parts() {
  let mut c = named("Ada", "Lovelace");
  assert_eq!(c.full_name(), "Ada Lovelace");
  c.middle_name = "King".into();
  assert_eq!(c.full_name(), "Ada King Lovelace");
  assert_eq!(Contact::default().full_name(), "");
}

#[test]
fn contact_json_omits_absent_photo() {
  let json = serde_json::to_value(named("Ada", "Lovelace")).unwrap();
  assert!(json.get("photo").is_none());
  assert_eq!(json["first_name"], "Ada");
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[test]
fn surname_descending_puts_zeta_first() {
  let mut contacts = vec![named("a", "Alpha"), named("b", "Zeta"), named("c", "mu")];
  Sorting::new(SortField::Surname, true).sort(&mut contacts);
  let order: Vec<_> = contacts.iter().map(|c| c.surname.as_str()).collect();
  assert_eq!(order, ["Zeta", "mu", "Alpha"]);
}

#[test]
fn name_sorting_ignores_case() {
  let mut contacts = vec![named("bob", ""), named("Alice", ""), named("carol", "")];
  Sorting::default().sort(&mut contacts);
  let order: Vec<_> = contacts.iter().map(|c| c.first_name.as_str()).collect();
  assert_eq!(order, ["Alice", "bob", "carol"]);
}

#[test]
fn number_sorting_uses_first_number() {
  let mut with_late = named("x", "");
  with_late.phone_numbers = vec![PhoneNumber::new("900", 2), PhoneNumber::new("100", 1)];
  let mut with_early = named("y", "");
  with_early.phone_numbers = vec![PhoneNumber::new("200", 2)];
  let without = named("z", "");

  let mut contacts = vec![with_late, with_early, without];
  Sorting::new(SortField::Number, false).sort(&mut contacts);
  let order: Vec<_> = contacts.iter().map(|c| c.first_name.as_str()).collect();
  assert_eq!(order, ["z", "y", "x"]);
}

#[test]
fn sorting_deserialises_with_defaults() {
  let sorting: Sorting = serde_json::from_str(r#"{"field":"middle_name"}"#).unwrap();
  assert_eq!(sorting.field, SortField::MiddleName);
  assert!(!sorting.descending);
  assert_eq!(sorting.sort_order().column, Column::MiddleName);
  assert!(sorting.sort_order().case_insensitive);
}

// ─── Provider values ─────────────────────────────────────────────────────────

#[test]
fn row_accessors() {
  let row: Row = [
    (Column::RawContactId, Value::Integer(7)),
    (Column::GivenName, Value::Text("Ada".into())),
    (Column::MiddleName, Value::Null),
  ]
  .into_iter()
  .collect();

  assert_eq!(row.require_i64(Column::RawContactId).unwrap(), 7);
  assert_eq!(row.string(Column::GivenName), "Ada");
  assert_eq!(row.string(Column::MiddleName), "");
  assert_eq!(row.get_str(Column::MiddleName), None);
  assert_eq!(row.int(Column::Starred), 0);
  assert!(row.require_i64(Column::ContactId).is_err());
  assert!(row.require_i64(Column::GivenName).is_err());
}

#[test]
fn operation_builder_collects_parts() {
  let op = Operation::update(Table::Data)
    .with_selection(
      Selection::eq(Column::RawContactId, 3_i64).and(Column::Mimetype, Mimetype::Note),
    )
    .with_value(Column::Note, "hello");

  assert_eq!(op.kind, OperationKind::Update);
  assert_eq!(op.selection.terms().len(), 2);
  assert_eq!(
    op.selection.terms()[1].1,
    Value::Text(Mimetype::Note.as_str().into())
  );
  assert_eq!(op.values, vec![(Column::Note, Value::Text("hello".into()))]);
}

#[test]
fn option_converts_to_null() {
  assert_eq!(Value::from(None::<String>), Value::Null);
  assert_eq!(Value::from(Some(true)), Value::Integer(1));
}
