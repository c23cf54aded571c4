//! Integration tests for `SqliteProvider` and `SqliteLocalStore` against
//! in-memory databases.

use roster_core::{
  contact::{Contact, Email, FIRST_LOCAL_CONTACT_ID, PRIVATE_SOURCE, PhoneNumber},
  local::LocalContactStore,
  provider::{
    Column, ContactProvider, Mimetype, Operation, Query, Selection, SortOrder, Table,
    Value,
  },
};

use crate::{Error, SqliteLocalStore, SqliteProvider};

async fn provider() -> SqliteProvider {
  SqliteProvider::open_in_memory()
    .await
    .expect("in-memory provider")
}

async fn local() -> SqliteLocalStore {
  SqliteLocalStore::open_in_memory()
    .await
    .expect("in-memory local store")
}

/// A batch creating one raw contact with a name and one phone number.
fn new_person(account: &str, given: &str, family: &str, number: &str) -> Vec<Operation> {
  vec![
    Operation::insert(Table::RawContacts)
      .with_value(Column::AccountName, account)
      .with_value(Column::AccountType, "com.example"),
    Operation::insert(Table::Data)
      .with_back_reference(Column::RawContactId, 0)
      .with_value(Column::Mimetype, Mimetype::StructuredName)
      .with_value(Column::GivenName, given)
      .with_value(Column::FamilyName, family),
    Operation::insert(Table::Data)
      .with_back_reference(Column::RawContactId, 0)
      .with_value(Column::Mimetype, Mimetype::Phone)
      .with_value(Column::Number, number)
      .with_value(Column::PhoneType, 2),
  ]
}

fn names_query() -> Query {
  Query::new(Table::Data)
    .projection([
      Column::RawContactId,
      Column::ContactId,
      Column::GivenName,
      Column::FamilyName,
      Column::AccountName,
      Column::Starred,
    ])
    .selection(Selection::eq(Column::Mimetype, Mimetype::StructuredName))
}

// ─── Batches ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_resolves_back_references() {
  let p = provider().await;

  let results = p
    .apply_batch(new_person("alice@example.com", "Alice", "Liddell", "555-0100"))
    .await
    .unwrap();
  assert_eq!(results.len(), 3);
  let raw_id = results[0].id.unwrap();

  let rows = p.query(names_query()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].get_i64(Column::RawContactId), Some(raw_id));
  assert_eq!(rows[0].get_str(Column::GivenName), Some("Alice"));
  assert_eq!(rows[0].get_str(Column::FamilyName), Some("Liddell"));
  assert_eq!(rows[0].get_str(Column::AccountName), Some("alice@example.com"));
  assert_eq!(rows[0].get_i64(Column::Starred), Some(0));
  assert!(rows[0].get_i64(Column::ContactId).is_some());

  let phones = p
    .query(
      Query::new(Table::Data)
        .projection([Column::Number, Column::PhoneType])
        .selection(
          Selection::eq(Column::Mimetype, Mimetype::Phone).and(Column::RawContactId, raw_id),
        ),
    )
    .await
    .unwrap();
  assert_eq!(phones.len(), 1);
  assert_eq!(phones[0].get_str(Column::Number), Some("555-0100"));
  assert_eq!(phones[0].get_i64(Column::PhoneType), Some(2));
}

#[tokio::test]
async fn failing_operation_rolls_back_whole_batch() {
  let p = provider().await;

  let mut ops = new_person("a", "Alice", "Liddell", "555-0100");
  // Violates the foreign key on data.raw_contact_id.
  ops.push(
    Operation::insert(Table::Data)
      .with_value(Column::RawContactId, 9_999_i64)
      .with_value(Column::Mimetype, Mimetype::Note)
      .with_value(Column::Note, "orphan"),
  );

  assert!(p.apply_batch(ops).await.is_err());
  assert!(p.query(names_query()).await.unwrap().is_empty());
  let raws = p
    .query(Query::new(Table::RawContacts).projection([Column::RawContactId]))
    .await
    .unwrap();
  assert!(raws.is_empty());
}

#[tokio::test]
async fn forward_back_reference_is_rejected_before_running() {
  let p = provider().await;
  let ops = vec![
    Operation::insert(Table::Data)
      .with_back_reference(Column::RawContactId, 1)
      .with_value(Column::Mimetype, Mimetype::Note),
    Operation::insert(Table::RawContacts),
  ];

  let err = p.apply_batch(ops).await.unwrap_err();
  assert!(matches!(err, Error::BadBackReference { index: 0, target: 1 }));
}

#[tokio::test]
async fn unknown_column_is_rejected() {
  let p = provider().await;
  let ops = vec![Operation::insert(Table::RawContacts).with_value(Column::Number, "1")];
  let err = p.apply_batch(ops).await.unwrap_err();
  assert!(matches!(
    err,
    Error::UnsupportedColumn { table: Table::RawContacts, column: Column::Number }
  ));

  let err = p
    .query(Query::new(Table::Contacts).projection([Column::Note]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UnsupportedColumn { .. }));
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
  let p = provider().await;
  assert!(p.apply_batch(Vec::new()).await.unwrap().is_empty());
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn raw_contact_can_join_existing_aggregate() {
  let p = provider().await;
  p.apply_batch(new_person("a", "Alice", "Liddell", "1")).await.unwrap();
  let first = p.query(names_query()).await.unwrap();
  let contact_id = first[0].require_i64(Column::ContactId).unwrap();

  let mut ops = new_person("b", "Alice", "Liddell", "2");
  ops[0] = Operation::insert(Table::RawContacts)
    .with_value(Column::AccountName, "b")
    .with_value(Column::ContactId, contact_id);
  p.apply_batch(ops).await.unwrap();

  let rows = p.query(names_query()).await.unwrap();
  assert_eq!(rows.len(), 2);
  assert!(rows.iter().all(|r| r.get_i64(Column::ContactId) == Some(contact_id)));
}

#[tokio::test]
async fn deleting_last_raw_contact_removes_aggregate_and_data() {
  let p = provider().await;
  let results = p.apply_batch(new_person("a", "Alice", "Liddell", "1")).await.unwrap();
  let raw_id = results[0].id.unwrap();

  let results = p
    .apply_batch(vec![
      Operation::delete(Table::RawContacts)
        .with_selection(Selection::eq(Column::RawContactId, raw_id)),
    ])
    .await
    .unwrap();
  assert_eq!(results[0].count, 1);

  assert!(p.query(names_query()).await.unwrap().is_empty());
  let aggregates = p
    .query(Query::new(Table::Contacts).projection([Column::ContactId]))
    .await
    .unwrap();
  assert!(aggregates.is_empty());
}

#[tokio::test]
async fn starred_update_and_lookup_key() {
  let p = provider().await;
  p.apply_batch(new_person("a", "Alice", "Liddell", "1")).await.unwrap();
  let contact_id = p.query(names_query()).await.unwrap()[0]
    .require_i64(Column::ContactId)
    .unwrap();

  let changed = p
    .update(
      Table::Contacts,
      Selection::eq(Column::ContactId, contact_id),
      vec![(Column::Starred, Value::from(true))],
    )
    .await
    .unwrap();
  assert_eq!(changed, 1);

  let rows = p
    .query(
      Query::new(Table::Contacts)
        .projection([Column::Starred, Column::LookupKey])
        .selection(Selection::eq(Column::ContactId, contact_id)),
    )
    .await
    .unwrap();
  assert_eq!(rows[0].get_i64(Column::Starred), Some(1));
  assert_eq!(rows[0].get_str(Column::LookupKey).map(str::len), Some(32));
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sort_order_is_case_insensitive() {
  let p = provider().await;
  for (given, family) in [("a", "alpha"), ("b", "Zeta"), ("c", "Mu")] {
    p.apply_batch(new_person("x", given, family, "1")).await.unwrap();
  }

  let rows = p
    .query(names_query().sort_order(SortOrder {
      column:           Column::FamilyName,
      descending:       true,
      case_insensitive: true,
    }))
    .await
    .unwrap();
  let order: Vec<_> = rows.iter().map(|r| r.string(Column::FamilyName)).collect();
  assert_eq!(order, ["Zeta", "Mu", "alpha"]);
}

#[tokio::test]
async fn selection_matches_null_with_is() {
  let p = provider().await;
  p.apply_batch(vec![Operation::insert(Table::RawContacts)]).await.unwrap();
  p.apply_batch(vec![
    Operation::insert(Table::RawContacts).with_value(Column::AccountName, "a"),
  ])
  .await
  .unwrap();

  let rows = p
    .query(
      Query::new(Table::RawContacts)
        .projection([Column::RawContactId])
        .selection(Selection::eq(Column::AccountName, Value::Null)),
    )
    .await
    .unwrap();
  assert_eq!(rows.len(), 1);
}

// ─── Photos ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn photo_uris_follow_photo_rows() {
  let p = provider().await;
  let mut ops = new_person("a", "Alice", "Liddell", "1");
  ops.push(
    Operation::insert(Table::Data)
      .with_back_reference(Column::RawContactId, 0)
      .with_value(Column::Mimetype, Mimetype::Photo)
      .with_value(Column::Photo, vec![1_u8, 2, 3]),
  );
  let raw_id = p.apply_batch(ops).await.unwrap()[0].id.unwrap();
  p.write_display_photo(raw_id, vec![9, 9, 9]).await.unwrap();

  let uris = Query::new(Table::Data)
    .projection([Column::PhotoUri, Column::PhotoThumbnailUri])
    .selection(
      Selection::eq(Column::Mimetype, Mimetype::StructuredName).and(Column::RawContactId, raw_id),
    );
  let rows = p.query(uris.clone()).await.unwrap();
  let photo_uri = rows[0].string(Column::PhotoUri);
  assert!(photo_uri.starts_with("content://roster/display_photo/"));
  assert_eq!(photo_uri.rsplit('/').next().map(str::len), Some(64));
  assert!(rows[0].string(Column::PhotoThumbnailUri).ends_with("/photo"));
  assert_eq!(p.display_photo(raw_id).await.unwrap(), Some(vec![9, 9, 9]));

  p.apply_batch(vec![
    Operation::delete(Table::Data).with_selection(
      Selection::eq(Column::RawContactId, raw_id).and(Column::Mimetype, Mimetype::Photo),
    ),
  ])
  .await
  .unwrap();

  let rows = p.query(uris).await.unwrap();
  assert_eq!(rows[0].get_str(Column::PhotoUri), None);
  assert_eq!(rows[0].get_str(Column::PhotoThumbnailUri), None);
  assert_eq!(p.display_photo(raw_id).await.unwrap(), None);
}

#[tokio::test]
async fn display_photo_for_missing_raw_contact_fails() {
  let p = provider().await;
  let err = p.write_display_photo(42, vec![1]).await.unwrap_err();
  assert!(matches!(err, Error::RawContactNotFound(42)));
}

// ─── Private store ───────────────────────────────────────────────────────────

fn private_contact(first: &str) -> Contact {
  Contact {
    first_name: first.into(),
    surname: "Private".into(),
    source: PRIVATE_SOURCE.into(),
    notes: "keep out".into(),
    phone_numbers: vec![PhoneNumber::new("555-0199", 2)],
    emails: vec![Email::new("secret@example.com", 1)],
    photo: Some(vec![7, 7]),
    ..Contact::default()
  }
}

#[tokio::test]
async fn local_ids_start_above_provider_range() {
  let s = local().await;
  let first = s.insert(&private_contact("One")).await.unwrap();
  let second = s.insert(&private_contact("Two")).await.unwrap();
  assert_eq!(first, FIRST_LOCAL_CONTACT_ID);
  assert_eq!(second, FIRST_LOCAL_CONTACT_ID + 1);
}

#[tokio::test]
async fn local_insert_and_fetch_roundtrip() {
  let s = local().await;
  let id = s.insert(&private_contact("Eve")).await.unwrap();

  let fetched = s.get_contact_with_id(id).await.unwrap().expect("stored contact");
  assert_eq!(fetched.id, id);
  assert_eq!(fetched.contact_id, id);
  assert!(fetched.is_private());
  assert_eq!(fetched.first_name, "Eve");
  assert_eq!(fetched.phone_numbers, vec![PhoneNumber::new("555-0199", 2)]);
  assert_eq!(fetched.emails, vec![Email::new("secret@example.com", 1)]);
  assert_eq!(fetched.photo, Some(vec![7, 7]));

  assert!(s.get_contact_with_id(id + 1).await.unwrap().is_none());
}

#[tokio::test]
async fn local_update_reports_missing_rows() {
  let s = local().await;
  let id = s.insert(&private_contact("Eve")).await.unwrap();

  let mut contact = s.get_contact_with_id(id).await.unwrap().unwrap();
  contact.surname = "Changed".into();
  contact.phone_numbers.clear();
  assert!(s.update(&contact).await.unwrap());

  let fetched = s.get_contact_with_id(id).await.unwrap().unwrap();
  assert_eq!(fetched.surname, "Changed");
  assert!(fetched.phone_numbers.is_empty());

  contact.id = 5;
  assert!(!s.update(&contact).await.unwrap());
}

#[tokio::test]
async fn local_favorites_and_deletes() {
  let s = local().await;
  let a = s.insert(&private_contact("A")).await.unwrap();
  let b = s.insert(&private_contact("B")).await.unwrap();
  let c = s.insert(&private_contact("C")).await.unwrap();

  s.toggle_favorites(vec![a, c], true).await.unwrap();
  let starred: Vec<_> = s
    .get_contacts()
    .await
    .unwrap()
    .into_iter()
    .filter(|c| c.starred)
    .map(|c| c.id)
    .collect();
  assert_eq!(starred, [a, c]);

  s.delete_contacts(vec![a, b]).await.unwrap();
  s.delete_contact(c).await.unwrap();
  assert!(s.get_contacts().await.unwrap().is_empty());
}
