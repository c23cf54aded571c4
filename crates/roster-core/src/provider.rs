//! The structured contact-provider interface.
//!
//! The provider is the device-wide address book: raw records from every
//! account, the data rows hanging off them, and the aggregate contacts that
//! group raw records describing the same person. Callers address it by
//! [`Table`] and logical [`Column`], filter with an equality [`Selection`], and
//! write through atomic batches of [`Operation`]s.

use std::{collections::HashMap, future::Future};

use crate::{Error, Result};

// ─── Addressing ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
  /// One row per account record.
  RawContacts,
  /// One row per datum (name, phone, email...) of a raw record, joined with
  /// its raw record and aggregate for reads.
  Data,
  /// One row per aggregate contact.
  Contacts,
}

/// Logical column names. On [`Table::Data`] several of these alias the same
/// generic slot; which one applies depends on the row's [`Mimetype`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
  RawContactId,
  ContactId,
  Mimetype,
  AccountName,
  AccountType,
  GivenName,
  MiddleName,
  FamilyName,
  Number,
  PhoneType,
  EmailAddress,
  EmailType,
  FormattedAddress,
  AddressType,
  EventStartDate,
  EventType,
  Note,
  Photo,
  Starred,
  LookupKey,
  PhotoUri,
  PhotoThumbnailUri,
}

/// The kind of a row in [`Table::Data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mimetype {
  StructuredName,
  Phone,
  Email,
  StructuredPostal,
  Event,
  Note,
  Photo,
}

impl Mimetype {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::StructuredName => "vnd.android.cursor.item/name",
      Self::Phone => "vnd.android.cursor.item/phone_v2",
      Self::Email => "vnd.android.cursor.item/email_v2",
      Self::StructuredPostal => "vnd.android.cursor.item/postal-address_v2",
      Self::Event => "vnd.android.cursor.item/contact_event",
      Self::Note => "vnd.android.cursor.item/note",
      Self::Photo => "vnd.android.cursor.item/photo",
    }
  }
}

// ─── Values ──────────────────────────────────────────────────────────────────

/// A single cell, mirroring SQLite's storage classes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Integer(i64),
  Text(String),
  Blob(Vec<u8>),
}

impl Value {
  fn type_name(&self) -> &'static str {
    match self {
      Self::Null => "null",
      Self::Integer(_) => "integer",
      Self::Text(_) => "text",
      Self::Blob(_) => "blob",
    }
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<i32> for Value {
  fn from(v: i32) -> Self { Self::Integer(v.into()) }
}

impl From<bool> for Value {
  fn from(v: bool) -> Self { Self::Integer(v.into()) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl From<Vec<u8>> for Value {
  fn from(v: Vec<u8>) -> Self { Self::Blob(v) }
}

impl From<Mimetype> for Value {
  fn from(v: Mimetype) -> Self { Self::Text(v.as_str().to_owned()) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// A conjunction of `column = value` terms. Empty matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
  terms: Vec<(Column, Value)>,
}

impl Selection {
  pub fn all() -> Self { Self::default() }

  pub fn eq(column: Column, value: impl Into<Value>) -> Self {
    Self::default().and(column, value)
  }

  pub fn and(mut self, column: Column, value: impl Into<Value>) -> Self {
    self.terms.push((column, value.into()));
    self
  }

  pub fn terms(&self) -> &[(Column, Value)] { &self.terms }

  pub fn is_empty(&self) -> bool { self.terms.is_empty() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
  pub column:           Column,
  pub descending:       bool,
  pub case_insensitive: bool,
}

/// A read against one table.
#[derive(Debug, Clone)]
pub struct Query {
  pub table:      Table,
  pub projection: Vec<Column>,
  pub selection:  Selection,
  pub sort_order: Option<SortOrder>,
}

impl Query {
  pub fn new(table: Table) -> Self {
    Self {
      table,
      projection: Vec::new(),
      selection: Selection::all(),
      sort_order: None,
    }
  }

  pub fn projection(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
    self.projection = columns.into_iter().collect();
    self
  }

  pub fn selection(mut self, selection: Selection) -> Self {
    self.selection = selection;
    self
  }

  pub fn sort_order(mut self, order: SortOrder) -> Self {
    self.sort_order = Some(order);
    self
  }
}

/// One result row, keyed by the projected columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
  values: HashMap<Column, Value>,
}

impl Row {
  pub fn get(&self, column: Column) -> Option<&Value> { self.values.get(&column) }

  /// The integer in `column`; `None` when absent or NULL.
  pub fn get_i64(&self, column: Column) -> Option<i64> {
    match self.values.get(&column) {
      Some(Value::Integer(v)) => Some(*v),
      _ => None,
    }
  }

  /// The text in `column`; `None` when absent or NULL.
  pub fn get_str(&self, column: Column) -> Option<&str> {
    match self.values.get(&column) {
      Some(Value::Text(v)) => Some(v.as_str()),
      _ => None,
    }
  }

  pub fn get_blob(&self, column: Column) -> Option<&[u8]> {
    match self.values.get(&column) {
      Some(Value::Blob(v)) => Some(v.as_slice()),
      _ => None,
    }
  }

  /// Text in `column`, or an empty string.
  pub fn string(&self, column: Column) -> String {
    self.get_str(column).unwrap_or_default().to_owned()
  }

  /// Integer in `column`, or zero.
  pub fn int(&self, column: Column) -> i64 { self.get_i64(column).unwrap_or(0) }

  /// An integer that must be present.
  pub fn require_i64(&self, column: Column) -> Result<i64> {
    match self.values.get(&column) {
      Some(Value::Integer(v)) => Ok(*v),
      None | Some(Value::Null) => Err(Error::MissingColumn(column)),
      Some(other) => Err(Error::TypeMismatch {
        column,
        expected: "integer",
        found: other.type_name(),
      }),
    }
  }
}

impl FromIterator<(Column, Value)> for Row {
  fn from_iter<I: IntoIterator<Item = (Column, Value)>>(iter: I) -> Self {
    Self { values: iter.into_iter().collect() }
  }
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
  Insert,
  Update,
  Delete,
}

/// One step of an atomic batch. Built fluently:
///
/// ```
/// use roster_core::provider::{Column, Mimetype, Operation, Table};
///
/// let op = Operation::insert(Table::Data)
///   .with_back_reference(Column::RawContactId, 0)
///   .with_value(Column::Mimetype, Mimetype::Phone)
///   .with_value(Column::Number, "555-0100");
/// assert_eq!(op.back_references.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
  pub kind:            OperationKind,
  pub table:           Table,
  pub selection:       Selection,
  pub values:          Vec<(Column, Value)>,
  /// `(column, index)`: set `column` to the id produced by the insert at
  /// `index` earlier in the same batch.
  pub back_references: Vec<(Column, usize)>,
}

impl Operation {
  fn new(kind: OperationKind, table: Table) -> Self {
    Self {
      kind,
      table,
      selection: Selection::all(),
      values: Vec::new(),
      back_references: Vec::new(),
    }
  }

  pub fn insert(table: Table) -> Self { Self::new(OperationKind::Insert, table) }

  pub fn update(table: Table) -> Self { Self::new(OperationKind::Update, table) }

  pub fn delete(table: Table) -> Self { Self::new(OperationKind::Delete, table) }

  pub fn with_value(mut self, column: Column, value: impl Into<Value>) -> Self {
    self.values.push((column, value.into()));
    self
  }

  pub fn with_back_reference(mut self, column: Column, index: usize) -> Self {
    self.back_references.push((column, index));
    self
  }

  pub fn with_selection(mut self, selection: Selection) -> Self {
    self.selection = selection;
    self
  }
}

/// Outcome of one batch step: inserts report the new row id, updates and
/// deletes report the affected row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationResult {
  pub id:    Option<i64>,
  pub count: usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the shared contact provider.
///
/// All methods return `Send` futures so callers can run them on a
/// multi-threaded tokio runtime.
pub trait ContactProvider: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run a read. Rows come back in `sort_order` when one is given.
  fn query(
    &self,
    query: Query,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + '_;

  /// Apply `operations` atomically: either every step commits or none does.
  /// Results line up index-for-index with the operations.
  fn apply_batch(
    &self,
    operations: Vec<Operation>,
  ) -> impl Future<Output = Result<Vec<OperationResult>, Self::Error>> + Send + '_;

  /// A single update outside any batch. Returns the affected row count.
  fn update(
    &self,
    table: Table,
    selection: Selection,
    values: Vec<(Column, Value)>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Store the full-resolution photo of a raw contact, replacing any
  /// previous one.
  fn write_display_photo(
    &self,
    raw_contact_id: i64,
    photo: Vec<u8>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
