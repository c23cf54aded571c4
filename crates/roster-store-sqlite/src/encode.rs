//! Conversions between Roster values and SQLite storage.
//!
//! Provider cells map one-to-one onto SQLite storage classes. Private store
//! collections are stored as compact JSON arrays.

use roster_core::{
  contact::{Contact, PRIVATE_SOURCE},
  provider::Value,
};
use rusqlite::types::Value as SqlValue;
use serde::{Serialize, de::DeserializeOwned};

use crate::Result;

// ─── Cells ───────────────────────────────────────────────────────────────────

pub fn encode_value(value: Value) -> SqlValue {
  match value {
    Value::Null => SqlValue::Null,
    Value::Integer(v) => SqlValue::Integer(v),
    Value::Text(v) => SqlValue::Text(v),
    Value::Blob(v) => SqlValue::Blob(v),
  }
}

pub fn decode_value(value: SqlValue) -> Value {
  match value {
    SqlValue::Null => Value::Null,
    SqlValue::Integer(v) => Value::Integer(v),
    // The schema stores no floating point columns; keep the textual form.
    SqlValue::Real(v) => Value::Text(v.to_string()),
    SqlValue::Text(v) => Value::Text(v),
    SqlValue::Blob(v) => Value::Blob(v),
  }
}

// ─── JSON lists ──────────────────────────────────────────────────────────────

pub fn encode_list<T: Serialize>(items: &[T]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_list<T: DeserializeOwned>(s: &str) -> Result<Vec<T>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Private store rows ──────────────────────────────────────────────────────

/// Column order shared by every private-store SELECT.
pub const LOCAL_COLUMNS: &str = "id, first_name, middle_name, surname, photo, \
  phone_numbers, emails, addresses, events, starred, notes";

/// Raw values read directly from a private `contacts` row.
pub struct RawLocalContact {
  pub id:            i64,
  pub first_name:    String,
  pub middle_name:   String,
  pub surname:       String,
  pub photo:         Option<Vec<u8>>,
  pub phone_numbers: String,
  pub emails:        String,
  pub addresses:     String,
  pub events:        String,
  pub starred:       bool,
  pub notes:         String,
}

impl RawLocalContact {
  /// Read a row selected with [`LOCAL_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      first_name:    row.get(1)?,
      middle_name:   row.get(2)?,
      surname:       row.get(3)?,
      photo:         row.get(4)?,
      phone_numbers: row.get(5)?,
      emails:        row.get(6)?,
      addresses:     row.get(7)?,
      events:        row.get(8)?,
      starred:       row.get(9)?,
      notes:         row.get(10)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:            self.id,
      contact_id:    self.id,
      first_name:    self.first_name,
      middle_name:   self.middle_name,
      surname:       self.surname,
      photo_uri:     String::new(),
      thumbnail_uri: String::new(),
      source:        PRIVATE_SOURCE.to_owned(),
      starred:       self.starred,
      notes:         self.notes,
      photo:         self.photo,
      phone_numbers: decode_list(&self.phone_numbers)?,
      emails:        decode_list(&self.emails)?,
      addresses:     decode_list(&self.addresses)?,
      events:        decode_list(&self.events)?,
    })
  }
}

/// Owned column values for a private-store INSERT or UPDATE, in
/// [`LOCAL_COLUMNS`] order minus `id`.
pub struct LocalContactParams {
  pub first_name:    String,
  pub middle_name:   String,
  pub surname:       String,
  pub photo:         Option<Vec<u8>>,
  pub phone_numbers: String,
  pub emails:        String,
  pub addresses:     String,
  pub events:        String,
  pub starred:       bool,
  pub notes:         String,
}

impl LocalContactParams {
  pub fn from_contact(contact: &Contact) -> Result<Self> {
    Ok(Self {
      first_name:    contact.first_name.clone(),
      middle_name:   contact.middle_name.clone(),
      surname:       contact.surname.clone(),
      photo:         contact.photo.clone(),
      phone_numbers: encode_list(&contact.phone_numbers)?,
      emails:        encode_list(&contact.emails)?,
      addresses:     encode_list(&contact.addresses)?,
      events:        encode_list(&contact.events)?,
      starred:       contact.starred,
      notes:         contact.notes.clone(),
    })
  }
}
