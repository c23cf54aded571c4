//! The in-memory contact model shared by the provider and the private store.
//!
//! A [`Contact`] is one raw record (one account's copy of a person) decorated
//! with the id of the aggregate it belongs to. Listing collapses raw records
//! that share an aggregate.

use serde::{Deserialize, Serialize};

/// Account type of the private pseudo-account. Contacts whose `source` equals
/// this value live in the local store and never reach the provider.
pub const PRIVATE_SOURCE: &str = "smt_private";

/// Default display label for the private pseudo-account.
pub const PRIVATE_SOURCE_LABEL: &str = "Phone storage (hidden)";

/// First id handed out by the local store, keeping private ids clear of
/// provider raw ids.
pub const FIRST_LOCAL_CONTACT_ID: i64 = 1_000_000;

// ─── Contact methods ─────────────────────────────────────────────────────────

/// A telephone number with its provider type code (home, mobile, work...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
  pub value: String,
  pub kind:  i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
  pub value: String,
  pub kind:  i32,
}

/// A postal address, stored preformatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
  pub value: String,
  pub kind:  i32,
}

/// A dated event such as a birthday; `value` is the start date as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub value: String,
  pub kind:  i32,
}

macro_rules! typed_value_ctor {
  ($($ty:ident),*) => {
    $(
      impl $ty {
        pub fn new(value: impl Into<String>, kind: i32) -> Self {
          Self { value: value.into(), kind }
        }
      }
    )*
  };
}

typed_value_ctor!(PhoneNumber, Email, Address, Event);

// ─── Contact ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  /// Raw record id (or local store id for private contacts).
  pub id:            i64,
  /// Aggregate id; private contacts use their own `id`.
  pub contact_id:    i64,
  pub first_name:    String,
  pub middle_name:   String,
  pub surname:       String,
  pub photo_uri:     String,
  pub thumbnail_uri: String,
  /// Account name, or [`PRIVATE_SOURCE`] for local contacts.
  pub source:        String,
  pub starred:       bool,
  pub notes:         String,
  /// Inline photo bytes; only the local store carries these.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo:         Option<Vec<u8>>,
  pub phone_numbers: Vec<PhoneNumber>,
  pub emails:        Vec<Email>,
  pub addresses:     Vec<Address>,
  pub events:        Vec<Event>,
}

impl Contact {
  pub fn is_private(&self) -> bool { self.source == PRIVATE_SOURCE }

  /// Name parts joined by single spaces, skipping empty parts.
  pub fn full_name(&self) -> String {
    [&self.first_name, &self.middle_name, &self.surname]
      .into_iter()
      .filter(|part| !part.is_empty())
      .map(String::as_str)
      .collect::<Vec<_>>()
      .join(" ")
  }
}

// ─── Sources ─────────────────────────────────────────────────────────────────

/// An account a contact can be stored in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactSource {
  pub name: String,
  pub kind: String,
}

impl ContactSource {
  pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
    Self { name: name.into(), kind: kind.into() }
  }

  /// The private pseudo-account, shown under `label`.
  pub fn private(label: impl Into<String>) -> Self {
    Self::new(label, PRIVATE_SOURCE)
  }

  pub fn is_private(&self) -> bool { self.kind == PRIVATE_SOURCE }
}

// ─── Photo changes ───────────────────────────────────────────────────────────

/// What happened to a contact's photo since it was loaded for editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoUpdate {
  #[default]
  Unchanged,
  Added,
  Changed,
  Removed,
}
