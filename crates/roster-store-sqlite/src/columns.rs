//! Mapping from logical provider columns to SQL.
//!
//! Reads go through the joined views; writes and write selections go to the
//! base tables, which expose fewer columns.

use roster_core::provider::{Column, Table};

/// The relation a read of `table` selects from.
pub fn read_source(table: Table) -> &'static str {
  match table {
    Table::RawContacts => "raw_contacts",
    Table::Data => "data_view",
    Table::Contacts => "contacts_view",
  }
}

/// The base table a write to `table` targets.
pub fn write_target(table: Table) -> &'static str {
  match table {
    Table::RawContacts => "raw_contacts",
    Table::Data => "data",
    Table::Contacts => "contacts",
  }
}

/// The SQL column behind `column` when reading `table`.
pub fn read_column(table: Table, column: Column) -> Option<&'static str> {
  match table {
    Table::RawContacts => raw_contact_column(column),
    Table::Contacts => match column {
      Column::PhotoUri => Some("photo_uri"),
      Column::PhotoThumbnailUri => Some("photo_thumbnail_uri"),
      other => contact_column(other),
    },
    Table::Data => match column {
      Column::ContactId => Some("contact_id"),
      Column::AccountName => Some("account_name"),
      Column::AccountType => Some("account_type"),
      Column::Starred => Some("starred"),
      Column::LookupKey => Some("lookup_key"),
      Column::PhotoUri => Some("photo_uri"),
      Column::PhotoThumbnailUri => Some("photo_thumbnail_uri"),
      other => data_column(other),
    },
  }
}

/// The SQL column behind `column` when writing (or selecting for a write on)
/// `table`.
pub fn write_column(table: Table, column: Column) -> Option<&'static str> {
  match table {
    Table::RawContacts => raw_contact_column(column),
    Table::Contacts => contact_column(column),
    Table::Data => data_column(column),
  }
}

fn raw_contact_column(column: Column) -> Option<&'static str> {
  match column {
    Column::RawContactId => Some("raw_contact_id"),
    Column::ContactId => Some("contact_id"),
    Column::AccountName => Some("account_name"),
    Column::AccountType => Some("account_type"),
    _ => None,
  }
}

fn contact_column(column: Column) -> Option<&'static str> {
  match column {
    Column::ContactId => Some("contact_id"),
    Column::Starred => Some("starred"),
    Column::LookupKey => Some("lookup_key"),
    _ => None,
  }
}

fn data_column(column: Column) -> Option<&'static str> {
  match column {
    Column::RawContactId => Some("raw_contact_id"),
    Column::Mimetype => Some("mimetype"),
    Column::Number
    | Column::EmailAddress
    | Column::FormattedAddress
    | Column::EventStartDate
    | Column::Note => Some("data1"),
    Column::GivenName
    | Column::PhoneType
    | Column::EmailType
    | Column::AddressType
    | Column::EventType => Some("data2"),
    Column::FamilyName => Some("data3"),
    Column::MiddleName => Some("data5"),
    Column::Photo => Some("data15"),
    _ => None,
  }
}
