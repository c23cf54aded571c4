//! Typed data rows: how each contact method maps onto a provider mimetype.

use roster_core::{
  contact::{Address, Email, Event, PhoneNumber},
  provider::{Column, Mimetype},
};

/// A `(value, kind)` item stored as one data row.
pub(crate) trait DataItem: Sized {
  const MIMETYPE: Mimetype;
  const VALUE: Column;
  const KIND: Column;

  fn from_parts(value: String, kind: i32) -> Self;

  fn value(&self) -> &str;

  fn kind(&self) -> i32;
}

macro_rules! data_item {
  ($ty:ident, $mimetype:ident, $value:ident, $kind:ident) => {
    impl DataItem for $ty {
      const MIMETYPE: Mimetype = Mimetype::$mimetype;
      const VALUE: Column = Column::$value;
      const KIND: Column = Column::$kind;

      fn from_parts(value: String, kind: i32) -> Self { Self::new(value, kind) }

      fn value(&self) -> &str { &self.value }

      fn kind(&self) -> i32 { self.kind }
    }
  };
}

data_item!(PhoneNumber, Phone, Number, PhoneType);
data_item!(Email, Email, EmailAddress, EmailType);
data_item!(Address, StructuredPostal, FormattedAddress, AddressType);
data_item!(Event, Event, EventStartDate, EventType);
