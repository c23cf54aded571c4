//! Listing order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{
  contact::Contact,
  provider::{Column, SortOrder},
};

/// The field a contact listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
  #[default]
  FirstName,
  MiddleName,
  Surname,
  /// The contact's first phone number.
  Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sorting {
  #[serde(default)]
  pub field:      SortField,
  #[serde(default)]
  pub descending: bool,
}

impl Sorting {
  pub fn new(field: SortField, descending: bool) -> Self { Self { field, descending } }

  /// The equivalent provider-side order for name rows.
  pub fn sort_order(&self) -> SortOrder {
    let (column, case_insensitive) = match self.field {
      SortField::FirstName => (Column::GivenName, true),
      SortField::MiddleName => (Column::MiddleName, true),
      SortField::Surname => (Column::FamilyName, true),
      SortField::Number => (Column::Number, false),
    };
    SortOrder { column, descending: self.descending, case_insensitive }
  }

  /// Compare two contacts. Name fields ignore case.
  pub fn compare(&self, a: &Contact, b: &Contact) -> Ordering {
    let ordering = match self.field {
      SortField::FirstName => cmp_ignore_case(&a.first_name, &b.first_name),
      SortField::MiddleName => cmp_ignore_case(&a.middle_name, &b.middle_name),
      SortField::Surname => cmp_ignore_case(&a.surname, &b.surname),
      SortField::Number => first_number(a).cmp(first_number(b)),
    };
    if self.descending { ordering.reverse() } else { ordering }
  }

  /// Stable in-place sort of a listing.
  pub fn sort(&self, contacts: &mut [Contact]) {
    contacts.sort_by(|a, b| self.compare(a, b));
  }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
  a.chars()
    .flat_map(char::to_lowercase)
    .cmp(b.chars().flat_map(char::to_lowercase))
}

fn first_number(contact: &Contact) -> &str {
  contact
    .phone_numbers
    .first()
    .map(|n| n.value.as_str())
    .unwrap_or_default()
}
