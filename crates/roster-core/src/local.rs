//! The private local store contract.
//!
//! Private contacts belong to no synced account. They live in an app-owned
//! store and are merged with provider contacts when listing.

use std::future::Future;

use crate::contact::Contact;

/// Abstraction over the app-private contact store.
pub trait LocalContactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get_contacts(
    &self,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + '_;

  /// Returns `None` if no private contact has this id.
  fn get_contact_with_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Persist a new private contact and return its assigned id.
  fn insert<'a>(
    &'a self,
    contact: &'a Contact,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;

  /// Overwrite the stored contact with `contact.id`. Returns `false` when no
  /// such contact exists.
  fn update<'a>(
    &'a self,
    contact: &'a Contact,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn delete_contact(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_contacts(
    &self,
    ids: Vec<i64>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Set or clear the starred flag on every listed contact.
  fn toggle_favorites(
    &self,
    ids: Vec<i64>,
    starred: bool,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
