//! Favorites and deletion over sets of contacts.
//!
//! Each operation splits its input by source: private contacts go to the
//! local store in a single call, provider contacts go to the provider in
//! batches. Either side is skipped entirely when it has nothing to do.

use roster_core::{
  contact::Contact,
  local::LocalContactStore,
  provider::{Column, ContactProvider, Operation, Selection, Table},
};

use crate::{ContactsHelper, Error, Result};

/// Most favorite updates submitted in one provider batch.
pub const FAVORITES_BATCH_LIMIT: usize = 100;

fn split_private(contacts: &[Contact]) -> (Vec<i64>, Vec<&Contact>) {
  let (private, shared): (Vec<&Contact>, Vec<&Contact>) =
    contacts.iter().partition(|c| c.is_private());
  (private.into_iter().map(|c| c.id).collect(), shared)
}

impl<P, L> ContactsHelper<P, L>
where
  P: ContactProvider,
  L: LocalContactStore,
{
  // ─── Favorites ─────────────────────────────────────────────────────────────

  /// Star every contact. Returns `true` iff every submitted call succeeded.
  pub async fn add_favorites(&self, contacts: &[Contact]) -> bool {
    self.toggle_favorites(contacts, true).await
  }

  /// Unstar every contact. Returns `true` iff every submitted call succeeded.
  pub async fn remove_favorites(&self, contacts: &[Contact]) -> bool {
    self.toggle_favorites(contacts, false).await
  }

  async fn toggle_favorites(&self, contacts: &[Contact], starred: bool) -> bool {
    let (private_ids, shared) = split_private(contacts);

    let mut ok = true;
    if !private_ids.is_empty()
      && let Err(e) = self.local.toggle_favorites(private_ids, starred).await
    {
      self.report(&Error::local(e));
      ok = false;
    }
    if let Err(e) = self.toggle_provider_favorites(&shared, starred).await {
      self.report(&e);
      ok = false;
    }
    ok
  }

  /// One update per aggregate, flushed every [`FAVORITES_BATCH_LIMIT`]
  /// operations. Stops at the first failing batch.
  async fn toggle_provider_favorites(&self, contacts: &[&Contact], starred: bool) -> Result<()> {
    for chunk in contacts.chunks(FAVORITES_BATCH_LIMIT) {
      let ops = chunk
        .iter()
        .map(|c| {
          Operation::update(Table::Contacts)
            .with_selection(Selection::eq(Column::ContactId, c.contact_id))
            .with_value(Column::Starred, starred)
        })
        .collect::<Vec<_>>();
      tracing::debug!(operations = ops.len(), starred, "flushing favorites batch");
      self.provider.apply_batch(ops).await.map_err(Error::provider)?;
    }
    Ok(())
  }

  // ─── Deletion ──────────────────────────────────────────────────────────────

  pub async fn delete_contact(&self, contact: &Contact) -> bool {
    if contact.is_private() {
      let result = self.local.delete_contact(contact.id).await;
      return self.reported(result.map(|()| true).map_err(Error::local));
    }
    self.delete_contacts(std::slice::from_ref(contact)).await
  }

  /// Delete every contact. Provider contacts go in one batch with one delete
  /// per raw contact. Returns `true` iff every submitted call succeeded.
  pub async fn delete_contacts(&self, contacts: &[Contact]) -> bool {
    let (private_ids, shared) = split_private(contacts);

    let mut ok = true;
    if !private_ids.is_empty()
      && let Err(e) = self.local.delete_contacts(private_ids).await
    {
      self.report(&Error::local(e));
      ok = false;
    }

    if !shared.is_empty() {
      let ops = shared
        .iter()
        .map(|c| {
          Operation::delete(Table::RawContacts)
            .with_selection(Selection::eq(Column::RawContactId, c.id))
        })
        .collect::<Vec<_>>();
      tracing::debug!(operations = ops.len(), "deleting provider contacts");
      if let Err(e) = self.provider.apply_batch(ops).await {
        self.report(&Error::provider(e));
        ok = false;
      }
    }
    ok
  }
}
