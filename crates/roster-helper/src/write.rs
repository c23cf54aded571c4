//! Contact updates and inserts.
//!
//! A provider write is one atomic batch. Steps the platform cannot put in a
//! batch (the starred flag on the aggregate and the full-size photo) run
//! separately and are best-effort: a failure is reported but does not fail
//! the write.

use std::sync::Arc;

use roster_core::{
  contact::{Contact, PhotoUpdate},
  local::LocalContactStore,
  provider::{Column, ContactProvider, Mimetype, Operation, Selection, Table},
};

use crate::{
  ContactsHelper, Error, Result,
  data::DataItem,
  notify::Notice,
  photo::PhotoData,
  read::rows_of,
};

/// How data rows of a batch point at their raw contact.
#[derive(Debug, Clone, Copy)]
enum RawRef {
  /// An existing raw contact.
  Id(i64),
  /// The raw contact inserted by this operation of the same batch.
  BackReference(usize),
}

impl RawRef {
  fn attach(self, op: Operation) -> Operation {
    match self {
      Self::Id(id) => op.with_value(Column::RawContactId, id),
      Self::BackReference(index) => op.with_back_reference(Column::RawContactId, index),
    }
  }
}

fn insert_data(raw: RawRef, mimetype: Mimetype) -> Operation {
  raw
    .attach(Operation::insert(Table::Data))
    .with_value(Column::Mimetype, mimetype)
}

fn insert_item<T: DataItem>(raw: RawRef, item: &T) -> Operation {
  insert_data(raw, T::MIMETYPE)
    .with_value(T::VALUE, item.value())
    .with_value(T::KIND, item.kind())
}

fn insert_items<T: DataItem>(ops: &mut Vec<Operation>, raw: RawRef, items: &[T]) {
  ops.extend(items.iter().map(|item| insert_item(raw, item)));
}

fn delete_rows(raw_id: i64, mimetype: Mimetype) -> Operation {
  Operation::delete(Table::Data).with_selection(rows_of(raw_id, mimetype))
}

/// Drop every row of `T` for the raw contact, then insert `items`.
fn replace_items<T: DataItem>(ops: &mut Vec<Operation>, raw_id: i64, items: &[T]) {
  ops.push(delete_rows(raw_id, T::MIMETYPE));
  insert_items(ops, RawRef::Id(raw_id), items);
}

fn insert_thumbnail(raw: RawRef, thumbnail: Vec<u8>) -> Operation {
  insert_data(raw, Mimetype::Photo).with_value(Column::Photo, thumbnail)
}

impl<P, L> ContactsHelper<P, L>
where
  P: ContactProvider,
  L: LocalContactStore,
{
  // ─── Update ────────────────────────────────────────────────────────────────

  /// Save an edited contact. `photo` says what happened to its photo since
  /// it was loaded. Returns `false` if the write failed.
  pub async fn update_contact(&self, contact: &Contact, photo: PhotoUpdate) -> bool {
    let result = if contact.is_private() {
      self.local.update(contact).await.map_err(Error::local)
    } else {
      self.notifier.notify(Notice::Updating);
      self.update_provider_contact(contact, photo).await.map(|()| true)
    };
    self.reported(result)
  }

  async fn update_provider_contact(&self, contact: &Contact, photo: PhotoUpdate) -> Result<()> {
    let raw_id = contact.id;
    let mut ops = vec![
      Operation::update(Table::Data)
        .with_selection(rows_of(raw_id, Mimetype::StructuredName))
        .with_value(Column::GivenName, contact.first_name.as_str())
        .with_value(Column::MiddleName, contact.middle_name.as_str())
        .with_value(Column::FamilyName, contact.surname.as_str()),
    ];
    replace_items(&mut ops, raw_id, &contact.phone_numbers);
    replace_items(&mut ops, raw_id, &contact.emails);
    replace_items(&mut ops, raw_id, &contact.addresses);
    replace_items(&mut ops, raw_id, &contact.events);
    ops.push(
      Operation::update(Table::Data)
        .with_selection(rows_of(raw_id, Mimetype::Note))
        .with_value(Column::Note, contact.notes.as_str()),
    );

    self.set_starred(contact.contact_id, contact.starred).await;

    let mut full_photo = None;
    match photo {
      PhotoUpdate::Unchanged => {}
      // A photo that fails to load leaves the existing rows untouched.
      PhotoUpdate::Added | PhotoUpdate::Changed => {
        if let Some(PhotoData { full, thumbnail }) = self.load_photo(&contact.photo_uri).await {
          if photo == PhotoUpdate::Changed {
            ops.push(delete_rows(raw_id, Mimetype::Photo));
          }
          ops.push(insert_thumbnail(RawRef::Id(raw_id), thumbnail));
          full_photo = Some(full);
        }
      }
      PhotoUpdate::Removed => ops.push(delete_rows(raw_id, Mimetype::Photo)),
    }

    tracing::debug!(raw_id, operations = ops.len(), "updating provider contact");
    self.provider.apply_batch(ops).await.map_err(Error::provider)?;

    if let Some(full) = full_photo {
      self.write_full_photo(raw_id, full).await;
    }
    Ok(())
  }

  // ─── Insert ────────────────────────────────────────────────────────────────

  /// Save a new contact, to the local store if it is private and to the
  /// provider otherwise. Returns `false` if the write failed.
  pub async fn insert_contact(&self, contact: &Contact) -> bool {
    let result = if contact.is_private() {
      self.local.insert(contact).await.map(|_| true).map_err(Error::local)
    } else {
      self.insert_provider_contact(contact).await.map(|()| true)
    };
    self.reported(result)
  }

  async fn insert_provider_contact(&self, contact: &Contact) -> Result<()> {
    let raw = RawRef::BackReference(0);
    let account_type = self.source_type(&contact.source).await?;

    let mut ops = vec![
      Operation::insert(Table::RawContacts)
        .with_value(Column::AccountName, contact.source.as_str())
        .with_value(Column::AccountType, account_type),
      insert_data(raw, Mimetype::StructuredName)
        .with_value(Column::GivenName, contact.first_name.as_str())
        .with_value(Column::MiddleName, contact.middle_name.as_str())
        .with_value(Column::FamilyName, contact.surname.as_str()),
    ];
    insert_items(&mut ops, raw, &contact.phone_numbers);
    insert_items(&mut ops, raw, &contact.emails);
    insert_items(&mut ops, raw, &contact.addresses);
    insert_items(&mut ops, raw, &contact.events);
    ops.push(insert_data(raw, Mimetype::Note).with_value(Column::Note, contact.notes.as_str()));

    let mut full_photo = None;
    if let Some(PhotoData { full, thumbnail }) = self.load_photo(&contact.photo_uri).await {
      ops.push(insert_thumbnail(raw, thumbnail));
      full_photo = Some(full);
    }

    tracing::debug!(operations = ops.len(), "inserting provider contact");
    let results = self.provider.apply_batch(ops).await.map_err(Error::provider)?;
    let raw_id = results
      .first()
      .and_then(|r| r.id)
      .ok_or(Error::MissingInsertResult(0))?;

    if let Some(full) = full_photo {
      self.write_full_photo(raw_id, full).await;
    }

    if contact.starred {
      match self.real_contact_id(raw_id).await {
        Ok(0) => {}
        Ok(contact_id) => self.set_starred(contact_id, true).await,
        Err(e) => self.report(&e),
      }
    }
    Ok(())
  }

  // ─── Best-effort steps ─────────────────────────────────────────────────────

  /// Set the starred flag of an aggregate outside any batch.
  async fn set_starred(&self, contact_id: i64, starred: bool) {
    let result = self
      .provider
      .update(
        Table::Contacts,
        Selection::eq(Column::ContactId, contact_id),
        vec![(Column::Starred, starred.into())],
      )
      .await;
    if let Err(e) = result {
      self.report(&Error::provider(e));
    }
  }

  async fn write_full_photo(&self, raw_id: i64, photo: Vec<u8>) {
    if let Err(e) = self.provider.write_display_photo(raw_id, photo).await {
      self.report(&Error::provider(e));
    }
  }

  /// Load the photo behind `uri` on the blocking pool. `None` for an empty
  /// URI or when loading fails.
  async fn load_photo(&self, uri: &str) -> Option<PhotoData> {
    if uri.is_empty() {
      return None;
    }

    let photos = Arc::clone(&self.photos);
    let owned = uri.to_owned();
    let loaded = match tokio::task::spawn_blocking(move || photos.load(&owned)).await {
      Ok(loaded) => loaded,
      Err(e) => Err(Error::from(e)),
    };

    match loaded {
      Ok(photo) => Some(photo),
      Err(e) => {
        self.report(&e);
        None
      }
    }
  }
}
