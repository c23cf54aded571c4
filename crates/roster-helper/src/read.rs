//! Listing and single-contact reads.

use std::collections::{BTreeMap, HashSet};

use roster_core::{
  contact::{Address, Contact, ContactSource, Email, Event, PhoneNumber},
  local::LocalContactStore,
  provider::{Column, ContactProvider, Mimetype, Query, Row, Selection, Table},
};
use tokio::sync::oneshot;

use crate::{ContactsHelper, Error, Result, data::DataItem};

/// Columns read from a name row to build a partial contact.
const CONTACT_PROJECTION: [Column; 9] = [
  Column::ContactId,
  Column::RawContactId,
  Column::GivenName,
  Column::MiddleName,
  Column::FamilyName,
  Column::PhotoUri,
  Column::PhotoThumbnailUri,
  Column::Starred,
  Column::AccountName,
];

pub(crate) fn rows_of(raw_contact_id: i64, mimetype: Mimetype) -> Selection {
  Selection::eq(Column::RawContactId, raw_contact_id).and(Column::Mimetype, mimetype)
}

fn contact_from_row(row: &Row) -> Result<Contact> {
  Ok(Contact {
    id: row.require_i64(Column::RawContactId)?,
    contact_id: row.int(Column::ContactId),
    first_name: row.string(Column::GivenName),
    middle_name: row.string(Column::MiddleName),
    surname: row.string(Column::FamilyName),
    photo_uri: row.string(Column::PhotoUri),
    thumbnail_uri: row.string(Column::PhotoThumbnailUri),
    source: row.string(Column::AccountName),
    starred: row.int(Column::Starred) == 1,
    ..Contact::default()
  })
}

impl<P, L> ContactsHelper<P, L>
where
  P: ContactProvider,
  L: LocalContactStore,
{
  pub(crate) async fn query(&self, query: Query) -> Result<Vec<Row>> {
    self.provider.query(query).await.map_err(Error::provider)
  }

  // ─── Listing ───────────────────────────────────────────────────────────────

  /// Every contact, provider and private, one entry per aggregate, in the
  /// configured order.
  ///
  /// A failing step is reported and contributes nothing; the listing still
  /// completes with whatever the other steps produced.
  pub async fn get_contacts(&self) -> Vec<Contact> {
    let mut by_raw_id: BTreeMap<i64, Contact> = BTreeMap::new();

    for contact in self.reported(self.fetch_named_contacts().await) {
      by_raw_id.insert(contact.id, contact);
    }

    for (raw_id, numbers) in self.reported(self.fetch_items::<PhoneNumber>(None).await) {
      if let Some(contact) = by_raw_id.get_mut(&raw_id) {
        contact.phone_numbers = numbers;
      }
    }

    let private = self.local.get_contacts().await.map_err(Error::local);
    for contact in self.reported(private) {
      by_raw_id.insert(contact.id, contact);
    }

    let mut seen = HashSet::new();
    let mut contacts: Vec<Contact> = by_raw_id
      .into_values()
      .filter(|c| seen.insert(c.contact_id))
      .collect();

    self.config.sorting.sort(&mut contacts);
    tracing::debug!(count = contacts.len(), "listed contacts");
    contacts
  }

  /// Run [`get_contacts`](Self::get_contacts) on a background task. The
  /// listing is delivered once on the returned channel.
  pub fn spawn_get_contacts(&self) -> oneshot::Receiver<Vec<Contact>>
  where
    P: 'static,
    L: 'static,
  {
    let (tx, rx) = oneshot::channel();
    let helper = self.clone();
    tokio::spawn(async move {
      let _ = tx.send(helper.get_contacts().await);
    });
    rx
  }

  async fn fetch_named_contacts(&self) -> Result<Vec<Contact>> {
    let rows = self
      .query(
        Query::new(Table::Data)
          .projection(CONTACT_PROJECTION)
          .selection(Selection::eq(Column::Mimetype, Mimetype::StructuredName))
          .sort_order(self.config.sorting.sort_order()),
      )
      .await?;
    rows.iter().map(contact_from_row).collect()
  }

  // ─── Single contact ────────────────────────────────────────────────────────

  /// The contact with raw id `id`, fully hydrated. Private ids are looked up
  /// in the local store. `None` for id 0, for a miss, or on error.
  pub async fn get_contact_with_id(&self, id: i64, is_private: bool) -> Option<Contact> {
    if id == 0 {
      return None;
    }

    let result = if is_private {
      self.local.get_contact_with_id(id).await.map_err(Error::local)
    } else {
      self.fetch_contact(id).await
    };
    self.reported(result)
  }

  async fn fetch_contact(&self, raw_id: i64) -> Result<Option<Contact>> {
    let rows = self
      .query(
        Query::new(Table::Data)
          .projection(CONTACT_PROJECTION)
          .selection(rows_of(raw_id, Mimetype::StructuredName)),
      )
      .await?;
    let Some(row) = rows.first() else {
      return Ok(None);
    };

    let mut contact = contact_from_row(row)?;
    contact.phone_numbers = self.items_of(raw_id).await?;
    contact.emails = self.items_of(raw_id).await?;
    contact.addresses = self.items_of(raw_id).await?;
    contact.events = self.items_of(raw_id).await?;
    contact.notes = self.fetch_notes(raw_id).await?;
    Ok(Some(contact))
  }

  pub async fn get_phone_numbers(&self, raw_id: i64) -> Vec<PhoneNumber> {
    self.reported(self.items_of(raw_id).await)
  }

  pub async fn get_emails(&self, raw_id: i64) -> Vec<Email> {
    self.reported(self.items_of(raw_id).await)
  }

  pub async fn get_addresses(&self, raw_id: i64) -> Vec<Address> {
    self.reported(self.items_of(raw_id).await)
  }

  pub async fn get_events(&self, raw_id: i64) -> Vec<Event> {
    self.reported(self.items_of(raw_id).await)
  }

  /// The note text of a raw contact; empty when it has none.
  pub async fn get_notes(&self, raw_id: i64) -> String {
    self.reported(self.fetch_notes(raw_id).await)
  }

  async fn items_of<T: DataItem>(&self, raw_id: i64) -> Result<Vec<T>> {
    Ok(
      self
        .fetch_items(Some(raw_id))
        .await?
        .remove(&raw_id)
        .unwrap_or_default(),
    )
  }

  /// Items of type `T` grouped by raw id; only those of `raw_id` when given.
  /// Rows with no value are skipped.
  async fn fetch_items<T: DataItem>(
    &self,
    raw_id: Option<i64>,
  ) -> Result<BTreeMap<i64, Vec<T>>> {
    let selection = match raw_id {
      Some(id) => rows_of(id, T::MIMETYPE),
      None => Selection::eq(Column::Mimetype, T::MIMETYPE),
    };
    let rows = self
      .query(
        Query::new(Table::Data)
          .projection([Column::RawContactId, T::VALUE, T::KIND])
          .selection(selection),
      )
      .await?;

    let mut items: BTreeMap<i64, Vec<T>> = BTreeMap::new();
    for row in rows {
      let owner = row.require_i64(Column::RawContactId)?;
      let Some(value) = row.get_str(T::VALUE) else {
        tracing::warn!(
          raw_contact_id = owner,
          mimetype = T::MIMETYPE.as_str(),
          "skipping data row without a value"
        );
        continue;
      };
      let code = row.int(T::KIND);
      let kind = i32::try_from(code).unwrap_or_else(|_| {
        tracing::warn!(
          raw_contact_id = owner,
          mimetype = T::MIMETYPE.as_str(),
          code,
          "type code out of range, using 0"
        );
        0
      });
      items
        .entry(owner)
        .or_default()
        .push(T::from_parts(value.to_owned(), kind));
    }
    Ok(items)
  }

  async fn fetch_notes(&self, raw_id: i64) -> Result<String> {
    let rows = self
      .query(
        Query::new(Table::Data)
          .projection([Column::Note])
          .selection(rows_of(raw_id, Mimetype::Note)),
      )
      .await?;
    Ok(rows.first().map(|r| r.string(Column::Note)).unwrap_or_default())
  }

  // ─── Sources ───────────────────────────────────────────────────────────────

  /// Distinct accounts that hold provider contacts, in first-seen order,
  /// followed by the private pseudo-account.
  pub async fn get_contact_sources(&self) -> Vec<ContactSource> {
    let mut sources = self.reported(self.fetch_sources().await);
    sources.push(ContactSource::private(&self.config.private_source_label));
    sources
  }

  /// Run [`get_contact_sources`](Self::get_contact_sources) on a background
  /// task.
  pub fn spawn_get_contact_sources(&self) -> oneshot::Receiver<Vec<ContactSource>>
  where
    P: 'static,
    L: 'static,
  {
    let (tx, rx) = oneshot::channel();
    let helper = self.clone();
    tokio::spawn(async move {
      let _ = tx.send(helper.get_contact_sources().await);
    });
    rx
  }

  async fn fetch_sources(&self) -> Result<Vec<ContactSource>> {
    let rows = self
      .query(
        Query::new(Table::RawContacts).projection([Column::AccountName, Column::AccountType]),
      )
      .await?;

    let mut seen = HashSet::new();
    let mut sources = Vec::new();
    for row in rows {
      let (Some(name), Some(kind)) =
        (row.get_str(Column::AccountName), row.get_str(Column::AccountType))
      else {
        continue;
      };
      let source = ContactSource::new(name, kind);
      if seen.insert(source.clone()) {
        sources.push(source);
      }
    }
    Ok(sources)
  }

  /// Account type of the first raw contact stored under `account_name`.
  /// Empty for an empty name or when no such account exists.
  pub(crate) async fn source_type(&self, account_name: &str) -> Result<String> {
    if account_name.is_empty() {
      return Ok(String::new());
    }

    let rows = self
      .query(
        Query::new(Table::RawContacts)
          .projection([Column::AccountType])
          .selection(Selection::eq(Column::AccountName, account_name)),
      )
      .await?;
    Ok(
      rows
        .first()
        .map(|r| r.string(Column::AccountType))
        .unwrap_or_default(),
    )
  }

  // ─── Identity ──────────────────────────────────────────────────────────────

  /// `"{lookup_key}/{contact_id}"` for the aggregate of raw contact
  /// `raw_id`, or an empty string when it cannot be found.
  pub async fn get_contact_lookup_key(&self, raw_id: i64) -> String {
    self.reported(self.fetch_lookup_key(raw_id).await)
  }

  async fn fetch_lookup_key(&self, raw_id: i64) -> Result<String> {
    let rows = self
      .query(
        Query::new(Table::Data)
          .projection([Column::ContactId, Column::LookupKey])
          .selection(rows_of(raw_id, Mimetype::StructuredName)),
      )
      .await?;
    Ok(
      rows
        .first()
        .map(|r| {
          format!("{}/{}", r.string(Column::LookupKey), r.int(Column::ContactId))
        })
        .unwrap_or_default(),
    )
  }

  /// Aggregate id of raw contact `raw_id`; 0 when it has no name row.
  pub(crate) async fn real_contact_id(&self, raw_id: i64) -> Result<i64> {
    let rows = self
      .query(
        Query::new(Table::Data)
          .projection([Column::ContactId])
          .selection(rows_of(raw_id, Mimetype::StructuredName)),
      )
      .await?;
    Ok(rows.first().map(|r| r.int(Column::ContactId)).unwrap_or(0))
  }
}
