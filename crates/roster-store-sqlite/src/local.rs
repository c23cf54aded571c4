//! [`SqliteLocalStore`] — the SQLite implementation of [`LocalContactStore`].

use std::path::Path;

use roster_core::{
  contact::{Contact, FIRST_LOCAL_CONTACT_ID},
  local::LocalContactStore,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Result,
  encode::{LOCAL_COLUMNS, LocalContactParams, RawLocalContact},
  schema::{LOCAL_SCHEMA, SEED_LOCAL_SEQUENCE},
  Error,
};

/// The app-private contact store, backed by its own SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteLocalStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteLocalStore {
  /// Open (or create) a private store at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(LOCAL_SCHEMA)?;
        conn.execute(SEED_LOCAL_SEQUENCE, [FIRST_LOCAL_CONTACT_ID - 1])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `sql` once per id inside one transaction.
  async fn for_each_id(
    &self,
    sql: &'static str,
    ids: Vec<i64>,
    extra: Option<bool>,
  ) -> Result<()> {
    if ids.is_empty() {
      return Ok(());
    }

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(sql)?;
          for id in ids {
            match extra {
              Some(flag) => stmt.execute(rusqlite::params![flag, id])?,
              None => stmt.execute([id])?,
            };
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── LocalContactStore impl ──────────────────────────────────────────────────

impl LocalContactStore for SqliteLocalStore {
  type Error = Error;

  async fn get_contacts(&self) -> Result<Vec<Contact>> {
    let raws: Vec<RawLocalContact> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {LOCAL_COLUMNS} FROM contacts ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawLocalContact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLocalContact::into_contact).collect()
  }

  async fn get_contact_with_id(&self, id: i64) -> Result<Option<Contact>> {
    let raw: Option<RawLocalContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {LOCAL_COLUMNS} FROM contacts WHERE id = ?1"),
              [id],
              RawLocalContact::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLocalContact::into_contact).transpose()
  }

  async fn insert(&self, contact: &Contact) -> Result<i64> {
    let p = LocalContactParams::from_contact(contact)?;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (
             first_name, middle_name, surname, photo,
             phone_numbers, emails, addresses, events, starred, notes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            p.first_name,
            p.middle_name,
            p.surname,
            p.photo,
            p.phone_numbers,
            p.emails,
            p.addresses,
            p.events,
            p.starred,
            p.notes,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    tracing::debug!(id, "inserted private contact");
    Ok(id)
  }

  async fn update(&self, contact: &Contact) -> Result<bool> {
    let p = LocalContactParams::from_contact(contact)?;
    let id = contact.id;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contacts SET
             first_name = ?1, middle_name = ?2, surname = ?3, photo = ?4,
             phone_numbers = ?5, emails = ?6, addresses = ?7, events = ?8,
             starred = ?9, notes = ?10
           WHERE id = ?11",
          rusqlite::params![
            p.first_name,
            p.middle_name,
            p.surname,
            p.photo,
            p.phone_numbers,
            p.emails,
            p.addresses,
            p.events,
            p.starred,
            p.notes,
            id,
          ],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn delete_contact(&self, id: i64) -> Result<()> {
    self.for_each_id("DELETE FROM contacts WHERE id = ?1", vec![id], None).await
  }

  async fn delete_contacts(&self, ids: Vec<i64>) -> Result<()> {
    self.for_each_id("DELETE FROM contacts WHERE id = ?1", ids, None).await
  }

  async fn toggle_favorites(&self, ids: Vec<i64>, starred: bool) -> Result<()> {
    self
      .for_each_id("UPDATE contacts SET starred = ?1 WHERE id = ?2", ids, Some(starred))
      .await
  }
}
