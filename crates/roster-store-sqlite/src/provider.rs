//! [`SqliteProvider`] — the SQLite implementation of [`ContactProvider`].

use std::path::Path;

use roster_core::provider::{
  Column, ContactProvider, Operation, OperationKind, OperationResult, Query, Row,
  Selection, Table, Value,
};
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value as SqlValue};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use crate::{
  Error, Result,
  columns::{read_column, read_source, write_column, write_target},
  encode::{decode_value, encode_value},
  schema::PROVIDER_SCHEMA,
};

// ─── Planning ────────────────────────────────────────────────────────────────

/// A statement parameter, resolved only once the batch is running.
enum Slot {
  Literal(SqlValue),
  /// Id produced by the insert at this index in the same batch.
  BackReference(usize),
  /// Id of an aggregate created on the spot for a new raw contact.
  NewAggregate,
}

/// One validated batch step, ready to execute.
struct PlannedOp {
  sql:    String,
  params: Vec<Slot>,
  insert: bool,
}

fn unsupported(table: Table, column: Column) -> Error {
  Error::UnsupportedColumn { table, column }
}

/// Build `" WHERE a IS ? AND b IS ?"` for `selection`. `IS` keeps NULL
/// comparisons meaningful.
fn where_clause(
  table: Table,
  selection: &Selection,
  lookup: fn(Table, Column) -> Option<&'static str>,
) -> Result<(String, Vec<SqlValue>)> {
  if selection.is_empty() {
    return Ok((String::new(), Vec::new()));
  }

  let mut conds = Vec::with_capacity(selection.terms().len());
  let mut params = Vec::with_capacity(selection.terms().len());
  for (column, value) in selection.terms() {
    let name = lookup(table, *column).ok_or_else(|| unsupported(table, *column))?;
    conds.push(format!("{name} IS ?"));
    params.push(encode_value(value.clone()));
  }
  Ok((format!(" WHERE {}", conds.join(" AND ")), params))
}

/// Column names and parameter slots for the values an insert or update sets.
fn assignments(op: Operation) -> Result<(Vec<&'static str>, Vec<Slot>)> {
  let table = op.table;
  let mut names = Vec::with_capacity(op.values.len() + op.back_references.len());
  let mut params = Vec::with_capacity(names.capacity());

  for (column, value) in op.values {
    names.push(write_column(table, column).ok_or_else(|| unsupported(table, column))?);
    params.push(Slot::Literal(encode_value(value)));
  }
  for (column, target) in op.back_references {
    names.push(write_column(table, column).ok_or_else(|| unsupported(table, column))?);
    params.push(Slot::BackReference(target));
  }
  Ok((names, params))
}

/// Validate operation `index` of a batch whose operation kinds are `kinds`
/// and turn it into SQL.
fn plan(index: usize, op: Operation, kinds: &[OperationKind]) -> Result<PlannedOp> {
  for &(_, target) in &op.back_references {
    if target >= index || kinds[target] != OperationKind::Insert {
      return Err(Error::BadBackReference { index, target });
    }
  }

  let table = op.table;
  let kind = op.kind;
  let target = write_target(table);

  match kind {
    OperationKind::Insert => {
      if table == Table::Contacts {
        return Err(Error::UnsupportedOperation { table, kind });
      }
      let (mut names, mut params) = assignments(op)?;
      if table == Table::RawContacts && !names.contains(&"contact_id") {
        names.push("contact_id");
        params.push(Slot::NewAggregate);
      }
      let placeholders = vec!["?"; names.len()].join(", ");
      Ok(PlannedOp {
        sql: format!("INSERT INTO {target} ({}) VALUES ({placeholders})", names.join(", ")),
        params,
        insert: true,
      })
    }
    OperationKind::Update => {
      let selection = op.selection.clone();
      let (names, mut params) = assignments(op)?;
      if names.is_empty() {
        return Err(Error::EmptyUpdate(table));
      }
      let (where_sql, where_params) = where_clause(table, &selection, write_column)?;
      params.extend(where_params.into_iter().map(Slot::Literal));
      let set = names.iter().map(|n| format!("{n} = ?")).collect::<Vec<_>>().join(", ");
      Ok(PlannedOp {
        sql: format!("UPDATE {target} SET {set}{where_sql}"),
        params,
        insert: false,
      })
    }
    OperationKind::Delete => {
      if table == Table::Contacts {
        return Err(Error::UnsupportedOperation { table, kind });
      }
      let (where_sql, where_params) = where_clause(table, &op.selection, write_column)?;
      Ok(PlannedOp {
        sql: format!("DELETE FROM {target}{where_sql}"),
        params: where_params.into_iter().map(Slot::Literal).collect(),
        insert: false,
      })
    }
  }
}

// ─── Execution ───────────────────────────────────────────────────────────────

fn new_lookup_key() -> String { Uuid::new_v4().simple().to_string() }

/// Run one planned step. `results` holds the outcomes of the earlier steps
/// of the same batch.
fn execute(
  conn: &rusqlite::Connection,
  index: usize,
  op: &PlannedOp,
  results: &[OperationResult],
) -> tokio_rusqlite::Result<OperationResult> {
  let mut params = Vec::with_capacity(op.params.len());
  for slot in &op.params {
    let value = match slot {
      Slot::Literal(v) => v.clone(),
      Slot::BackReference(target) => {
        let id = results.get(*target).and_then(|r| r.id).ok_or_else(|| {
          tokio_rusqlite::Error::Other(Box::new(Error::BadBackReference {
            index,
            target: *target,
          }))
        })?;
        SqlValue::Integer(id)
      }
      Slot::NewAggregate => {
        conn.execute(
          "INSERT INTO contacts (lookup_key) VALUES (?1)",
          [new_lookup_key()],
        )?;
        SqlValue::Integer(conn.last_insert_rowid())
      }
    };
    params.push(value);
  }

  let count = conn.execute(&op.sql, params_from_iter(params))?;
  let id = op.insert.then(|| conn.last_insert_rowid());
  Ok(OperationResult { id, count })
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// A contact provider backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteProvider {
  conn: tokio_rusqlite::Connection,
}

impl SqliteProvider {
  /// Open (or create) a provider database at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let provider = Self { conn };
    provider.init_schema().await?;
    Ok(provider)
  }

  /// Open an in-memory provider for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let provider = Self { conn };
    provider.init_schema().await?;
    Ok(provider)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(PROVIDER_SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The full-resolution photo stored for a raw contact, if any.
  pub async fn display_photo(&self, raw_contact_id: i64) -> Result<Option<Vec<u8>>> {
    let photo = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT photo FROM display_photos WHERE raw_contact_id = ?1",
              [raw_contact_id],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(photo)
  }
}

// ─── ContactProvider impl ────────────────────────────────────────────────────

impl ContactProvider for SqliteProvider {
  type Error = Error;

  async fn query(&self, query: Query) -> Result<Vec<Row>> {
    let table = query.table;
    if query.projection.is_empty() {
      return Err(Error::EmptyProjection);
    }

    let exprs = query
      .projection
      .iter()
      .map(|c| read_column(table, *c).ok_or_else(|| unsupported(table, *c)))
      .collect::<Result<Vec<_>>>()?;

    let (where_sql, params) = where_clause(table, &query.selection, read_column)?;

    let order_sql = match query.sort_order {
      Some(order) => {
        let expr = read_column(table, order.column)
          .ok_or_else(|| unsupported(table, order.column))?;
        format!(
          " ORDER BY {expr}{}{}",
          if order.case_insensitive { " COLLATE NOCASE" } else { "" },
          if order.descending { " DESC" } else { "" },
        )
      }
      None => String::new(),
    };

    let sql = format!(
      "SELECT {} FROM {}{where_sql}{order_sql}",
      exprs.join(", "),
      read_source(table),
    );
    tracing::debug!(%sql, "provider query");

    let width = exprs.len();
    let cells: Vec<Vec<SqlValue>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params), |row| {
            (0..width)
              .map(|i| row.get::<_, SqlValue>(i))
              .collect::<rusqlite::Result<Vec<_>>>()
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      cells
        .into_iter()
        .map(|row| {
          query
            .projection
            .iter()
            .copied()
            .zip(row.into_iter().map(decode_value))
            .collect::<Row>()
        })
        .collect(),
    )
  }

  async fn apply_batch(&self, operations: Vec<Operation>) -> Result<Vec<OperationResult>> {
    if operations.is_empty() {
      return Ok(Vec::new());
    }

    let kinds: Vec<OperationKind> = operations.iter().map(|op| op.kind).collect();
    let planned = operations
      .into_iter()
      .enumerate()
      .map(|(index, op)| plan(index, op, &kinds))
      .collect::<Result<Vec<_>>>()?;
    tracing::debug!(operations = planned.len(), "applying provider batch");

    let results = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut results = Vec::with_capacity(planned.len());
        for (index, op) in planned.iter().enumerate() {
          let result = execute(&tx, index, op, &results)?;
          results.push(result);
        }
        tx.commit()?;
        Ok(results)
      })
      .await?;

    Ok(results)
  }

  async fn update(
    &self,
    table: Table,
    selection: Selection,
    values: Vec<(Column, Value)>,
  ) -> Result<usize> {
    let mut op = Operation::update(table).with_selection(selection);
    op.values = values;
    let planned = plan(0, op, &[OperationKind::Update])?;

    let result = self
      .conn
      .call(move |conn| execute(conn, 0, &planned, &[]))
      .await?;

    Ok(result.count)
  }

  async fn write_display_photo(&self, raw_contact_id: i64, photo: Vec<u8>) -> Result<()> {
    let content_hash = hex::encode(Sha256::digest(&photo));

    let found = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM raw_contacts WHERE raw_contact_id = ?1",
            [raw_contact_id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO display_photos (raw_contact_id, content_hash, photo)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (raw_contact_id) DO UPDATE
             SET content_hash = excluded.content_hash,
                 photo        = excluded.photo",
          rusqlite::params![raw_contact_id, content_hash, photo],
        )?;
        Ok(true)
      })
      .await?;

    if !found {
      return Err(Error::RawContactNotFound(raw_contact_id));
    }
    Ok(())
  }
}
