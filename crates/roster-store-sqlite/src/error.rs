//! Error type for `roster-store-sqlite`.

use roster_core::provider::{Column, OperationKind, Table};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("column {column:?} is not available on table {table:?}")]
  UnsupportedColumn { table: Table, column: Column },

  #[error("{kind:?} is not supported on table {table:?}")]
  UnsupportedOperation { table: Table, kind: OperationKind },

  #[error("query has an empty projection")]
  EmptyProjection,

  #[error("update on {0:?} sets no values")]
  EmptyUpdate(Table),

  /// Operation `index` refers to `target`, which is not an earlier insert.
  #[error("operation {index} has an invalid back-reference to {target}")]
  BadBackReference { index: usize, target: usize },

  #[error("raw contact not found: {0}")]
  RawContactNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
