//! Error types for `roster-core`.

use thiserror::Error;

use crate::provider::Column;

#[derive(Debug, Error)]
pub enum Error {
  #[error("row has no value for column {0:?}")]
  MissingColumn(Column),

  #[error("column {column:?} holds a {found}, expected {expected}")]
  TypeMismatch {
    column:   Column,
    expected: &'static str,
    found:    &'static str,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
