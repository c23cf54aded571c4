//! Error type for `roster-helper`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("provider error: {0}")]
  Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("local store error: {0}")]
  Local(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error(transparent)]
  Core(#[from] roster_core::Error),

  #[error("failed to load photo {uri}: {source}")]
  Photo {
    uri:    String,
    #[source]
    source: std::io::Error,
  },

  #[error("background task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  /// The provider accepted a batch but reported no id for an insert.
  #[error("batch returned no id for operation {0}")]
  MissingInsertResult(usize),
}

impl Error {
  pub(crate) fn provider(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Provider(Box::new(e))
  }

  pub(crate) fn local(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Local(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
