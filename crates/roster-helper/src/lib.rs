//! The contact repository adapter.
//!
//! [`ContactsHelper`] sits between callers and two backends: the shared
//! [`ContactProvider`] and the app-private [`LocalContactStore`]. It merges
//! both into one listing, turns record edits into atomic provider batches,
//! and routes private contacts to the local store so they never reach the
//! provider.
//!
//! Public operations never return errors. Failures are handed to the
//! configured [`Notifier`] and the operation degrades: reads come back empty
//! or partial, writes return `false`.

mod bulk;
mod data;
mod read;
mod write;

pub mod config;
pub mod error;
pub mod notify;
pub mod photo;

use std::sync::Arc;

use roster_core::{local::LocalContactStore, provider::ContactProvider};

pub use bulk::FAVORITES_BATCH_LIMIT;
pub use config::HelperConfig;
pub use error::{Error, Result};
pub use notify::{Notice, Notifier, TracingNotifier};
pub use photo::{FilePhotoLoader, PhotoData, PhotoLoader};

/// Reads and writes contacts across the provider and the private store.
///
/// Cloning is cheap; every collaborator is reference-counted.
pub struct ContactsHelper<P, L> {
  provider: Arc<P>,
  local:    Arc<L>,
  notifier: Arc<dyn Notifier>,
  photos:   Arc<dyn PhotoLoader>,
  config:   HelperConfig,
}

impl<P, L> Clone for ContactsHelper<P, L> {
  fn clone(&self) -> Self {
    Self {
      provider: Arc::clone(&self.provider),
      local:    Arc::clone(&self.local),
      notifier: Arc::clone(&self.notifier),
      photos:   Arc::clone(&self.photos),
      config:   self.config.clone(),
    }
  }
}

impl<P, L> ContactsHelper<P, L>
where
  P: ContactProvider,
  L: LocalContactStore,
{
  /// A helper that reports through `tracing` and loads photos from disk.
  pub fn new(provider: Arc<P>, local: Arc<L>, config: HelperConfig) -> Self {
    Self {
      provider,
      local,
      notifier: Arc::new(TracingNotifier),
      photos: Arc::new(FilePhotoLoader),
      config,
    }
  }

  pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
    self.notifier = notifier;
    self
  }

  pub fn with_photo_loader(mut self, photos: Arc<dyn PhotoLoader>) -> Self {
    self.photos = photos;
    self
  }

  fn report(&self, error: &Error) { self.notifier.report_error(error); }

  /// Unwrap `result`, reporting an error and falling back to the default.
  fn reported<T: Default>(&self, result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
      self.report(&e);
      T::default()
    })
  }
}
