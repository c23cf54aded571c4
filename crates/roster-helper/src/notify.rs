//! User-facing notifications.

use crate::Error;

/// A progress message for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
  /// A provider contact update has started.
  Updating,
}

/// Receives progress notices and the errors that public operations swallow.
pub trait Notifier: Send + Sync {
  fn notify(&self, notice: Notice);

  fn report_error(&self, error: &Error);
}

/// Sends everything to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  fn notify(&self, notice: Notice) {
    match notice {
      Notice::Updating => tracing::info!("updating contact"),
    }
  }

  fn report_error(&self, error: &Error) {
    tracing::error!(%error, "contact operation failed");
  }
}
