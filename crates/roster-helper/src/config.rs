//! Helper configuration, usually deserialised from the `[helper]` table of
//! `roster.toml`.

use roster_core::{contact::PRIVATE_SOURCE_LABEL, sorting::Sorting};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperConfig {
  /// Order of [`get_contacts`](crate::ContactsHelper::get_contacts) results.
  #[serde(default)]
  pub sorting:              Sorting,
  /// Display name of the private pseudo-account in source listings.
  #[serde(default = "default_private_source_label")]
  pub private_source_label: String,
}

fn default_private_source_label() -> String { PRIVATE_SOURCE_LABEL.to_owned() }

impl Default for HelperConfig {
  fn default() -> Self {
    Self {
      sorting:              Sorting::default(),
      private_source_label: default_private_source_label(),
    }
  }
}
