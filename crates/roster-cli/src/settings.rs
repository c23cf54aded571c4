//! Runtime settings, read from `roster.toml` and `ROSTER_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use roster_helper::HelperConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
  #[serde(default = "default_provider_path")]
  pub provider_path:    PathBuf,
  #[serde(default = "default_local_store_path")]
  pub local_store_path: PathBuf,
  #[serde(default)]
  pub helper:           HelperConfig,
}

fn default_provider_path() -> PathBuf { PathBuf::from("~/.local/share/roster/provider.db") }

fn default_local_store_path() -> PathBuf { PathBuf::from("~/.local/share/roster/private.db") }

impl Settings {
  /// Read `file` (optional) and then the environment, e.g.
  /// `ROSTER_PROVIDER_PATH` or `ROSTER_HELPER__SORTING__FIELD`.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let mut settings: Self = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(
        config::Environment::with_prefix("ROSTER")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise Settings")?;

    settings.provider_path = expand_tilde(&settings.provider_path);
    settings.local_store_path = expand_tilde(&settings.local_store_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
