//! Photo loading.
//!
//! Contacts reference a picked photo by URI. Before it can be attached, the
//! photo is read into full-resolution bytes plus a thumbnail. Scaling belongs
//! to whatever image pipeline the host has; [`FilePhotoLoader`] only reads
//! files that already exist.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoData {
  pub full:      Vec<u8>,
  pub thumbnail: Vec<u8>,
}

/// Loads a photo URI. May block; the helper calls it on the blocking pool.
pub trait PhotoLoader: Send + Sync {
  fn load(&self, uri: &str) -> Result<PhotoData>;
}

/// Reads `file://` URIs and plain paths from disk.
///
/// The thumbnail comes from a `<path>.thumb` sibling when one exists and is
/// the full image otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePhotoLoader;

impl PhotoLoader for FilePhotoLoader {
  fn load(&self, uri: &str) -> Result<PhotoData> {
    let path = Path::new(uri.strip_prefix("file://").unwrap_or(uri));
    let read = |p: &Path| {
      std::fs::read(p).map_err(|source| Error::Photo { uri: uri.to_owned(), source })
    };

    let full = read(path)?;

    let mut thumb = path.as_os_str().to_owned();
    thumb.push(".thumb");
    let thumb = PathBuf::from(thumb);
    let thumbnail = if thumb.is_file() { read(&thumb)? } else { full.clone() };

    Ok(PhotoData { full, thumbnail })
  }
}
