//! Filesystem blob store backend.
//!
//! Objects live directly under a root directory, one file per storage key
//! (keys contain a single `/` separating the kind prefix from the object
//! name). Writes use `create_new` so an existing key is never overwritten —
//! a same-key race degrades to a retryable error instead of data loss.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::{fs, io::AsyncWriteExt as _};

use tassel_core::blob::{BlobError, BlobStore, Removal};

use crate::sign::UrlSigner;

pub struct FsBlobStore {
  root:     PathBuf,
  /// URL prefix under which the objects are served, without trailing slash.
  base_url: String,
  signer:   UrlSigner,
}

impl FsBlobStore {
  pub fn new(
    root: impl Into<PathBuf>,
    base_url: impl Into<String>,
    signer: UrlSigner,
  ) -> Self {
    let base_url = base_url.into();
    Self {
      root: root.into(),
      base_url: base_url.trim_end_matches('/').to_string(),
      signer,
    }
  }

  /// Resolve a storage key to an on-disk path, refusing anything that could
  /// escape the root.
  fn object_path(&self, key: &str) -> Result<PathBuf, BlobError> {
    if key.is_empty()
      || key.starts_with('/')
      || Path::new(key)
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)))
    {
      return Err(BlobError::Backend(format!("invalid storage key: {key:?}")));
    }
    Ok(self.root.join(key))
  }

  /// Remove whatever landed under `path` after a failed write, so a
  /// store-write error never leaves a partial object behind. Best effort;
  /// the put error is what the caller reports.
  async fn discard_partial(&self, path: &Path) {
    if let Err(e) = fs::remove_file(path).await
      && e.kind() != std::io::ErrorKind::NotFound
    {
      tracing::warn!(?path, error = %e, "failed to discard partial object");
    }
  }
}

impl BlobStore for FsBlobStore {
  async fn put(
    &self,
    key: &str,
    bytes: Bytes,
    _content_type: &str,
  ) -> Result<(), BlobError> {
    let path = self.object_path(key)?;

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)
        .await
        .map_err(|e| BlobError::Backend(format!("create dir {parent:?}: {e}")))?;
    }

    let mut file = match fs::OpenOptions::new()
      .write(true)
      .create_new(true)
      .open(&path)
      .await
    {
      Ok(f) => f,
      Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
        return Err(BlobError::AlreadyExists(key.to_string()));
      }
      Err(e) => {
        return Err(BlobError::Backend(format!("open {path:?}: {e}")));
      }
    };

    let written = async {
      file.write_all(&bytes).await?;
      file.flush().await
    }
    .await;
    if let Err(e) = written {
      drop(file);
      self.discard_partial(&path).await;
      return Err(BlobError::Backend(format!("write {path:?}: {e}")));
    }

    tracing::debug!(key, size = bytes.len(), "object stored");
    Ok(())
  }

  fn public_url(&self, key: &str) -> String {
    format!("{}/{key}", self.base_url)
  }

  async fn signed_url(&self, key: &str, ttl_seconds: u64) -> Result<String, BlobError> {
    let qs = self.signer.query_string(key, ttl_seconds)?;
    Ok(format!("{}/{key}?{qs}", self.base_url))
  }

  async fn remove(&self, key: &str) -> Result<Removal, BlobError> {
    let path = self.object_path(key)?;
    match fs::remove_file(&path).await {
      Ok(()) => Ok(Removal::Removed),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Removal::NotFound),
      Err(e) => Err(BlobError::Backend(format!("remove {path:?}: {e}"))),
    }
  }
}
