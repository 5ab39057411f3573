//! The `BlobStore` trait — durable binary storage keyed by path.
//!
//! Implemented by storage backends (`tassel-blob`). The registrar depends on
//! this abstraction, not on any concrete backend. Every call is a direct
//! remote (or filesystem) operation; there is no caching layer.

use bytes::Bytes;
use thiserror::Error;

/// Errors raised by blob store backends.
#[derive(Debug, Error)]
pub enum BlobError {
  /// The key is already taken. Backends run a no-overwrite policy, so a
  /// same-millisecond key collision surfaces here and is safely retryable.
  #[error("object already exists: {0}")]
  AlreadyExists(String),

  /// The backend could not be reached or the write/delete failed.
  #[error("blob backend error: {0}")]
  Backend(String),

  /// Signed-URL issuance failed. Callers fall back to the public URL.
  #[error("url signing failed: {0}")]
  Signing(String),
}

/// Outcome of [`BlobStore::remove`]. Deletion is idempotent; removing an
/// absent key is reported, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
  Removed,
  NotFound,
}

/// Abstraction over a blob storage backend.
///
/// No observable side effects beyond the object's existence or
/// non-existence.
pub trait BlobStore: Send + Sync {
  /// Write `bytes` under `key`. Fails with [`BlobError::AlreadyExists`] if
  /// the key is taken — objects are never overwritten.
  fn put(
    &self,
    key: &str,
    bytes: Bytes,
    content_type: &str,
  ) -> impl Future<Output = Result<(), BlobError>> + Send;

  /// A URL valid indefinitely while the object exists.
  fn public_url(&self, key: &str) -> String;

  /// A URL valid for `ttl_seconds`.
  fn signed_url(
    &self,
    key: &str,
    ttl_seconds: u64,
  ) -> impl Future<Output = Result<String, BlobError>> + Send;

  /// Idempotent delete; used only for compensation.
  fn remove(
    &self,
    key: &str,
  ) -> impl Future<Output = Result<Removal, BlobError>> + Send;
}
