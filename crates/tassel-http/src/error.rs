//! HTTP error type and axum `IntoResponse` implementation.
//!
//! Every failure is answered with the envelope
//! `{ "error": <machine-readable kind>, "details": <human-readable cause> }`.
//! Orphaned-blob failures additionally carry the storage key so the
//! condition is operator-visible and reconcilable out of band.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use tassel_core::registrar::RegisterError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  /// Request rejected before any I/O. Never retried automatically.
  #[error("validation failed: {0}")]
  Validation(String),

  /// Malformed multipart or unreadable body.
  #[error("transport error: {0}")]
  Transport(String),

  /// Blob upload failed; nothing was written, safely retryable.
  #[error("store write failed: {0}")]
  StoreWrite(String),

  /// Insert failed after a successful store and the blob was rolled back;
  /// safely retryable.
  #[error("database write failed: {0}")]
  DatabaseWrite(String),

  /// Insert and compensation both failed. Not safely retried blindly.
  #[error("orphaned blob at {storage_key}: {details}")]
  OrphanedBlob { storage_key: String, details: String },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }

  fn kind(&self) -> &'static str {
    match self {
      Self::Unauthorized => "unauthorized",
      Self::NotFound(_) => "not_found",
      Self::Validation(_) => "validation",
      Self::Transport(_) => "transport",
      Self::StoreWrite(_) => "store_write",
      Self::DatabaseWrite(_) => "database_write",
      Self::OrphanedBlob { .. } => "orphaned_blob",
      Self::Store(_) => "internal",
    }
  }

  fn status(&self) -> StatusCode {
    match self {
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Validation(_) | Self::Transport(_) => StatusCode::BAD_REQUEST,
      Self::StoreWrite(_)
      | Self::DatabaseWrite(_)
      | Self::OrphanedBlob { .. }
      | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<RegisterError> for Error {
  fn from(e: RegisterError) -> Self {
    match e {
      RegisterError::Rejected(m) => Self::Validation(m),
      RegisterError::StoreWrite(e) => Self::StoreWrite(e.to_string()),
      RegisterError::DatabaseWrite { source } => {
        Self::DatabaseWrite(source.to_string())
      }
      RegisterError::OrphanedBlob { storage_key, insert, remove } => {
        Self::OrphanedBlob {
          storage_key,
          details: format!("insert failed: {insert}; cleanup failed: {remove}"),
        }
      }
      RegisterError::Lookup(source) => Self::Store(source),
    }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      Error::OrphanedBlob { storage_key, details } => json!({
        "error": self.kind(),
        "details": details,
        "storageKey": storage_key,
      }),
      other => json!({
        "error": other.kind(),
        "details": other.to_string(),
      }),
    };

    let mut res = (status, Json(body)).into_response();
    if matches!(self, Error::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"tassel\""),
      );
    }
    res
  }
}
