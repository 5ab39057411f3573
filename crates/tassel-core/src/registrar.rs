//! The document registrar — store-then-record with compensation.
//!
//! Turns one normalised [`UploadRequest`] into one [`Artifact`], or fails
//! cleanly with no orphaned state. The sequence per request is strict:
//!
//! ```text
//! VALIDATING -> KEY_DERIVED -> STORED -> RECORDED
//! ```
//!
//! with failure exits `REJECTED` (no side effects), `STORE_FAILED` (nothing
//! written, retryable), and `RECORD_FAILED` (blob exists, row insert failed),
//! which triggers exactly one compensating delete. If that delete also fails
//! the blob is orphaned and the error carries the storage key so the
//! condition is operator-visible.
//!
//! The pair (storage object, artifact row) must either both exist or neither
//! exist. This is not enforced by two-phase commit; it is enforced by the
//! compensation step, which runs synchronously before the caller is answered.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::{
  artifact::{Artifact, NewArtifact, ReferenceRequest, UploadRequest, WireMode},
  blob::{BlobError, BlobStore},
  store::ArtifactStore,
  subject::{Subject, SubjectRef},
};

// ─── Limits ──────────────────────────────────────────────────────────────────

/// Default signed-URL lifetime: one year, for long-lived student-facing
/// documents.
pub const DEFAULT_SIGNED_URL_TTL: u64 = 31_536_000;

/// Per-mode payload ceilings, enforced at validation before any I/O.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
  /// Ceiling for raw-binary uploads.
  pub max_binary_bytes:    u64,
  /// Ceiling for legacy multipart form submissions.
  pub max_multipart_bytes: u64,
}

impl Default for UploadLimits {
  fn default() -> Self {
    Self {
      max_binary_bytes:    50 * 1024 * 1024,
      max_multipart_bytes: 10 * 1024 * 1024,
    }
  }
}

impl UploadLimits {
  fn ceiling(&self, mode: WireMode) -> u64 {
    match mode {
      WireMode::RawBinary => self.max_binary_bytes,
      WireMode::Multipart => self.max_multipart_bytes,
    }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Terminal failure states of one registration attempt.
#[derive(Debug, Error)]
pub enum RegisterError {
  /// Validation failed before any I/O. No side effects occurred.
  #[error("{0}")]
  Rejected(String),

  /// The blob write failed. Nothing was written anywhere; the caller may
  /// retry the whole upload with no cleanup required.
  #[error("blob store write failed: {0}")]
  StoreWrite(#[source] BlobError),

  /// The artifact insert failed after a successful store, and the
  /// compensating delete succeeded. No orphan remains; safely retryable.
  #[error("database write failed (blob rolled back): {source}")]
  DatabaseWrite {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// The artifact insert failed and the compensating delete also failed.
  /// The object under `storage_key` is orphaned and must be reconciled out
  /// of band. A blind retry would create a second orphan.
  #[error("database write failed and blob cleanup failed; orphaned object at {storage_key}")]
  OrphanedBlob {
    storage_key: String,
    insert:      Box<dyn std::error::Error + Send + Sync>,
    #[source]
    remove:      BlobError,
  },

  /// Subject resolution itself failed at the transport level (as opposed to
  /// the subject being absent, which is a rejection).
  #[error("subject lookup failed: {0}")]
  Lookup(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RegisterError {
  fn lookup<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Lookup(Box::new(e))
  }
}

// ─── Registrar ───────────────────────────────────────────────────────────────

/// Orchestrates validate → derive key → store → record → compensate.
///
/// Cloning is cheap; both backends are behind `Arc`. The registrar holds no
/// per-request state, so concurrent uploads never contend: keys are derived
/// from subject + kind + wall clock + filename, and backends refuse
/// overwrites, so a same-millisecond collision degrades to a retryable
/// [`RegisterError::StoreWrite`] rather than silent data loss.
pub struct Registrar<S, B> {
  store:          Arc<S>,
  blobs:          Arc<B>,
  limits:         UploadLimits,
  signed_url_ttl: u64,
}

impl<S, B> Clone for Registrar<S, B> {
  fn clone(&self) -> Self {
    Self {
      store:          Arc::clone(&self.store),
      blobs:          Arc::clone(&self.blobs),
      limits:         self.limits,
      signed_url_ttl: self.signed_url_ttl,
    }
  }
}

impl<S, B> Registrar<S, B>
where
  S: ArtifactStore,
  B: BlobStore,
{
  pub fn new(
    store: Arc<S>,
    blobs: Arc<B>,
    limits: UploadLimits,
    signed_url_ttl: u64,
  ) -> Self {
    Self { store, blobs, limits, signed_url_ttl }
  }

  /// Register one upload end to end.
  pub async fn register(
    &self,
    request: UploadRequest,
  ) -> Result<Artifact, RegisterError> {
    // VALIDATING — everything here happens before any I/O side effect.
    let subject = self.resolve_subject(&request.subject).await?;

    if request.payload.is_empty() {
      return Err(RegisterError::Rejected("missing file".to_string()));
    }

    let ceiling = self.limits.ceiling(request.mode);
    if request.payload.len() as u64 > ceiling {
      return Err(RegisterError::Rejected(format!(
        "file too large: {} bytes exceeds the {} byte limit",
        request.payload.len(),
        ceiling,
      )));
    }

    if !request.kind.allows(&request.content_type) {
      return Err(RegisterError::Rejected(format!(
        "content type {:?} is not allowed for {}",
        request.content_type, request.kind,
      )));
    }

    // KEY_DERIVED — deterministic from inputs plus wall clock; no counter,
    // no coordination.
    let file_name = sanitize_file_name(&request.file_name);
    let storage_key = derive_key(
      request.kind.discriminant(),
      &subject.reg_no,
      Utc::now().timestamp_millis(),
      &file_name,
    );

    // STORED
    self
      .blobs
      .put(&storage_key, request.payload.clone(), &request.content_type)
      .await
      .map_err(RegisterError::StoreWrite)?;

    let file_url = self.retrieval_url(&storage_key).await;

    // RECORDED, or RECORD_FAILED -> compensate.
    let new_artifact = NewArtifact {
      subject_id: subject.subject_id,
      kind: request.kind,
      storage_key: storage_key.clone(),
      file_url,
      file_name,
      file_size: request.payload.len() as u64,
      content_type: request.content_type,
    };

    match self.store.insert_artifact(new_artifact).await {
      Ok(artifact) => {
        tracing::info!(
          subject = %subject.reg_no,
          kind = %request.kind,
          key = %artifact.storage_key,
          size = artifact.file_size,
          "artifact registered"
        );
        Ok(artifact)
      }
      Err(insert_err) => self.compensate(storage_key, insert_err).await,
    }
  }

  /// Register a pointer to a file uploaded out-of-band. The store step is
  /// skipped entirely, so states collapse to `VALIDATING -> RECORDED` and no
  /// compensation is ever needed.
  pub async fn register_reference(
    &self,
    request: ReferenceRequest,
  ) -> Result<Artifact, RegisterError> {
    let subject = self.resolve_subject(&request.subject).await?;

    if request.file_url.is_empty() {
      return Err(RegisterError::Rejected("missing file url".to_string()));
    }

    let file_name = sanitize_file_name(&request.file_name);
    // External objects get a registry-local key so the uniqueness invariant
    // holds even when the same URL is registered twice.
    let storage_key = format!(
      "external/{}",
      derive_key(
        request.kind.discriminant(),
        &subject.reg_no,
        Utc::now().timestamp_millis(),
        &file_name,
      )
    );

    let new_artifact = NewArtifact {
      subject_id: subject.subject_id,
      kind: request.kind,
      storage_key,
      file_url: request.file_url,
      file_name,
      file_size: 0,
      content_type: "application/octet-stream".to_string(),
    };

    self
      .store
      .insert_artifact(new_artifact)
      .await
      .map_err(|e| RegisterError::DatabaseWrite { source: Box::new(e) })
  }

  // ── Internals ─────────────────────────────────────────────────────────

  async fn resolve_subject(
    &self,
    subject: &SubjectRef,
  ) -> Result<Subject, RegisterError> {
    let found = match subject {
      SubjectRef::Id(id) => {
        self.store.get_subject(*id).await.map_err(RegisterError::lookup)?
      }
      SubjectRef::RegNo(reg_no) => self
        .store
        .find_subject(reg_no)
        .await
        .map_err(RegisterError::lookup)?,
    };

    found.ok_or_else(|| {
      RegisterError::Rejected(format!("subject not found: {subject}"))
    })
  }

  /// Signed URL with the configured TTL, degrading to the public URL if
  /// signing fails. Degraded is non-fatal.
  async fn retrieval_url(&self, key: &str) -> String {
    match self.blobs.signed_url(key, self.signed_url_ttl).await {
      Ok(url) => url,
      Err(e) => {
        tracing::warn!(key, error = %e, "signed url unavailable, using public url");
        self.blobs.public_url(key)
      }
    }
  }

  /// Exactly one compensating delete after a failed insert. The client is
  /// never told "success" while cleanup is still pending.
  async fn compensate(
    &self,
    storage_key: String,
    insert_err: S::Error,
  ) -> Result<Artifact, RegisterError> {
    match self.blobs.remove(&storage_key).await {
      Ok(_) => {
        tracing::warn!(key = %storage_key, error = %insert_err, "insert failed, blob rolled back");
        Err(RegisterError::DatabaseWrite { source: Box::new(insert_err) })
      }
      Err(remove_err) => {
        tracing::error!(
          key = %storage_key,
          insert_error = %insert_err,
          remove_error = %remove_err,
          "insert failed and compensation failed; blob orphaned"
        );
        Err(RegisterError::OrphanedBlob {
          storage_key,
          insert: Box::new(insert_err),
          remove: remove_err,
        })
      }
    }
  }
}

// ─── Key derivation ──────────────────────────────────────────────────────────

/// `{kind}/{reg_no}_{unix_millis}_{file_name}`. The timestamp component
/// keeps keys unique for repeated uploads of the same filename down to
/// millisecond resolution.
fn derive_key(kind: &str, reg_no: &str, millis: i64, file_name: &str) -> String {
  format!("{kind}/{reg_no}_{millis}_{file_name}")
}

/// Reduce a client-supplied filename to a storage-safe token: only
/// `[A-Za-z0-9._-]` survives, everything else becomes `_`. Long names are
/// truncated; an empty result falls back to `file`.
pub fn sanitize_file_name(name: &str) -> String {
  const MAX_LEN: usize = 100;

  let cleaned: String = name
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
        c
      } else {
        '_'
      }
    })
    .take(MAX_LEN)
    .collect();

  let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
  if trimmed.is_empty() {
    "file".to_string()
  } else {
    trimmed.to_string()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
