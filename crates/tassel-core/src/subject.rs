//! Subject — the student entity that documents are attached to.
//!
//! A subject holds identity metadata only. Every document uploaded for a
//! subject lives in its own append-only artifact row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student, identified by a surrogate UUID and an immutable natural key
/// (the registration number). Deleting a subject cascade-deletes its
/// artifacts at the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id: Uuid,
  /// Registration number, e.g. `STU001`. Unique and immutable.
  pub reg_no:     String,
  pub full_name:  String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::ArtifactStore::add_subject`].
/// `subject_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubject {
  pub reg_no:    String,
  pub full_name: String,
}

/// How an inbound request names a subject: by surrogate id or by
/// registration number. Resolution happens during upload validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectRef {
  Id(Uuid),
  RegNo(String),
}

impl std::fmt::Display for SubjectRef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Id(id) => write!(f, "{id}"),
      Self::RegNo(r) => write!(f, "{r}"),
    }
  }
}
