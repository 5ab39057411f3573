//! The `ArtifactStore` trait — the relational side of the registry.
//!
//! The trait is implemented by storage backends (e.g. `tassel-store-sqlite`).
//! Higher layers (`tassel-http`, the registrar) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  artifact::{Artifact, ArtifactKind, NewArtifact},
  credential::{Credential, Operator},
  subject::{NewSubject, Subject},
};

/// Abstraction over the relational store backend.
///
/// Artifact writes are append-only: `insert_artifact` is the only mutation,
/// no update or delete is ever issued against artifact rows. Subject
/// deletion cascade-deletes dependent artifacts at the schema level.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ArtifactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// Create and persist a new subject. Fails if the registration number is
  /// already taken.
  fn add_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send;

  /// Retrieve a subject by UUID. Returns `None` if not found.
  fn get_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send;

  /// Retrieve a subject by registration number. Returns `None` if not found.
  fn find_subject(
    &self,
    reg_no: &str,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send;

  /// List all subjects, oldest first.
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send;

  /// Delete a subject and, by cascade, all of its artifacts. Returns `false`
  /// if no such subject existed.
  fn remove_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

  // ── Artifacts — append-only writes ────────────────────────────────────

  /// Insert a new artifact row and return the persisted [`Artifact`].
  /// `artifact_id` and `created_at` are set by the store.
  fn insert_artifact(
    &self,
    input: NewArtifact,
  ) -> impl Future<Output = Result<Artifact, Self::Error>> + Send;

  // ── Artifact reads ────────────────────────────────────────────────────

  /// The current artifact of `kind` for a subject: greatest `created_at`,
  /// limit 1. Returns `None` if the subject has none of that kind.
  fn latest_by_kind(
    &self,
    subject_id: Uuid,
    kind: ArtifactKind,
  ) -> impl Future<Output = Result<Option<Artifact>, Self::Error>> + Send;

  /// All artifacts for a subject, newest first.
  fn all_for_subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Artifact>, Self::Error>> + Send;

  // ── Operators ─────────────────────────────────────────────────────────

  /// Look up an operator account by username.
  fn get_operator(
    &self,
    username: &str,
  ) -> impl Future<Output = Result<Option<Operator>, Self::Error>> + Send;

  /// Create an operator account, or leave an existing one untouched.
  fn put_operator(
    &self,
    operator: Operator,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// Replace an operator's credential. Used to migrate
  /// [`Credential::Legacy`] rows to [`Credential::Hashed`] on first login.
  fn update_credential(
    &self,
    username: &str,
    credential: Credential,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
