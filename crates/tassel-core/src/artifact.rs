//! Artifact types — the fundamental unit of the Tassel document registry.
//!
//! An artifact is one uploaded document instance: a pointer into the blob
//! store plus its metadata. Artifact rows are never updated in place; a new
//! upload for the same (subject, kind) pair creates a new row, and "current"
//! is resolved at read time by descending creation timestamp.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, subject::SubjectRef};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// The fixed set of document types the portal accepts. The variant name
/// serves as the `kind` discriminant stored in the database and as the first
/// path segment of a storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
  ExamCard,
  FeeStatement,
  FeeReceipt,
  ResultsFile,
  TimetableFile,
  Photo,
}

impl ArtifactKind {
  /// The discriminant string stored in the `kind` column and used in URLs.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::ExamCard => "exam-card",
      Self::FeeStatement => "fee-statement",
      Self::FeeReceipt => "fee-receipt",
      Self::ResultsFile => "results-file",
      Self::TimetableFile => "timetable-file",
      Self::Photo => "photo",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "exam-card" => Ok(Self::ExamCard),
      "fee-statement" => Ok(Self::FeeStatement),
      "fee-receipt" => Ok(Self::FeeReceipt),
      "results-file" => Ok(Self::ResultsFile),
      "timetable-file" => Ok(Self::TimetableFile),
      "photo" => Ok(Self::Photo),
      other => Err(Error::UnknownKind(other.to_string())),
    }
  }

  /// Whether `content_type` is acceptable for this kind of document.
  ///
  /// Photos accept images only; every other kind also accepts PDF and the
  /// two Word formats.
  pub fn allows(&self, content_type: &str) -> bool {
    const IMAGES: &[&str] =
      &["image/jpeg", "image/png", "image/webp", "image/gif"];
    const DOCUMENTS: &[&str] = &[
      "application/pdf",
      "application/msword",
      "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
      "application/octet-stream",
    ];

    let ct = content_type
      .split(';')
      .next()
      .unwrap_or(content_type)
      .trim();

    match self {
      Self::Photo => IMAGES.contains(&ct),
      _ => IMAGES.contains(&ct) || DOCUMENTS.contains(&ct),
    }
  }

  pub const ALL: [ArtifactKind; 6] = [
    Self::ExamCard,
    Self::FeeStatement,
    Self::FeeReceipt,
    Self::ResultsFile,
    Self::TimetableFile,
    Self::Photo,
  ];
}

impl std::fmt::Display for ArtifactKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.discriminant())
  }
}

// ─── Artifact ────────────────────────────────────────────────────────────────

/// One persisted document record. Once written, no field is ever updated;
/// a newer upload of the same kind supersedes it by timestamp only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
  pub artifact_id:  Uuid,
  pub subject_id:   Uuid,
  pub kind:         ArtifactKind,
  /// Opaque path in the blob store. Unique and immutable.
  pub storage_key:  String,
  /// Public or time-limited signed retrieval URL.
  pub file_url:     String,
  pub file_name:    String,
  pub file_size:    u64,
  pub content_type: String,
  /// Server-assigned; "current" artifact for a (subject, kind) pair is the
  /// one with the greatest value.
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::ArtifactStore::insert_artifact`].
/// `artifact_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewArtifact {
  pub subject_id:   Uuid,
  pub kind:         ArtifactKind,
  pub storage_key:  String,
  pub file_url:     String,
  pub file_name:    String,
  pub file_size:    u64,
  pub content_type: String,
}

// ─── Upload request ──────────────────────────────────────────────────────────

/// Which wire shape carried the payload. Only relevant for picking the size
/// ceiling; both modes normalise to the same [`UploadRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireMode {
  /// Request body was the raw file; metadata came from headers or query.
  RawBinary,
  /// Legacy `multipart/form-data` submission.
  Multipart,
}

/// A transient, single-use upload: consumed by the registrar to produce
/// exactly zero or one [`Artifact`]. Never persisted as such.
#[derive(Debug, Clone)]
pub struct UploadRequest {
  pub subject:      SubjectRef,
  pub kind:         ArtifactKind,
  pub payload:      Bytes,
  pub content_type: String,
  pub file_name:    String,
  pub mode:         WireMode,
}

/// Reference-mode input: the file was already uploaded out-of-band, so only
/// the record step runs. No blob store call is ever made for these.
#[derive(Debug, Clone)]
pub struct ReferenceRequest {
  pub subject:   SubjectRef,
  pub kind:      ArtifactKind,
  pub file_url:  String,
  pub file_name: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_discriminants_roundtrip() {
    for kind in ArtifactKind::ALL {
      assert_eq!(ArtifactKind::parse(kind.discriminant()).unwrap(), kind);
    }
  }

  #[test]
  fn unknown_kind_is_an_error() {
    assert!(matches!(
      ArtifactKind::parse("transcript"),
      Err(Error::UnknownKind(_))
    ));
  }

  #[test]
  fn photo_rejects_pdf() {
    assert!(ArtifactKind::Photo.allows("image/png"));
    assert!(!ArtifactKind::Photo.allows("application/pdf"));
  }

  #[test]
  fn documents_accept_pdf_word_and_images() {
    assert!(ArtifactKind::ExamCard.allows("application/pdf"));
    assert!(ArtifactKind::FeeStatement.allows("application/msword"));
    assert!(ArtifactKind::ResultsFile.allows("image/jpeg"));
    assert!(!ArtifactKind::ExamCard.allows("text/html"));
  }

  #[test]
  fn content_type_parameters_are_ignored() {
    assert!(ArtifactKind::Photo.allows("image/png; charset=binary"));
  }
}
