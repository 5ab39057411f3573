//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with fixed microsecond
//! precision so that lexicographic order matches chronological order.
//! Credentials are stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use tassel_core::{
  artifact::{Artifact, ArtifactKind},
  credential::{Credential, Operator},
  subject::Subject,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ArtifactKind ────────────────────────────────────────────────────────────

pub fn encode_kind(k: ArtifactKind) -> &'static str { k.discriminant() }

pub fn decode_kind(s: &str) -> Result<ArtifactKind> {
  Ok(ArtifactKind::parse(s)?)
}

// ─── Credential ──────────────────────────────────────────────────────────────

pub fn encode_credential(c: &Credential) -> Result<String> {
  Ok(serde_json::to_string(c)?)
}

pub fn decode_credential(s: &str) -> Result<Credential> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `subjects` row.
pub struct RawSubject {
  pub subject_id: String,
  pub reg_no:     String,
  pub full_name:  String,
  pub created_at: String,
}

impl RawSubject {
  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id: decode_uuid(&self.subject_id)?,
      reg_no:     self.reg_no,
      full_name:  self.full_name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `artifacts` row.
pub struct RawArtifact {
  pub artifact_id:  String,
  pub subject_id:   String,
  pub kind:         String,
  pub storage_key:  String,
  pub file_url:     String,
  pub file_name:    String,
  pub file_size:    i64,
  pub content_type: String,
  pub created_at:   String,
}

impl RawArtifact {
  pub fn into_artifact(self) -> Result<Artifact> {
    Ok(Artifact {
      artifact_id:  decode_uuid(&self.artifact_id)?,
      subject_id:   decode_uuid(&self.subject_id)?,
      kind:         decode_kind(&self.kind)?,
      storage_key:  self.storage_key,
      file_url:     self.file_url,
      file_name:    self.file_name,
      file_size:    self.file_size as u64,
      content_type: self.content_type,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `operators` row.
pub struct RawOperator {
  pub username:   String,
  pub credential: String,
}

impl RawOperator {
  pub fn into_operator(self) -> Result<Operator> {
    Ok(Operator {
      username:   self.username,
      credential: decode_credential(&self.credential)?,
    })
  }
}
