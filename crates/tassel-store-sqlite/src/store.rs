//! [`SqliteStore`] — the SQLite implementation of [`ArtifactStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tassel_core::{
  artifact::{Artifact, ArtifactKind, NewArtifact},
  credential::{Credential, Operator},
  store::ArtifactStore,
  subject::{NewSubject, Subject},
};

use crate::{
  Error, Result,
  encode::{
    RawArtifact, RawOperator, RawSubject, encode_credential, encode_dt,
    encode_kind, encode_uuid,
  },
  schema::SCHEMA,
};

const ARTIFACT_COLS: &str = "artifact_id, subject_id, kind, storage_key, \
                             file_url, file_name, file_size, content_type, \
                             created_at";

fn raw_artifact(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawArtifact> {
  Ok(RawArtifact {
    artifact_id:  row.get(0)?,
    subject_id:   row.get(1)?,
    kind:         row.get(2)?,
    storage_key:  row.get(3)?,
    file_url:     row.get(4)?,
    file_name:    row.get(5)?,
    file_size:    row.get(6)?,
    content_type: row.get(7)?,
    created_at:   row.get(8)?,
  })
}

fn raw_subject(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSubject> {
  Ok(RawSubject {
    subject_id: row.get(0)?,
    reg_no:     row.get(1)?,
    full_name:  row.get(2)?,
    created_at: row.get(3)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tassel registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ArtifactStore impl ──────────────────────────────────────────────────────

impl ArtifactStore for SqliteStore {
  type Error = Error;

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn add_subject(&self, input: NewSubject) -> Result<Subject> {
    if self.find_subject(&input.reg_no).await?.is_some() {
      return Err(Error::DuplicateRegNo(input.reg_no));
    }

    let subject = Subject {
      subject_id: Uuid::new_v4(),
      reg_no:     input.reg_no,
      full_name:  input.full_name,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(subject.subject_id);
    let reg_no   = subject.reg_no.clone();
    let name     = subject.full_name.clone();
    let at_str   = encode_dt(subject.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, reg_no, full_name, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, reg_no, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(subject)
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT subject_id, reg_no, full_name, created_at
             FROM subjects WHERE subject_id = ?1",
            rusqlite::params![id_str],
            raw_subject,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn find_subject(&self, reg_no: &str) -> Result<Option<Subject>> {
    let reg_no = reg_no.to_owned();

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT subject_id, reg_no, full_name, created_at
             FROM subjects WHERE reg_no = ?1",
            rusqlite::params![reg_no],
            raw_subject,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let raws: Vec<RawSubject> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT subject_id, reg_no, full_name, created_at
           FROM subjects ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map([], raw_subject)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn remove_subject(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        // Artifact rows go with the subject via ON DELETE CASCADE.
        let n = conn.execute(
          "DELETE FROM subjects WHERE subject_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n)
      })
      .await?;

    Ok(affected > 0)
  }

  // ── Artifacts — append-only writes ────────────────────────────────────────

  async fn insert_artifact(&self, input: NewArtifact) -> Result<Artifact> {
    let artifact = Artifact {
      artifact_id:  Uuid::new_v4(),
      subject_id:   input.subject_id,
      kind:         input.kind,
      storage_key:  input.storage_key,
      file_url:     input.file_url,
      file_name:    input.file_name,
      file_size:    input.file_size,
      content_type: input.content_type,
      created_at:   Utc::now(),
    };

    let id_str      = encode_uuid(artifact.artifact_id);
    let subject_str = encode_uuid(artifact.subject_id);
    let kind_str    = encode_kind(artifact.kind).to_owned();
    let key         = artifact.storage_key.clone();
    let url         = artifact.file_url.clone();
    let name        = artifact.file_name.clone();
    let size        = artifact.file_size as i64;
    let ct          = artifact.content_type.clone();
    let at_str      = encode_dt(artifact.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO artifacts (
             artifact_id, subject_id, kind, storage_key,
             file_url, file_name, file_size, content_type, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str, subject_str, kind_str, key, url, name, size, ct, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(artifact)
  }

  // ── Artifact reads ────────────────────────────────────────────────────────

  async fn latest_by_kind(
    &self,
    subject_id: Uuid,
    kind: ArtifactKind,
  ) -> Result<Option<Artifact>> {
    let subject_str = encode_uuid(subject_id);
    let kind_str    = encode_kind(kind).to_owned();

    let raw: Option<RawArtifact> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {ARTIFACT_COLS} FROM artifacts
               WHERE subject_id = ?1 AND kind = ?2
               ORDER BY created_at DESC, artifact_id DESC
               LIMIT 1"
            ),
            rusqlite::params![subject_str, kind_str],
            raw_artifact,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawArtifact::into_artifact).transpose()
  }

  async fn all_for_subject(&self, subject_id: Uuid) -> Result<Vec<Artifact>> {
    let subject_str = encode_uuid(subject_id);

    let raws: Vec<RawArtifact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ARTIFACT_COLS} FROM artifacts
           WHERE subject_id = ?1
           ORDER BY created_at DESC, artifact_id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![subject_str], raw_artifact)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawArtifact::into_artifact).collect()
  }

  // ── Operators ─────────────────────────────────────────────────────────────

  async fn get_operator(&self, username: &str) -> Result<Option<Operator>> {
    let username = username.to_owned();

    let raw: Option<RawOperator> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT username, credential FROM operators WHERE username = ?1",
            rusqlite::params![username],
            |row| {
              Ok(RawOperator {
                username:   row.get(0)?,
                credential: row.get(1)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawOperator::into_operator).transpose()
  }

  async fn put_operator(&self, operator: Operator) -> Result<()> {
    let username       = operator.username;
    let credential_str = encode_credential(&operator.credential)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO operators (username, credential) VALUES (?1, ?2)",
          rusqlite::params![username, credential_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_credential(
    &self,
    username: &str,
    credential: Credential,
  ) -> Result<()> {
    let username       = username.to_owned();
    let credential_str = encode_credential(&credential)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE operators SET credential = ?2 WHERE username = ?1",
          rusqlite::params![username, credential_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
