//! HTTP layer for the Tassel document registry.
//!
//! Exposes an axum [`Router`] over any [`ArtifactStore`] + [`BlobStore`]
//! pair. Mutating endpoints require HTTP Basic auth against the operators
//! table; reads are open to the portal frontend.

pub mod artifacts;
pub mod auth;
pub mod error;
pub mod negotiate;
pub mod subjects;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use tassel_core::{
  blob::BlobStore,
  registrar::{DEFAULT_SIGNED_URL_TTL, Registrar},
  store::ArtifactStore,
};

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_max_binary() -> u64 { 50 * 1024 * 1024 }
fn default_max_multipart() -> u64 { 10 * 1024 * 1024 }
fn default_signed_url_ttl() -> u64 { DEFAULT_SIGNED_URL_TTL }

/// Runtime server configuration, deserialised from `config.toml` with
/// `TASSEL_*` environment overrides.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub store_path:    PathBuf,
  /// Directory the filesystem blob store writes under.
  pub blob_root:     PathBuf,
  /// Base URL blobs are publicly served from.
  pub blob_base_url: String,
  /// Secret for signing time-limited retrieval URLs.
  pub signing_secret: String,

  pub auth_username: String,
  /// Argon2 PHC string. Preferred over `auth_password`.
  #[serde(default)]
  pub auth_password_hash: Option<String>,
  /// Plaintext fallback, seeded as a legacy credential and migrated to a
  /// hash on first successful login.
  #[serde(default)]
  pub auth_password: Option<String>,

  #[serde(default = "default_max_binary")]
  pub max_binary_bytes:    u64,
  #[serde(default = "default_max_multipart")]
  pub max_multipart_bytes: u64,
  #[serde(default = "default_signed_url_ttl")]
  pub signed_url_ttl:      u64,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, B> {
  pub store:     Arc<S>,
  pub registrar: Registrar<S, B>,
  /// Transport-level body cap, slightly above the strictest upload ceiling
  /// so over-limit payloads are rejected by validation with a proper
  /// envelope rather than cut off mid-stream.
  pub body_limit: usize,
}

impl<S, B> Clone for AppState<S, B> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      registrar:  self.registrar.clone(),
      body_limit: self.body_limit,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full API router for a store/blob-store pair.
pub fn router<S, B>(state: AppState<S, B>) -> Router
where
  S: ArtifactStore + 'static,
  B: BlobStore + 'static,
{
  let body_limit = state.body_limit;
  Router::new()
    // Subjects
    .route(
      "/api/subjects",
      get(subjects::list::<S, B>).post(subjects::create::<S, B>),
    )
    .route(
      "/api/subjects/{id}",
      get(subjects::get_one::<S, B>).delete(subjects::delete::<S, B>),
    )
    // Artifacts
    .route("/api/artifacts/{kind}", post(artifacts::upload::<S, B>))
    .route("/api/subjects/{id}/{kind}", get(artifacts::latest::<S, B>))
    .route("/api/documents/{reg_no}", get(artifacts::documents::<S, B>))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use serde_json::{Value, json};
  use std::sync::atomic::{AtomicBool, Ordering};
  use tassel_blob::MemoryBlobStore;
  use tassel_core::{
    artifact::{Artifact, ArtifactKind, NewArtifact},
    credential::{Credential, Operator},
    registrar::UploadLimits,
    subject::{NewSubject, Subject},
  };
  use tassel_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;
  use uuid::Uuid;

  struct Rig {
    state: AppState<SqliteStore, MemoryBlobStore>,
    blobs: Arc<MemoryBlobStore>,
  }

  async fn rig_with_credential(credential: Credential) -> Rig {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let blobs = Arc::new(MemoryBlobStore::default());

    store
      .put_operator(Operator { username: "registrar".to_string(), credential })
      .await
      .unwrap();

    let registrar = Registrar::new(
      Arc::clone(&store),
      Arc::clone(&blobs),
      UploadLimits::default(),
      DEFAULT_SIGNED_URL_TTL,
    );

    let state = AppState {
      store,
      registrar,
      body_limit: 50 * 1024 * 1024 + 64 * 1024,
    };
    Rig { state, blobs }
  }

  async fn rig() -> Rig {
    let hash = auth::hash_password("secret").unwrap();
    rig_with_credential(Credential::Hashed(hash)).await
  }

  fn auth_header() -> String {
    format!("Basic {}", B64.encode("registrar:secret"))
  }

  async fn send(
    rig: &Rig,
    method: &str,
    uri: &str,
    headers: Vec<(&str, String)>,
    body: Body,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(body).unwrap();
    let resp = router(rig.state.clone()).oneshot(req).await.unwrap();

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn enroll(rig: &Rig, reg_no: &str) -> Value {
    let (status, body) = send(
      rig,
      "POST",
      "/api/subjects",
      vec![
        ("authorization", auth_header()),
        ("content-type", "application/json".to_string()),
      ],
      Body::from(
        json!({ "reg_no": reg_no, "full_name": "Ada Wanjiru" }).to_string(),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
  }

  async fn upload_pdf(rig: &Rig, reg_no: &str, filename: &str) -> (StatusCode, Value) {
    send(
      rig,
      "POST",
      "/api/artifacts/exam-card",
      vec![
        ("authorization", auth_header()),
        ("content-type", "application/pdf".to_string()),
        ("x-subject", reg_no.to_string()),
        ("x-filename", filename.to_string()),
      ],
      Body::from(vec![0u8; 2048]),
    )
    .await
  }

  // ── Auth ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unauthenticated_upload_returns_401() {
    let r = rig().await;
    let (status, body) = send(
      &r,
      "POST",
      "/api/artifacts/exam-card",
      vec![("content-type", "application/pdf".to_string())],
      Body::from("x"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
  }

  #[tokio::test]
  async fn wrong_password_returns_401() {
    let r = rig().await;
    let bad = format!("Basic {}", B64.encode("registrar:wrong"));
    let (status, _) = send(
      &r,
      "POST",
      "/api/subjects",
      vec![
        ("authorization", bad),
        ("content-type", "application/json".to_string()),
      ],
      Body::from(json!({ "reg_no": "STU001", "full_name": "X" }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn legacy_credential_authenticates_and_is_migrated() {
    let r =
      rig_with_credential(Credential::Legacy("secret".to_string())).await;
    enroll(&r, "STU001").await;

    // The stored credential is now argon2-hashed.
    let op = r.state.store.get_operator("registrar").await.unwrap().unwrap();
    assert!(!op.credential.is_legacy());

    // The same password keeps working against the migrated hash.
    let (status, _) = upload_pdf(&r, "STU001", "card.pdf").await;
    assert_eq!(status, StatusCode::CREATED);
  }

  // ── Upload: raw binary ───────────────────────────────────────────────────

  #[tokio::test]
  async fn raw_binary_upload_returns_envelope() {
    let r = rig().await;
    enroll(&r, "STU001").await;

    let (status, body) = upload_pdf(&r, "STU001", "card.pdf").await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    assert_eq!(body["message"], "exam-card registered");
    let data = &body["data"];
    assert_eq!(data["subjectNaturalKey"], "STU001");
    assert_eq!(data["artifactType"], "exam-card");
    assert_eq!(data["fileName"], "card.pdf");
    assert_eq!(data["fileSize"], 2048);
    assert!(data["fileUrl"].as_str().unwrap().contains("card.pdf"));
    assert!(data["uploadedAt"].is_string());

    // Exactly one blob landed in the store.
    assert_eq!(r.blobs.len(), 1);
  }

  #[tokio::test]
  async fn upload_for_unknown_subject_returns_400() {
    let r = rig().await;
    let (status, body) = upload_pdf(&r, "GHOST", "card.pdf").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
    assert!(r.blobs.is_empty());
  }

  #[tokio::test]
  async fn upload_without_content_type_returns_400() {
    let r = rig().await;
    enroll(&r, "STU001").await;
    let (status, body) = send(
      &r,
      "POST",
      "/api/artifacts/exam-card",
      vec![
        ("authorization", auth_header()),
        ("x-subject", "STU001".to_string()),
        ("x-filename", "card.pdf".to_string()),
      ],
      Body::from(vec![0u8; 16]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
  }

  #[tokio::test]
  async fn unknown_kind_returns_400() {
    let r = rig().await;
    let (status, body) = send(
      &r,
      "POST",
      "/api/artifacts/transcript",
      vec![
        ("authorization", auth_header()),
        ("content-type", "application/pdf".to_string()),
      ],
      Body::from("x"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
  }

  #[tokio::test]
  async fn photo_rejects_pdf_body() {
    let r = rig().await;
    enroll(&r, "STU001").await;
    let (status, body) = send(
      &r,
      "POST",
      "/api/artifacts/photo",
      vec![
        ("authorization", auth_header()),
        ("content-type", "application/pdf".to_string()),
        ("x-subject", "STU001".to_string()),
        ("x-filename", "photo.pdf".to_string()),
      ],
      Body::from(vec![0u8; 16]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert!(r.blobs.is_empty());
  }

  // ── Upload: legacy multipart ─────────────────────────────────────────────

  #[tokio::test]
  async fn multipart_upload_is_equivalent_to_raw_binary() {
    let r = rig().await;
    enroll(&r, "STU001").await;

    let boundary = "XTASSELBOUNDARY";
    let body = format!(
      "--{boundary}\r\n\
       Content-Disposition: form-data; name=\"subject\"\r\n\r\n\
       STU001\r\n\
       --{boundary}\r\n\
       Content-Disposition: form-data; name=\"file\"; filename=\"card.pdf\"\r\n\
       Content-Type: application/pdf\r\n\r\n\
       %PDF-1.4 fake\r\n\
       --{boundary}--\r\n"
    );
    let (status, resp) = send(
      &r,
      "POST",
      "/api/artifacts/exam-card",
      vec![
        ("authorization", auth_header()),
        (
          "content-type",
          format!("multipart/form-data; boundary={boundary}"),
        ),
      ],
      Body::from(body),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{resp}");
    assert_eq!(resp["data"]["subjectNaturalKey"], "STU001");
    assert_eq!(resp["data"]["fileName"], "card.pdf");
    assert_eq!(r.blobs.len(), 1);

    // Both shapes land in the same latest-by-kind view.
    let (status, latest) =
      send(&r, "GET", "/api/subjects/STU001/exam-card", vec![], Body::empty())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["fileName"], "card.pdf");
  }

  // ── Upload: reference mode ───────────────────────────────────────────────

  #[tokio::test]
  async fn json_reference_registers_without_touching_blobs() {
    let r = rig().await;
    enroll(&r, "STU001").await;

    let (status, body) = send(
      &r,
      "POST",
      "/api/artifacts/fee-statement",
      vec![
        ("authorization", auth_header()),
        ("content-type", "application/json".to_string()),
      ],
      Body::from(
        json!({
          "subject": "STU001",
          "file_url": "https://bucket.example.com/out-of-band.pdf",
        })
        .to_string(),
      ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(
      body["data"]["fileUrl"],
      "https://bucket.example.com/out-of-band.pdf"
    );
    assert!(r.blobs.is_empty());
  }

  // ── Reads ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn latest_returns_404_before_any_upload() {
    let r = rig().await;
    enroll(&r, "STU001").await;

    let (status, body) =
      send(&r, "GET", "/api/subjects/STU001/exam-card", vec![], Body::empty())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
  }

  #[tokio::test]
  async fn later_upload_supersedes_earlier_one() {
    let r = rig().await;
    enroll(&r, "STU001").await;

    upload_pdf(&r, "STU001", "first.pdf").await;
    upload_pdf(&r, "STU001", "second.pdf").await;

    let (status, latest) =
      send(&r, "GET", "/api/subjects/STU001/exam-card", vec![], Body::empty())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(latest["fileName"], "second.pdf");

    // Full history is retained, newest first.
    let (status, docs) =
      send(&r, "GET", "/api/documents/STU001", vec![], Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = docs
      .as_array()
      .unwrap()
      .iter()
      .map(|d| d["fileName"].as_str().unwrap())
      .collect();
    assert_eq!(names, ["second.pdf", "first.pdf"]);
  }

  #[tokio::test]
  async fn documents_for_unknown_subject_returns_404() {
    let r = rig().await;
    let (status, _) =
      send(&r, "GET", "/api/documents/GHOST", vec![], Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Failure propagation ──────────────────────────────────────────────────

  // SqliteStore wrapper with injectable write failures, for driving the
  // failure envelopes end to end over HTTP.

  #[derive(Debug, thiserror::Error)]
  enum FlakyError {
    #[error("injected insert failure")]
    Injected,
    #[error(transparent)]
    Store(#[from] tassel_store_sqlite::Error),
  }

  struct FlakyStore {
    inner:        SqliteStore,
    fail_inserts: AtomicBool,
    /// Makes the next `add_subject` behave as if another enroll with the
    /// same registration number landed first.
    race_enroll:  AtomicBool,
  }

  impl FlakyStore {
    async fn new() -> Self {
      Self {
        inner:        SqliteStore::open_in_memory().await.unwrap(),
        fail_inserts: AtomicBool::new(false),
        race_enroll:  AtomicBool::new(false),
      }
    }
  }

  impl ArtifactStore for FlakyStore {
    type Error = FlakyError;

    async fn add_subject(&self, input: NewSubject) -> Result<Subject, FlakyError> {
      if self.race_enroll.swap(false, Ordering::SeqCst) {
        self.inner.add_subject(input.clone()).await?;
      }
      Ok(self.inner.add_subject(input).await?)
    }

    async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>, FlakyError> {
      Ok(self.inner.get_subject(id).await?)
    }

    async fn find_subject(&self, reg_no: &str) -> Result<Option<Subject>, FlakyError> {
      Ok(self.inner.find_subject(reg_no).await?)
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, FlakyError> {
      Ok(self.inner.list_subjects().await?)
    }

    async fn remove_subject(&self, id: Uuid) -> Result<bool, FlakyError> {
      Ok(self.inner.remove_subject(id).await?)
    }

    async fn insert_artifact(&self, input: NewArtifact) -> Result<Artifact, FlakyError> {
      if self.fail_inserts.load(Ordering::SeqCst) {
        return Err(FlakyError::Injected);
      }
      Ok(self.inner.insert_artifact(input).await?)
    }

    async fn latest_by_kind(
      &self,
      subject_id: Uuid,
      kind: ArtifactKind,
    ) -> Result<Option<Artifact>, FlakyError> {
      Ok(self.inner.latest_by_kind(subject_id, kind).await?)
    }

    async fn all_for_subject(&self, subject_id: Uuid) -> Result<Vec<Artifact>, FlakyError> {
      Ok(self.inner.all_for_subject(subject_id).await?)
    }

    async fn get_operator(&self, username: &str) -> Result<Option<Operator>, FlakyError> {
      Ok(self.inner.get_operator(username).await?)
    }

    async fn put_operator(&self, operator: Operator) -> Result<(), FlakyError> {
      Ok(self.inner.put_operator(operator).await?)
    }

    async fn update_credential(
      &self,
      username: &str,
      credential: Credential,
    ) -> Result<(), FlakyError> {
      Ok(self.inner.update_credential(username, credential).await?)
    }
  }

  async fn flaky_rig() -> (AppState<FlakyStore, MemoryBlobStore>, Arc<FlakyStore>, Arc<MemoryBlobStore>) {
    let store = Arc::new(FlakyStore::new().await);
    let blobs = Arc::new(MemoryBlobStore::default());

    let hash = auth::hash_password("secret").unwrap();
    store
      .put_operator(Operator {
        username:   "registrar".to_string(),
        credential: Credential::Hashed(hash),
      })
      .await
      .unwrap();

    let registrar = Registrar::new(
      Arc::clone(&store),
      Arc::clone(&blobs),
      UploadLimits::default(),
      DEFAULT_SIGNED_URL_TTL,
    );
    let state = AppState {
      store:      Arc::clone(&store),
      registrar,
      body_limit: 1024 * 1024,
    };
    (state, store, blobs)
  }

  #[tokio::test]
  async fn orphaned_blob_reports_the_storage_key_to_the_client() {
    let (state, store, blobs) = flaky_rig().await;
    store
      .add_subject(NewSubject {
        reg_no:    "STU001".to_string(),
        full_name: "Ada Wanjiru".to_string(),
      })
      .await
      .unwrap();

    // Insert fails and the compensating delete fails too.
    store.fail_inserts.store(true, Ordering::SeqCst);
    blobs.fail_removes.store(true, Ordering::SeqCst);

    let req = Request::builder()
      .method("POST")
      .uri("/api/artifacts/exam-card")
      .header("authorization", auth_header())
      .header("content-type", "application/pdf")
      .header("x-subject", "STU001")
      .header("x-filename", "card.pdf")
      .body(Body::from(vec![0u8; 2048]))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "orphaned_blob");

    // The envelope names exactly the key the orphan sits under.
    let key = body["storageKey"].as_str().unwrap();
    assert!(blobs.contains(key), "orphan should remain under {key}");
    assert_eq!(blobs.keys(), vec![key.to_string()]);
  }

  #[tokio::test]
  async fn enroll_race_loser_gets_a_validation_error() {
    let (state, store, _blobs) = flaky_rig().await;
    // Another enroll with the same registration number lands between the
    // handler's pre-check and its insert.
    store.race_enroll.store(true, Ordering::SeqCst);

    let req = Request::builder()
      .method("POST")
      .uri("/api/subjects")
      .header("authorization", auth_header())
      .header("content-type", "application/json")
      .body(Body::from(
        json!({ "reg_no": "STU001", "full_name": "Ada Wanjiru" }).to_string(),
      ))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "validation");
    assert!(
      body["details"].as_str().unwrap().contains("already enrolled"),
      "{body}"
    );
  }

  #[tokio::test]
  async fn blob_store_failure_returns_500_and_is_retryable() {
    let r = rig().await;
    enroll(&r, "STU001").await;

    r.blobs
      .fail_puts
      .store(true, std::sync::atomic::Ordering::SeqCst);
    let (status, body) = upload_pdf(&r, "STU001", "card.pdf").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "store_write");

    // Nothing half-written; the same request then succeeds.
    r.blobs
      .fail_puts
      .store(false, std::sync::atomic::Ordering::SeqCst);
    let (status, _) = upload_pdf(&r, "STU001", "card.pdf").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(r.blobs.len(), 1);
  }

  // ── Subjects ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn subject_lifecycle() {
    let r = rig().await;
    let created = enroll(&r, "STU001").await;
    let id = created["subject_id"].as_str().unwrap().to_string();

    // Duplicate registration number is a validation error.
    let (status, body) = send(
      &r,
      "POST",
      "/api/subjects",
      vec![
        ("authorization", auth_header()),
        ("content-type", "application/json".to_string()),
      ],
      Body::from(
        json!({ "reg_no": "STU001", "full_name": "Other" }).to_string(),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    // Lookup works by both UUID and registration number.
    let (status, by_id) =
      send(&r, "GET", &format!("/api/subjects/{id}"), vec![], Body::empty())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id["reg_no"], "STU001");
    let (status, _) =
      send(&r, "GET", "/api/subjects/STU001", vec![], Body::empty()).await;
    assert_eq!(status, StatusCode::OK);

    // Delete, then both lookups 404.
    let (status, _) = send(
      &r,
      "DELETE",
      &format!("/api/subjects/{id}"),
      vec![("authorization", auth_header())],
      Body::empty(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) =
      send(&r, "GET", "/api/subjects/STU001", vec![], Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn deleting_subject_drops_its_documents() {
    let r = rig().await;
    enroll(&r, "STU001").await;
    upload_pdf(&r, "STU001", "card.pdf").await;

    send(
      &r,
      "DELETE",
      "/api/subjects/STU001",
      vec![("authorization", auth_header())],
      Body::empty(),
    )
    .await;

    let (status, _) =
      send(&r, "GET", "/api/documents/STU001", vec![], Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
