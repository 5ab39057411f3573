//! Artifact endpoints: upload/register, latest-by-kind, and full history.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use tassel_core::{
  artifact::{Artifact, ArtifactKind},
  blob::BlobStore,
  store::ArtifactStore,
  subject::Subject,
};

use crate::{
  AppState,
  auth::Authenticated,
  error::Error,
  negotiate::{Inbound, RawMeta, negotiate},
  subjects::resolve_subject,
};

/// Wire shape of one registered document, camelCased for the portal
/// frontend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactData {
  pub id:                  Uuid,
  pub subject_natural_key: String,
  pub artifact_type:       ArtifactKind,
  pub file_url:            String,
  pub file_name:           String,
  pub file_size:           u64,
  pub uploaded_at:         DateTime<Utc>,
}

impl ArtifactData {
  pub fn new(artifact: Artifact, subject: &Subject) -> Self {
    Self {
      id:                  artifact.artifact_id,
      subject_natural_key: subject.reg_no.clone(),
      artifact_type:       artifact.kind,
      file_url:            artifact.file_url,
      file_name:           artifact.file_name,
      file_size:           artifact.file_size,
      uploaded_at:         artifact.created_at,
    }
  }
}

fn parse_kind(kind: &str) -> Result<ArtifactKind, Error> {
  ArtifactKind::parse(kind)
    .map_err(|_| Error::Validation(format!("unknown document kind: {kind:?}")))
}

/// `POST /api/artifacts/{kind}` — register one document.
///
/// The body may be the raw file, a legacy multipart form, or a JSON
/// reference to an already-uploaded file; negotiation is by content type.
pub async fn upload<S, B>(
  _auth: Authenticated,
  State(state): State<AppState<S, B>>,
  Path(kind): Path<String>,
  Query(query): Query<RawMeta>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Response, Error>
where
  S: ArtifactStore + 'static,
  B: BlobStore + 'static,
{
  let kind = parse_kind(&kind)?;

  let artifact = match negotiate(kind, &headers, &query, body).await? {
    Inbound::Upload(req) => state.registrar.register(req).await?,
    Inbound::Reference(req) => state.registrar.register_reference(req).await?,
  };

  let subject = state
    .store
    .get_subject(artifact.subject_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound("subject".to_string()))?;

  let body = json!({
    "message": format!("{kind} registered"),
    "data": ArtifactData::new(artifact, &subject),
  });
  Ok((StatusCode::CREATED, Json(body)).into_response())
}

/// `GET /api/subjects/{id}/{kind}` — the current document of one kind.
pub async fn latest<S, B>(
  State(state): State<AppState<S, B>>,
  Path((id, kind)): Path<(String, String)>,
) -> Result<Json<ArtifactData>, Error>
where
  S: ArtifactStore + 'static,
  B: BlobStore + 'static,
{
  let kind = parse_kind(&kind)?;
  let subject = resolve_subject(state.store.as_ref(), &id).await?;

  let artifact = state
    .store
    .latest_by_kind(subject.subject_id, kind)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| {
      Error::NotFound(format!("no {kind} on file for {}", subject.reg_no))
    })?;

  Ok(Json(ArtifactData::new(artifact, &subject)))
}

/// `GET /api/documents/{reg_no}` — every document ever registered for a
/// subject, newest first.
pub async fn documents<S, B>(
  State(state): State<AppState<S, B>>,
  Path(reg_no): Path<String>,
) -> Result<Json<Vec<ArtifactData>>, Error>
where
  S: ArtifactStore + 'static,
  B: BlobStore + 'static,
{
  let subject = resolve_subject(state.store.as_ref(), &reg_no).await?;

  let artifacts = state
    .store
    .all_for_subject(subject.subject_id)
    .await
    .map_err(Error::store)?;

  Ok(Json(
    artifacts
      .into_iter()
      .map(|a| ArtifactData::new(a, &subject))
      .collect(),
  ))
}
