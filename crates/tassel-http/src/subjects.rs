//! Subject endpoints: enrollment, lookup, listing, and removal.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use uuid::Uuid;

use tassel_core::{
  blob::BlobStore,
  store::ArtifactStore,
  subject::{NewSubject, Subject},
};

use crate::{AppState, auth::Authenticated, error::Error};

/// Resolve a path segment to a subject: a UUID resolves by surrogate id,
/// anything else by registration number. Absent subjects are a 404.
pub(crate) async fn resolve_subject<S>(
  store: &S,
  id: &str,
) -> Result<Subject, Error>
where
  S: ArtifactStore,
{
  let found = match Uuid::parse_str(id) {
    Ok(uuid) => store.get_subject(uuid).await.map_err(Error::store)?,
    Err(_) => store.find_subject(id).await.map_err(Error::store)?,
  };
  found.ok_or_else(|| Error::NotFound(format!("subject {id:?}")))
}

fn duplicate_reg_no(reg_no: &str) -> Error {
  Error::Validation(format!(
    "registration number {reg_no:?} is already enrolled"
  ))
}

/// `POST /api/subjects` — enroll a new subject.
pub async fn create<S, B>(
  _auth: Authenticated,
  State(state): State<AppState<S, B>>,
  Json(input): Json<NewSubject>,
) -> Result<Response, Error>
where
  S: ArtifactStore + 'static,
  B: BlobStore + 'static,
{
  if input.reg_no.trim().is_empty() {
    return Err(Error::Validation("missing registration number".to_string()));
  }
  if input.full_name.trim().is_empty() {
    return Err(Error::Validation("missing full name".to_string()));
  }

  // Pre-check so the duplicate case answers 400 rather than surfacing a
  // backend constraint error as a 500.
  if state
    .store
    .find_subject(&input.reg_no)
    .await
    .map_err(Error::store)?
    .is_some()
  {
    return Err(duplicate_reg_no(&input.reg_no));
  }

  match state.store.add_subject(input.clone()).await {
    Ok(subject) => Ok((StatusCode::CREATED, Json(subject)).into_response()),
    // A concurrent enroll can win between the pre-check and the insert;
    // the loser gets the same answer as the pre-checked duplicate.
    Err(e) => {
      if state
        .store
        .find_subject(&input.reg_no)
        .await
        .map_err(Error::store)?
        .is_some()
      {
        Err(duplicate_reg_no(&input.reg_no))
      } else {
        Err(Error::store(e))
      }
    }
  }
}

/// `GET /api/subjects` — all subjects, oldest first.
pub async fn list<S, B>(
  State(state): State<AppState<S, B>>,
) -> Result<Json<Vec<Subject>>, Error>
where
  S: ArtifactStore + 'static,
  B: BlobStore + 'static,
{
  let subjects = state.store.list_subjects().await.map_err(Error::store)?;
  Ok(Json(subjects))
}

/// `GET /api/subjects/{id}` — one subject, by UUID or registration number.
pub async fn get_one<S, B>(
  State(state): State<AppState<S, B>>,
  Path(id): Path<String>,
) -> Result<Json<Subject>, Error>
where
  S: ArtifactStore + 'static,
  B: BlobStore + 'static,
{
  let subject = resolve_subject(state.store.as_ref(), &id).await?;
  Ok(Json(subject))
}

/// `DELETE /api/subjects/{id}` — remove a subject and, by cascade, all of
/// its document records. Blobs are retained for out-of-band retention
/// handling.
pub async fn delete<S, B>(
  _auth: Authenticated,
  State(state): State<AppState<S, B>>,
  Path(id): Path<String>,
) -> Result<StatusCode, Error>
where
  S: ArtifactStore + 'static,
  B: BlobStore + 'static,
{
  let subject = resolve_subject(state.store.as_ref(), &id).await?;

  let removed = state
    .store
    .remove_subject(subject.subject_id)
    .await
    .map_err(Error::store)?;

  if removed {
    tracing::info!(reg_no = %subject.reg_no, "subject removed");
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(Error::NotFound(format!("subject {id:?}")))
  }
}
