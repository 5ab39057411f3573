//! Content negotiation — three wire shapes, one normalised upload value.
//!
//! Selection is made solely from the declared `Content-Type`:
//! image/PDF/Word/octet-stream bodies are raw-binary uploads with metadata
//! in headers or query parameters (header wins); `multipart/form-data` is
//! the legacy form shape; anything else is attempted as a JSON reference to
//! a file uploaded out-of-band. A missing content type is a validation
//! error, never a silent default.

use axum::http::{HeaderMap, header};
use bytes::Bytes;
use serde::Deserialize;
use uuid::Uuid;

use tassel_core::artifact::{
  ArtifactKind, ReferenceRequest, UploadRequest, WireMode,
};
use tassel_core::subject::SubjectRef;

use crate::error::Error;

/// A normalised inbound request, ready for the registrar.
#[derive(Debug)]
pub enum Inbound {
  Upload(UploadRequest),
  Reference(ReferenceRequest),
}

/// Query-parameter fallbacks for raw-binary metadata.
#[derive(Debug, Default, Deserialize)]
pub struct RawMeta {
  pub subject:  Option<String>,
  pub filename: Option<String>,
}

/// Metadata headers for raw-binary mode. Headers take precedence over the
/// equivalent query parameters when both are given.
const SUBJECT_HEADER: &str = "x-subject";
const FILENAME_HEADER: &str = "x-filename";

const RAW_BINARY_TYPES: &[&str] = &[
  "application/pdf",
  "application/msword",
  "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
  "application/octet-stream",
];

/// A registration number that parses as a UUID is treated as a surrogate id.
fn subject_ref(s: &str) -> SubjectRef {
  match Uuid::parse_str(s) {
    Ok(id) => SubjectRef::Id(id),
    Err(_) => SubjectRef::RegNo(s.to_string()),
  }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers.get(name).and_then(|v| v.to_str().ok())
}

/// Normalise one upload request from whichever wire shape carried it.
pub async fn negotiate(
  kind: ArtifactKind,
  headers: &HeaderMap,
  query: &RawMeta,
  body: Bytes,
) -> Result<Inbound, Error> {
  let content_type = header_str(headers, header::CONTENT_TYPE.as_str())
    .map(str::trim)
    .filter(|ct| !ct.is_empty())
    .ok_or_else(|| {
      Error::Validation("missing or unsupported content type".to_string())
    })?;

  let main_type = content_type
    .split(';')
    .next()
    .unwrap_or(content_type)
    .trim()
    .to_ascii_lowercase();

  if main_type == "multipart/form-data" {
    return multipart_upload(kind, content_type, body).await;
  }

  if main_type.starts_with("image/") || RAW_BINARY_TYPES.contains(&main_type.as_str()) {
    return raw_binary_upload(kind, &main_type, headers, query, body);
  }

  // Everything else is attempted as a JSON reference.
  reference_request(kind, body)
}

// ─── Raw-binary mode ─────────────────────────────────────────────────────────

fn raw_binary_upload(
  kind: ArtifactKind,
  content_type: &str,
  headers: &HeaderMap,
  query: &RawMeta,
  body: Bytes,
) -> Result<Inbound, Error> {
  let subject = header_str(headers, SUBJECT_HEADER)
    .map(str::to_owned)
    .or_else(|| query.subject.clone())
    .ok_or_else(|| Error::Validation("missing subject".to_string()))?;

  let file_name = header_str(headers, FILENAME_HEADER)
    .map(str::to_owned)
    .or_else(|| query.filename.clone())
    .ok_or_else(|| Error::Validation("missing filename".to_string()))?;

  Ok(Inbound::Upload(UploadRequest {
    subject: subject_ref(&subject),
    kind,
    payload: body,
    content_type: content_type.to_string(),
    file_name,
    mode: WireMode::RawBinary,
  }))
}

// ─── Legacy multipart mode ───────────────────────────────────────────────────

/// Parse the legacy `multipart/form-data` shape: a `file` part plus
/// `subject` and optional `filename` text parts. Must produce an upload
/// identical in shape to raw-binary mode.
async fn multipart_upload(
  kind: ArtifactKind,
  content_type: &str,
  body: Bytes,
) -> Result<Inbound, Error> {
  let boundary = multer::parse_boundary(content_type)
    .map_err(|e| Error::Transport(format!("invalid multipart boundary: {e}")))?;

  let stream = futures_util::stream::once(async move {
    Ok::<Bytes, std::convert::Infallible>(body)
  });
  let mut multipart = multer::Multipart::new(stream, boundary);

  let mut subject: Option<String> = None;
  let mut filename_override: Option<String> = None;
  let mut file: Option<(Bytes, String, Option<String>)> = None;

  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| Error::Transport(format!("malformed multipart body: {e}")))?
  {
    let name = field.name().map(str::to_owned);
    match name.as_deref() {
      Some("file") => {
        let part_name = field.file_name().map(str::to_owned);
        let part_type = field
          .content_type()
          .map(|m| m.to_string())
          .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field
          .bytes()
          .await
          .map_err(|e| Error::Transport(format!("unreadable file part: {e}")))?;
        file = Some((bytes, part_type, part_name));
      }
      Some("subject") => {
        subject = Some(field.text().await.map_err(|e| {
          Error::Transport(format!("unreadable subject part: {e}"))
        })?);
      }
      Some("filename") => {
        filename_override = Some(field.text().await.map_err(|e| {
          Error::Transport(format!("unreadable filename part: {e}"))
        })?);
      }
      _ => {
        // Unknown parts are drained and ignored.
        let _ = field.bytes().await;
      }
    }
  }

  let (payload, content_type, part_name) =
    file.ok_or_else(|| Error::Validation("missing file".to_string()))?;
  let subject =
    subject.ok_or_else(|| Error::Validation("missing subject".to_string()))?;
  let file_name = filename_override
    .or(part_name)
    .ok_or_else(|| Error::Validation("missing filename".to_string()))?;

  Ok(Inbound::Upload(UploadRequest {
    subject: subject_ref(&subject),
    kind,
    payload,
    content_type,
    file_name,
    mode: WireMode::Multipart,
  }))
}

// ─── Reference mode ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ReferenceBody {
  subject:   String,
  file_url:  String,
  file_name: Option<String>,
}

fn reference_request(kind: ArtifactKind, body: Bytes) -> Result<Inbound, Error> {
  let parsed: ReferenceBody = serde_json::from_slice(&body)
    .map_err(|e| Error::Transport(format!("body is not valid JSON: {e}")))?;

  let file_name = parsed.file_name.unwrap_or_else(|| {
    parsed
      .file_url
      .rsplit('/')
      .next()
      .filter(|s| !s.is_empty())
      .unwrap_or("file")
      .to_string()
  });

  Ok(Inbound::Reference(ReferenceRequest {
    subject: subject_ref(&parsed.subject),
    kind,
    file_url: parsed.file_url,
    file_name,
  }))
}
