//! HTTP Basic-auth extractor backed by the operators table.
//!
//! Credentials are stored as an explicit two-variant
//! [`Credential`](tassel_core::credential::Credential): argon2-hashed, or a
//! legacy plaintext carried over from the old import. A successful legacy
//! match is migrated to the hashed variant synchronously, before the request
//! proceeds — there is no "try hash, fall back to plaintext" cascade left
//! anywhere.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand_core::OsRng;

use tassel_core::{blob::BlobStore, credential::Credential, store::ArtifactStore};

use crate::{AppState, error::Error};

/// Zero-size marker: present in the handler means the request was
/// authenticated.
pub struct Authenticated;

/// Produce the argon2 PHC string for a password. Used by credential
/// migration and the `--hash-password` helper.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Store(format!("argon2 error: {e}").into()))
}

fn parse_basic(headers: &HeaderMap) -> Result<(String, String), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) =
    creds.split_once(':').ok_or(Error::Unauthorized)?;
  Ok((username.to_string(), password.to_string()))
}

/// Verify credentials against the operators table, migrating legacy rows on
/// a successful match.
pub async fn verify_auth<S>(headers: &HeaderMap, store: &S) -> Result<(), Error>
where
  S: ArtifactStore,
{
  let (username, password) = parse_basic(headers)?;

  let operator = store
    .get_operator(&username)
    .await
    .map_err(Error::store)?
    .ok_or(Error::Unauthorized)?;

  match operator.credential {
    Credential::Hashed(phc) => {
      let parsed = PasswordHash::new(&phc).map_err(|_| Error::Unauthorized)?;
      Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| Error::Unauthorized)?;
      Ok(())
    }
    Credential::Legacy(plain) => {
      if plain != password {
        return Err(Error::Unauthorized);
      }
      // Migrate before answering; the plaintext never survives a
      // successful login.
      let hashed = Credential::Hashed(hash_password(&password)?);
      store
        .update_credential(&username, hashed)
        .await
        .map_err(Error::store)?;
      tracing::info!(username, "legacy credential migrated to argon2");
      Ok(())
    }
  }
}

impl<S, B> FromRequestParts<AppState<S, B>> for Authenticated
where
  S: ArtifactStore + 'static,
  B: BlobStore + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, B>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, state.store.as_ref()).await?;
    Ok(Authenticated)
  }
}
