//! Time-limited URL signatures.
//!
//! A signature is the hex SHA-256 of `secret \n key \n expires`. Anyone
//! serving the objects verifies by recomputing; no state is shared beyond
//! the secret. This is a keyed digest, adequate for an internal bucket
//! frontend where the secret never leaves the deployment.

use chrono::Utc;
use sha2::{Digest, Sha256};

use tassel_core::blob::BlobError;

/// Signs and verifies expiring object URLs with a shared secret.
#[derive(Clone)]
pub struct UrlSigner {
  secret: String,
}

impl UrlSigner {
  pub fn new(secret: impl Into<String>) -> Self {
    Self { secret: secret.into() }
  }

  /// `?expires=<unix-seconds>&sig=<hex digest>` for `key`, valid for
  /// `ttl_seconds` from now.
  pub fn query_string(&self, key: &str, ttl_seconds: u64) -> Result<String, BlobError> {
    if self.secret.is_empty() {
      return Err(BlobError::Signing("signing secret is empty".to_string()));
    }
    let expires = Utc::now().timestamp() + ttl_seconds as i64;
    let sig = self.digest(key, expires);
    Ok(format!("expires={expires}&sig={sig}"))
  }

  /// Check a previously issued `(expires, sig)` pair against `key`.
  pub fn verify(&self, key: &str, expires: i64, sig: &str) -> bool {
    if expires < Utc::now().timestamp() {
      return false;
    }
    self.digest(key, expires) == sig
  }

  fn digest(&self, key: &str, expires: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.secret.as_bytes());
    hasher.update(b"\n");
    hasher.update(key.as_bytes());
    hasher.update(b"\n");
    hasher.update(expires.to_string().as_bytes());
    hex::encode(hasher.finalize())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signature_roundtrip() {
    let signer = UrlSigner::new("s3cret");
    let qs = signer.query_string("photo/STU001_1_a.png", 3600).unwrap();

    let expires: i64 = qs
      .split('&')
      .find_map(|p| p.strip_prefix("expires="))
      .unwrap()
      .parse()
      .unwrap();
    let sig = qs.split('&').find_map(|p| p.strip_prefix("sig=")).unwrap();

    assert!(signer.verify("photo/STU001_1_a.png", expires, sig));
    assert!(!signer.verify("photo/STU001_1_b.png", expires, sig));
    assert!(!UrlSigner::new("other").verify("photo/STU001_1_a.png", expires, sig));
  }

  #[test]
  fn expired_signature_fails_verification() {
    let signer = UrlSigner::new("s3cret");
    let expires = Utc::now().timestamp() - 10;
    let sig = signer.digest("k", expires);
    assert!(!signer.verify("k", expires, &sig));
  }

  #[test]
  fn empty_secret_refuses_to_sign() {
    let signer = UrlSigner::new("");
    assert!(signer.query_string("k", 60).is_err());
  }
}
