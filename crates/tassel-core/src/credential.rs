//! Operator credential representation.
//!
//! Two explicit variants instead of a "try hash, fall back to plaintext"
//! cascade: a credential is either already hashed, or a legacy plaintext
//! left over from the old import. A successful legacy match must be migrated
//! to [`Credential::Hashed`] synchronously before the login returns; the
//! verification itself lives in the HTTP layer, which owns the hasher.

use serde::{Deserialize, Serialize};

/// How an operator's secret is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Credential {
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  Hashed(String),
  /// Plaintext carried over from a legacy import. Matched by direct string
  /// comparison and immediately re-hashed on first successful login.
  Legacy(String),
}

impl Credential {
  pub fn is_legacy(&self) -> bool { matches!(self, Self::Legacy(_)) }
}

/// An account allowed to call the administration API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
  pub username:   String,
  pub credential: Credential,
}
