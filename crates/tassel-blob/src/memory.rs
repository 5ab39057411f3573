//! In-memory blob store with failure injection — test support only.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
  },
};

use bytes::Bytes;

use tassel_core::blob::{BlobError, BlobStore, Removal};

/// A `HashMap`-backed blob store. The `fail_*` toggles make the next
/// operations fail, for exercising the registrar's failure exits from
/// integration tests.
#[derive(Default)]
pub struct MemoryBlobStore {
  objects:      Mutex<HashMap<String, StoredObject>>,
  pub fail_puts:    AtomicBool,
  pub fail_removes: AtomicBool,
}

#[derive(Clone)]
struct StoredObject {
  bytes:        Bytes,
  content_type: String,
}

impl MemoryBlobStore {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.objects.lock().unwrap().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  pub fn contains(&self, key: &str) -> bool {
    self.objects.lock().unwrap().contains_key(key)
  }

  pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
    self
      .objects
      .lock()
      .unwrap()
      .get(key)
      .map(|o| (o.bytes.clone(), o.content_type.clone()))
  }

  pub fn keys(&self) -> Vec<String> {
    self.objects.lock().unwrap().keys().cloned().collect()
  }
}

impl BlobStore for MemoryBlobStore {
  async fn put(
    &self,
    key: &str,
    bytes: Bytes,
    content_type: &str,
  ) -> Result<(), BlobError> {
    if self.fail_puts.load(Ordering::SeqCst) {
      return Err(BlobError::Backend("injected put failure".to_string()));
    }
    let mut objects = self.objects.lock().unwrap();
    if objects.contains_key(key) {
      return Err(BlobError::AlreadyExists(key.to_string()));
    }
    objects.insert(
      key.to_string(),
      StoredObject { bytes, content_type: content_type.to_string() },
    );
    Ok(())
  }

  fn public_url(&self, key: &str) -> String { format!("mem://{key}") }

  async fn signed_url(&self, key: &str, ttl_seconds: u64) -> Result<String, BlobError> {
    Ok(format!("mem://{key}?ttl={ttl_seconds}"))
  }

  async fn remove(&self, key: &str) -> Result<Removal, BlobError> {
    if self.fail_removes.load(Ordering::SeqCst) {
      return Err(BlobError::Backend("injected remove failure".to_string()));
    }
    match self.objects.lock().unwrap().remove(key) {
      Some(_) => Ok(Removal::Removed),
      None => Ok(Removal::NotFound),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn put_get_remove() {
    let s = MemoryBlobStore::new();
    s.put("k/a", Bytes::from_static(b"x"), "image/png").await.unwrap();
    assert_eq!(s.get("k/a").unwrap().1, "image/png");
    assert_eq!(s.remove("k/a").await.unwrap(), Removal::Removed);
    assert_eq!(s.remove("k/a").await.unwrap(), Removal::NotFound);
  }

  #[tokio::test]
  async fn injected_failures() {
    let s = MemoryBlobStore::new();
    s.fail_puts.store(true, Ordering::SeqCst);
    assert!(s.put("k/a", Bytes::from_static(b"x"), "image/png").await.is_err());
    assert!(s.is_empty());
  }
}
