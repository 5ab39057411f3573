//! Blob store backends for Tassel.
//!
//! [`FsBlobStore`] is the production backend: files under a root directory,
//! no-overwrite writes, and keyed-digest signed URLs. [`MemoryBlobStore`] is
//! a test double with failure injection, used by the HTTP integration tests.

pub mod fs;
pub mod memory;
pub mod sign;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use sign::UrlSigner;
