//! Core types and trait definitions for the Tassel document registry.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod artifact;
pub mod blob;
pub mod credential;
pub mod error;
pub mod registrar;
pub mod store;
pub mod subject;

pub use error::{Error, Result};
