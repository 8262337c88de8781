//! Entity store collaborator boundary.
//!
//! # Responsibilities
//! - Define the narrow key-value interface handlers depend on
//! - Keep persistence mechanics behind the trait (out of scope here)
//!
//! # Design Decisions
//! - Records cross the boundary as `serde_json::Value`, keyed by
//!   (kind, id); schema knowledge stays with the resource layer
//! - Object-safe async trait so backends can block or go remote
//! - No versioning: get/put pairs race, last write wins (documented
//!   behavior of the patch flow, see the resources module)

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::merge::Kind;

pub use memory::MemoryStore;

/// Storage collaborator failure. Surfaced, never retried here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Key-value entity storage, keyed by kind and id.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch a record; `None` when absent.
    async fn get(&self, kind: Kind, id: &str) -> Result<Option<Value>, StoreError>;

    /// Write a record, replacing any existing one.
    async fn put(&self, kind: Kind, id: &str, record: Value) -> Result<(), StoreError>;

    /// Remove a record; returns whether it existed.
    async fn delete(&self, kind: Kind, id: &str) -> Result<bool, StoreError>;
}
