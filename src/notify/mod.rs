//! Publish/subscribe notifier collaborator boundary.
//!
//! # Responsibilities
//! - Define the publish interface the journey flow depends on
//! - Distinguish timeouts from other delivery failures
//!
//! # Design Decisions
//! - Fire-and-forget from the core's perspective: callers log failures
//!   and never retry here
//! - Messages cross the boundary as JSON values on a named topic

pub mod http;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpNotifier;

/// Notifier collaborator failure.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("publish timed out")]
    Timeout,

    #[error("publish failed: {0}")]
    Backend(String),
}

/// Publish capability consumed by business handlers.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, topic: &str, message: Value) -> Result<(), NotifyError>;
}

/// Message published when a journey starts.
#[derive(Debug, Clone, Serialize)]
pub struct JourneyStarted {
    pub user_id: String,
    pub journey_id: String,
}

/// Notifier that drops every message. Used when the notifier is disabled
/// in configuration and as a wiring default in tests.
#[derive(Debug, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn publish(&self, topic: &str, _message: Value) -> Result<(), NotifyError> {
        tracing::debug!(topic, "notifier disabled, message dropped");
        Ok(())
    }
}
