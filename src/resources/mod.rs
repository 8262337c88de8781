//! Resource managers and their shared plumbing.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → manager handler (get / create / delete / set / …)
//!     → load_record (store get + schema decode)
//!     → merge engine (set only)
//!     → save_record (schema encode + store put)
//!     → JSON response (record echo or envelope)
//! ```
//!
//! # Design Decisions
//! - The patch flow is read → merge → write with no version check in
//!   between. Two concurrent patches to the same id race and the last
//!   write wins; the loser is silently overwritten. This is documented,
//!   intentional behavior, matching the storage contract.
//! - Record ids come from the path, never from the body.

pub mod journey;
pub mod room;
pub mod trip;
pub mod user;

use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::merge::Patchable;
use crate::routing::context::{RequestContext, Response};
use crate::routing::tree::Endpoint;
use crate::store::EntityStore;

pub use journey::JourneyManager;
pub use room::RoomManager;
pub use trip::TripManager;
pub use user::UserManager;

/// Build an endpoint from a manager method. The manager is cloned per
/// request; managers hold only `Arc` handles, so this is cheap.
pub(crate) fn endpoint<M, F, Fut>(manager: &M, run: F) -> Endpoint
where
    M: Clone + Send + Sync + 'static,
    F: Fn(M, RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
{
    let manager = manager.clone();
    Endpoint::new(move |ctx| run(manager.clone(), ctx))
}

/// Fetch and decode a record, `None` when absent.
pub(crate) async fn try_load_record<R>(
    store: &dyn EntityStore,
    id: &str,
) -> Result<Option<R>, ApiError>
where
    R: Patchable + DeserializeOwned,
{
    match store.get(R::kind(), id).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|_| ApiError::KindMismatch(R::kind())),
        None => Ok(None),
    }
}

/// Fetch and decode a record, erroring when absent.
pub(crate) async fn load_record<R>(store: &dyn EntityStore, id: &str) -> Result<R, ApiError>
where
    R: Patchable + DeserializeOwned,
{
    try_load_record(store, id)
        .await?
        .ok_or(ApiError::NotFound(R::kind()))
}

/// Encode and write a record back to the store.
pub(crate) async fn save_record<R>(
    store: &dyn EntityStore,
    id: &str,
    record: &R,
) -> Result<(), ApiError>
where
    R: Patchable + Serialize,
{
    let value =
        serde_json::to_value(record).map_err(|err| ApiError::Collaborator(err.to_string()))?;
    store.put(R::kind(), id, value).await?;
    Ok(())
}

/// Current time as unix seconds, for start/arrival stamps.
pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
