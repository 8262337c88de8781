//! Composable handler transformers.
//!
//! # Responsibilities
//! - Define the middleware shape: handler in, handler out
//! - Provide the stock middleware used on endpoints (request id, logging)
//!
//! # Design Decisions
//! - Middleware operates on the boxed handler capability, so a stack of
//!   any depth composes into one handler before the router is built
//! - The first middleware added to an endpoint is the outermost wrapper
//! - Middleware may enrich the request context but never the route tree

use std::sync::Arc;

use uuid::Uuid;

use crate::routing::context::{BoxHandler, RequestContext};

/// A handler transformer. Stacks of these are composed at build time.
pub type Middleware = Arc<dyn Fn(BoxHandler) -> BoxHandler + Send + Sync>;

/// Ordered middleware stack attached to a group or endpoint.
pub type Stack = Vec<Middleware>;

/// Metadata key under which [`request_id`] stores the generated id.
pub const REQUEST_ID_KEY: &str = "request_id";

/// Wrap a plain transformer closure into a [`Middleware`].
pub fn from_fn<F>(f: F) -> Middleware
where
    F: Fn(BoxHandler) -> BoxHandler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Attaches a fresh UUID v4 request id to the context metadata.
pub fn request_id() -> Middleware {
    from_fn(|next: BoxHandler| {
        let wrapped: BoxHandler = Arc::new(move |mut ctx: RequestContext| {
            ctx.metadata
                .insert(REQUEST_ID_KEY.to_string(), Uuid::new_v4().to_string());
            next(ctx)
        });
        wrapped
    })
}

/// Logs method, path and request id for every request that reaches the
/// handler chain (requests rejected by the filter gate are not logged
/// here; the gate never invokes middleware).
pub fn request_log() -> Middleware {
    from_fn(|next: BoxHandler| {
        let wrapped: BoxHandler = Arc::new(move |ctx: RequestContext| {
            tracing::info!(
                method = %ctx.method,
                path = %ctx.path,
                request_id = ctx.metadata.get(REQUEST_ID_KEY).map(String::as_str),
                "request"
            );
            next(ctx)
        });
        wrapped
    })
}
