//! The declarative route tree.
//!
//! # Responsibilities
//! - Describe routes as a tree of groups and endpoints before compilation
//! - Hold each endpoint's handler, filters and middleware stack
//!
//! # Design Decisions
//! - The tree is plain owned data: built once at startup, handed to the
//!   builder, never mutated afterwards
//! - Group children are ordered pairs rather than a map so the builder
//!   can detect duplicate sibling patterns instead of silently replacing
//! - Group-level middleware is stored but not composed into descendant
//!   endpoints; only the endpoint's own stack wraps its handler

use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::error::ApiError;
use crate::routing::context::{BoxHandler, RequestContext, Response};
use crate::routing::filter::{BoxFilter, Filter, Filters};
use crate::routing::middleware::{Middleware, Stack};

/// A node of the route tree: either a path group or a routable endpoint.
pub enum RouteNode {
    Group(Group),
    Endpoint(Endpoint),
}

/// A path segment with named children.
#[derive(Default)]
pub struct Group {
    pub(crate) children: Vec<(String, RouteNode)>,
    /// Stored for configuration parity but inert: the builder does not
    /// inherit it into descendant endpoints.
    pub(crate) middleware: Stack,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child node under `pattern`. Duplicate sibling patterns are
    /// recorded as-is and rejected by the builder.
    pub fn child(mut self, pattern: impl Into<String>, node: impl Into<RouteNode>) -> Self {
        self.children.push((pattern.into(), node.into()));
        self
    }

    /// Attach group-level middleware (currently inert, see module docs).
    pub fn wrap(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }
}

/// A tree leaf: one routable handler plus its guards.
pub struct Endpoint {
    pub(crate) handler: BoxHandler,
    pub(crate) filters: Filters,
    pub(crate) middleware: Stack,
}

impl Endpoint {
    /// Create an endpoint from an async handler. Errors are converted
    /// into the uniform error envelope here, so every installed handler
    /// resolves to a concrete response.
    pub fn new<H, Fut>(handler: H) -> Self
    where
        H: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
    {
        let handler: BoxHandler = Arc::new(move |ctx| {
            let fut = handler(ctx);
            async move { fut.await.unwrap_or_else(|err| err.into_envelope()) }.boxed()
        });
        Endpoint {
            handler,
            filters: Filters::new(),
            middleware: Stack::new(),
        }
    }

    /// Guard this endpoint with a filter. All filters must pass.
    pub fn guard(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Guard this endpoint with an already-shared filter set.
    pub fn guard_all(mut self, filters: &[BoxFilter]) -> Self {
        self.filters.extend(filters.iter().cloned());
        self
    }

    /// Wrap this endpoint in middleware. The first middleware added is
    /// the outermost wrapper around the handler.
    pub fn wrap(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Wrap this endpoint in an already-built middleware stack, keeping
    /// the stack's order.
    pub fn wrap_all(mut self, stack: &[Middleware]) -> Self {
        self.middleware.extend(stack.iter().cloned());
        self
    }
}

impl From<Group> for RouteNode {
    fn from(group: Group) -> Self {
        RouteNode::Group(group)
    }
}

impl From<Endpoint> for RouteNode {
    fn from(endpoint: Endpoint) -> Self {
        RouteNode::Endpoint(endpoint)
    }
}
