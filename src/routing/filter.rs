//! Access filters evaluated before a handler runs.
//!
//! # Responsibilities
//! - Define the filter predicate over request context
//! - Combine filters with AND semantics (conjunction)
//! - Provide the concrete filters the server wires up
//!
//! # Design Decisions
//! - Empty filter set always passes (conjunction over the empty set)
//! - Short-circuit on the first failing filter
//! - Filters are pure: they never mutate the context or the route tree

use std::sync::Arc;

use crate::routing::context::RequestContext;

/// A boolean gate over an inbound request.
pub trait Filter: Send + Sync {
    /// Returns true if the request may proceed to the handler.
    fn allow(&self, ctx: &RequestContext) -> bool;
}

/// Any plain predicate closure is a filter.
impl<F> Filter for F
where
    F: Fn(&RequestContext) -> bool + Send + Sync,
{
    fn allow(&self, ctx: &RequestContext) -> bool {
        self(ctx)
    }
}

/// Shared filter handle, cloneable across compiled routes.
pub type BoxFilter = Arc<dyn Filter>;

/// An ordered set of filters combined by conjunction.
pub type Filters = Vec<BoxFilter>;

/// Evaluate the conjunction of `filters` against `ctx`, short-circuiting
/// on the first failure. The empty set passes.
pub fn conjunction(filters: &[BoxFilter], ctx: &RequestContext) -> bool {
    filters.iter().all(|f| f.allow(ctx))
}

/// Requires a header to be present with an exact value.
///
/// Header names are matched lowercase; values are case-sensitive.
#[derive(Debug, Clone)]
pub struct RequireHeader {
    name: String,
    expected: String,
}

impl RequireHeader {
    pub fn new(name: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            expected: expected.into(),
        }
    }
}

impl Filter for RequireHeader {
    fn allow(&self, ctx: &RequestContext) -> bool {
        ctx.header(&self.name) == Some(self.expected.as_str())
    }
}
