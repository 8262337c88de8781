//! Route composition engine.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     resource managers declare Group/Endpoint trees
//!         → server mounts them under one root Group
//!         → builder::build walks the tree (validates, composes handlers)
//!         → builder::into_router installs the mappings into axum
//!         → Freeze: the router is immutable while serving
//!
//! Request time:
//!     axum match → filter conjunction (403 on failure)
//!         → endpoint middleware (first-added outermost)
//!         → business handler → JSON envelope response
//! ```
//!
//! # Design Decisions
//! - Trees compiled at startup; malformed trees are startup-fatal
//! - Deterministic: the same tree always installs the same mapping set
//! - Unmatched paths stay the concern of the underlying axum router

pub mod builder;
pub mod context;
pub mod filter;
pub mod middleware;
pub mod tree;

pub use builder::{build, into_router, BuildError, CompiledRoute};
pub use context::{BoxHandler, RequestContext, Response};
pub use filter::{BoxFilter, Filter, Filters, RequireHeader};
pub use middleware::{Middleware, Stack};
pub use tree::{Endpoint, Group, RouteNode};
