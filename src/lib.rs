//! Journey tracking REST backend.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!         → routing (compiled route tree: filter gate → middleware → handler)
//!         → resources (user / journey / trip / room managers)
//!         → merge engine (field-level patch application)
//!         → collaborators (entity store, notifier)
//!     Client Response (uniform JSON envelopes)
//! ```
//!
//! The route tree is declared once at startup, compiled into an axum
//! router, and never mutated afterwards. The merge engine is a single
//! generic algorithm driven by per-kind field descriptor tables.

// Core subsystems
pub mod config;
pub mod error;
pub mod merge;
pub mod routing;

// Resource handlers
pub mod resources;

// External collaborators
pub mod notify;
pub mod store;

// Composition root
pub mod server;

// Cross-cutting concerns
pub mod observability;

pub use config::schema::AppConfig;
pub use error::ApiError;
pub use server::Server;
