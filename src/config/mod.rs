//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file
//!     → loader.rs (read, parse)
//!     → validation.rs (semantic checks, all errors reported)
//!     → AppConfig accepted into the system
//! ```
//!
//! # Design Decisions
//! - Every option has a serde default; an empty file is a valid config
//! - Credentials and endpoints are explicit options, never constants
//! - Validation runs before the config is accepted; startup is fail-fast

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{AppConfig, NotifierConfig};
