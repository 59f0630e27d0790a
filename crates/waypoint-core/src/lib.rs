//! # waypoint-core
//!
//! Core types shared by every waypoint crate. This crate has no routing
//! logic of its own and provides the foundation the other crates build on.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Routing settings and global configuration
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`checks`] - System checks over the loaded settings
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - Text helpers (case conversion for path segments)

pub mod checks;
pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{WaypointError, WaypointResult};
pub use settings::{Settings, SETTINGS};
