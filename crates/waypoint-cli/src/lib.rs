//! # waypoint-cli
//!
//! Management commands for inspecting and building waypoint route tables.
//!
//! This crate provides:
//!
//! - **Management commands** - A framework for defining and registering CLI commands
//! - **Built-in commands** - `list-routes`, `resolve`, `compile`, and `check`
//!
//! ## Quick Start
//!
//! ```rust
//! use waypoint_cli::command::CommandRegistry;
//! use waypoint_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert!(names.contains(&"list-routes"));
//! assert!(names.contains(&"resolve"));
//! assert!(names.contains(&"check"));
//! ```

// These clippy lints are intentionally allowed:
// - result_large_err: WaypointError is the crate-wide error type
// - unused_async: command handlers keep a uniform async signature
#![allow(clippy::result_large_err)]
#![allow(clippy::unused_async)]

pub mod command;
pub mod commands;

pub use command::{CommandRegistry, ManagementCommand};
