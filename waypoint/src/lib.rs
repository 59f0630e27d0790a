//! # waypoint
//!
//! Compiled controller routing for Rust.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `waypoint` to get everything, or depend on individual
//! crates for finer-grained control.
//!
//! ```
//! use waypoint::prelude::*;
//!
//! let table = RouteCompiler::new()
//!     .compile(&[ControllerDescriptor::new()
//!         .action(HandlerId::function("health"), RouteDefinition::new("/health"))])
//!     .unwrap()
//!     .table;
//! let router = Router::new(vec![Route::table(table)]);
//! assert!(router.resolve(&RouteRequest::get("/health")).is_ok());
//! ```

/// Core types, settings, checks, logging, and error types.
pub use waypoint_core as core;

/// Route compiler, route table, route kinds, router, and reverse routing.
pub use waypoint_routing as routing;

/// Management commands (CLI).
#[cfg(feature = "cli")]
pub use waypoint_cli as cli;

/// Third-party crates re-exported for user convenience.
pub use http;
pub use serde;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;

/// The types most applications need.
pub mod prelude {
    pub use waypoint_core::{Settings, WaypointError, WaypointResult};
    pub use waypoint_routing::{
        CompiledRoute, ControllerDescriptor, HandlerId, Match, Resolution, Route,
        RouteCompiler, RouteDefinition, RouteManifest, RouteRequest, RouteTable, Router,
    };
}
