//! # waypoint-routing
//!
//! The routing engine for waypoint. Controller descriptors are compiled once
//! into an ordered table of anchored regular expressions; each request is
//! then resolved by a linear, method-aware scan of that table.
//!
//! ## Modules
//!
//! - [`descriptor`] - Declarative route input and descriptor file loading
//! - [`handler`] - Opaque handler identifiers
//! - [`request`] - The method and path view the matcher works on
//! - [`urls`] - Compiler, route table, route kinds, router, and reverse routing

pub mod descriptor;
pub mod handler;
pub mod request;
pub mod urls;

pub use descriptor::{ControllerDescriptor, RouteDefinition, RouteManifest};
pub use handler::HandlerId;
pub use request::RouteRequest;
pub use urls::compiler::{Compilation, RouteCompiler};
pub use urls::route::{Match, Resolution, Route};
pub use urls::router::Router;
pub use urls::table::{CompiledRoute, RouteListing, RouteTable};
