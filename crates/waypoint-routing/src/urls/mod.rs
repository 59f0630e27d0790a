//! Route compilation and matching.
//!
//! This module provides the routing engine:
//!
//! - [`template`]: Path template parsing and translation to regex fragments
//! - [`compiler`]: Fuses controller prefixes and action routes into a [`table::RouteTable`]
//! - [`table`]: Compiled routes, first-match scanning, and table persistence
//! - [`route`]: Composable route kinds (table, prefix guard, catch-all, convention, chain)
//! - [`router`]: The facade that turns "no match" into a not-found error
//! - [`reverse`]: Building paths back from a handler and its parameters
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use waypoint_routing::descriptor::{ControllerDescriptor, RouteDefinition};
//! use waypoint_routing::handler::HandlerId;
//! use waypoint_routing::request::RouteRequest;
//! use waypoint_routing::urls::compiler::RouteCompiler;
//! use waypoint_routing::urls::route::Route;
//! use waypoint_routing::urls::router::Router;
//!
//! let articles = ControllerDescriptor::with_prefix(RouteDefinition::new("/articles"))
//!     .action(
//!         HandlerId::method("ArticleController", "year"),
//!         RouteDefinition::new("/{year}").pattern("year", "[0-9]{4}"),
//!     );
//! let table = RouteCompiler::new().compile(&[articles]).unwrap().table;
//!
//! // Reverse resolution
//! let params = HashMap::from([("year", "2024")]);
//! let url = table
//!     .url_for(&HandlerId::method("ArticleController", "year"), &params)
//!     .unwrap();
//! assert_eq!(url, "/articles/2024");
//!
//! // Forward resolution
//! let router = Router::new(vec![Route::table(table)]);
//! let resolution = router.resolve(&RouteRequest::get("/articles/2024")).unwrap();
//! assert_eq!(resolution.as_match().unwrap().param("year"), Some("2024"));
//! ```

pub mod compiler;
pub mod reverse;
pub mod route;
pub mod router;
pub mod table;
pub mod template;
