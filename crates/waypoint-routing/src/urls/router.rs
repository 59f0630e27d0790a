//! The router facade handed to a dispatcher.
//!
//! A [`Router`] owns an ordered list of [`Route`]s and turns "nothing
//! matched" into [`WaypointError::NotFound`]. It is immutable once built
//! and can be shared across threads.

use std::path::Path;
use std::sync::Arc;

use waypoint_core::logging::request_span;
use waypoint_core::settings::RoutingSettings;
use waypoint_core::{WaypointError, WaypointResult};

use crate::descriptor::RouteManifest;
use crate::request::RouteRequest;

use super::compiler::RouteCompiler;
use super::route::{ConventionRoute, Resolution, Route};
use super::table::RouteTable;

/// Resolves requests against an ordered chain of routes.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates a router that tries `routes` in order.
    pub const fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Builds the standard chain for a compiled table.
    ///
    /// The table comes first. If the convention route is enabled it is
    /// appended, wrapped in a prefix guard when prefixes are configured.
    pub fn from_table_and_settings(table: RouteTable, settings: &RoutingSettings) -> Self {
        let mut routes = vec![Route::table(table)];
        let convention = &settings.convention;
        if convention.enabled {
            let route = Route::Convention(ConventionRoute::from_settings(convention));
            if convention.prefixes.is_empty() {
                routes.push(route);
            } else {
                routes.push(Route::prefixed(convention.prefixes.iter().cloned(), route));
            }
        }
        Self::new(routes)
    }

    /// Builds a router from the routing settings.
    ///
    /// A persisted table at `route_cache` is reused when present. Otherwise
    /// the descriptor file is compiled and, if `route_cache` is set, the
    /// result is written there.
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptors cannot be loaded or compiled, or
    /// if the cache cannot be read or written.
    pub fn from_settings(settings: &RoutingSettings) -> WaypointResult<Self> {
        let table = load_or_compile(settings)?;
        Ok(Self::from_table_and_settings(table, settings))
    }

    /// Returns the routes in evaluation order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Appends a route after the existing ones.
    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Resolves a request to a handler or a redirect.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::NotFound`] if no route matches.
    pub fn resolve(&self, request: &RouteRequest) -> WaypointResult<Resolution> {
        let span = request_span(request.method().as_str(), request.path());
        let _guard = span.enter();

        if let Some(resolution) = self.routes.iter().find_map(|r| r.match_request(request)) {
            tracing::debug!(?resolution, "request resolved");
            return Ok(resolution);
        }

        tracing::debug!("no route matched");
        Err(WaypointError::NotFound(format!(
            "No route matches {} '{}'",
            request.method(),
            request.path()
        )))
    }

    /// Wraps the router for sharing between request handlers.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// Loads the persisted table, or compiles the configured descriptors.
///
/// # Errors
///
/// Returns an error if loading, compiling, or saving fails.
pub fn load_or_compile(settings: &RoutingSettings) -> WaypointResult<RouteTable> {
    if let Some(cache) = settings.route_cache.as_deref() {
        if cache.exists() {
            tracing::info!(path = %cache.display(), "loading persisted route table");
            return RouteTable::load(cache);
        }
    }

    let table = compile_descriptors(settings)?;
    if let Some(cache) = settings.route_cache.as_deref() {
        table.save(cache)?;
    }
    Ok(table)
}

/// Compiles the descriptor file named in the settings.
///
/// With no descriptor file configured the table is empty.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or compiled.
pub fn compile_descriptors(settings: &RoutingSettings) -> WaypointResult<RouteTable> {
    let compiler = RouteCompiler::from_settings(settings)?;
    let manifest = match settings.descriptors.as_deref() {
        Some(path) => load_manifest(path)?,
        None => {
            tracing::warn!("no descriptor file configured, route table is empty");
            RouteManifest::default()
        }
    };
    Ok(compiler.compile(&manifest.controllers)?.table)
}

fn load_manifest(path: &Path) -> WaypointResult<RouteManifest> {
    tracing::debug!(path = %path.display(), "loading descriptors");
    RouteManifest::from_file(path)
}
