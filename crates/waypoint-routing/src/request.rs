//! The request view the matcher works on.

use http::Method;

use waypoint_core::{WaypointError, WaypointResult};

/// The parts of an incoming request that routing looks at.
///
/// Only the HTTP method and the path are consulted; the query string is not
/// part of the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    method: Method,
    path: String,
}

impl RouteRequest {
    /// Creates a request view from a method and a path.
    ///
    /// Anything after a `?` in `path` is dropped.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if let Some(pos) = path.find('?') {
            path.truncate(pos);
        }
        Self { method, path }
    }

    /// Shorthand for a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Builds a request view from a method name.
    ///
    /// The name is uppercased before parsing.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::InvalidMethod`] if `method` is not a valid token.
    pub fn parse(method: &str, path: impl Into<String>) -> WaypointResult<Self> {
        let method = parse_method(method)?;
        Ok(Self::new(method, path))
    }

    /// Returns the HTTP method.
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Parses and uppercases an HTTP method name.
///
/// # Errors
///
/// Returns [`WaypointError::InvalidMethod`] if `name` is not a valid token.
pub fn parse_method(name: &str) -> WaypointResult<Method> {
    Method::from_bytes(name.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| WaypointError::InvalidMethod(name.to_string()))
}
