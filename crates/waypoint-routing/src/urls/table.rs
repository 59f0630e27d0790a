//! Compiled routes and the route table the matcher scans.
//!
//! A [`CompiledRoute`] holds an anchored regex whose capturing groups line up
//! one-to-one with its parameter names. Group `i + 1` binds name `i`; the
//! regex itself carries no names. [`CompiledRoute::new`] refuses to build a
//! route that breaks this alignment, so every route in a [`RouteTable`]
//! upholds it whether it came from the compiler or from a persisted file.

use std::collections::HashMap;
use std::fmt;
use std::hash::BuildHasher;
use std::path::Path;

use http::Method;
use regex::Regex;
use serde::{Deserialize, Serialize};

use waypoint_core::{WaypointError, WaypointResult};

use crate::handler::HandlerId;
use crate::request::{parse_method, RouteRequest};

use super::reverse;
use super::route::Match;

/// Format version written into persisted tables.
pub const TABLE_FORMAT_VERSION: u32 = 1;

/// One flat, fully-composed route: class prefix and action path fused.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "CompiledRouteRepr", into = "CompiledRouteRepr")]
pub struct CompiledRoute {
    regex: Regex,
    methods: Vec<Method>,
    priority: i32,
    handler: HandlerId,
    /// Class names first, then method names.
    parameters: Vec<String>,
    class_parameter_count: usize,
    template: String,
}

impl fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("expression", &self.regex.as_str())
            .field("methods", &self.methods)
            .field("priority", &self.priority)
            .field("handler", &self.handler)
            .field("parameters", &self.parameters)
            .field("template", &self.template)
            .finish()
    }
}

/// The parts a [`CompiledRoute`] is assembled from.
#[derive(Debug, Clone)]
pub struct RouteParts {
    /// Anchored regex source.
    pub expression: String,
    /// Allowed methods; empty means any.
    pub methods: Vec<Method>,
    /// Resolved priority.
    pub priority: i32,
    /// Handler reported on match.
    pub handler: HandlerId,
    /// Parameter names contributed by the class prefix.
    pub class_parameters: Vec<String>,
    /// Parameter names contributed by the action path.
    pub method_parameters: Vec<String>,
    /// Full path template (prefix followed by action path).
    pub template: String,
}

impl CompiledRoute {
    /// Builds a compiled route, checking the capture-group invariant.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::InvalidPattern`] if the expression does not
    /// compile, or [`WaypointError::BrokenInvariant`] if its capturing groups
    /// do not line up with the parameter names.
    pub fn new(parts: RouteParts) -> WaypointResult<Self> {
        let regex = Regex::new(&parts.expression).map_err(|e| WaypointError::InvalidPattern {
            name: parts.template.clone(),
            reason: e.to_string(),
        })?;

        let class_parameter_count = parts.class_parameters.len();
        let mut parameters = parts.class_parameters;
        parameters.extend(parts.method_parameters);

        let groups = regex.captures_len() - 1;
        if groups != parameters.len() {
            return Err(WaypointError::BrokenInvariant {
                expression: parts.expression,
                groups,
                names: parameters.len(),
            });
        }

        Ok(Self {
            regex,
            methods: parts.methods,
            priority: parts.priority,
            handler: parts.handler,
            parameters,
            class_parameter_count,
            template: parts.template,
        })
    }

    /// Returns the anchored regex source.
    pub fn expression(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the compiled regex.
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the allowed methods. Empty means any method.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the resolved priority.
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns the handler this route dispatches to.
    pub const fn handler(&self) -> &HandlerId {
        &self.handler
    }

    /// Returns all parameter names in capture-group order.
    pub fn parameter_names(&self) -> &[String] {
        &self.parameters
    }

    /// Returns the parameter names contributed by the class prefix.
    pub fn class_parameter_names(&self) -> &[String] {
        &self.parameters[..self.class_parameter_count]
    }

    /// Returns the parameter names contributed by the action path.
    pub fn method_parameter_names(&self) -> &[String] {
        &self.parameters[self.class_parameter_count..]
    }

    /// Returns the full path template.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the number of capturing groups in the expression.
    pub fn capture_group_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Returns `true` if this route accepts `method`.
    pub fn allows(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    /// Matches `path` against the expression and binds the captured groups.
    ///
    /// Returns the raw captured text keyed by parameter name, or `None` if
    /// the path does not match.
    pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(path)?;
        Some(
            self.parameters
                .iter()
                .enumerate()
                .map(|(index, name)| {
                    let value = captures.get(index + 1).map_or("", |m| m.as_str());
                    (name.clone(), value.to_string())
                })
                .collect(),
        )
    }
}

#[derive(Serialize, Deserialize)]
struct CompiledRouteRepr {
    expression: String,
    #[serde(default)]
    methods: Vec<String>,
    #[serde(default)]
    priority: i32,
    handler: HandlerId,
    #[serde(default)]
    class_parameters: Vec<String>,
    #[serde(default)]
    method_parameters: Vec<String>,
    template: String,
}

impl TryFrom<CompiledRouteRepr> for CompiledRoute {
    type Error = WaypointError;

    fn try_from(repr: CompiledRouteRepr) -> Result<Self, Self::Error> {
        // An unanchored expression would match any path containing it.
        if !repr.expression.starts_with('^') || !repr.expression.ends_with('$') {
            return Err(WaypointError::InvalidPattern {
                name: repr.template,
                reason: format!("expression '{}' is not anchored with ^ and $", repr.expression),
            });
        }
        let methods = repr
            .methods
            .iter()
            .map(|m| parse_method(m))
            .collect::<WaypointResult<Vec<_>>>()?;
        Self::new(RouteParts {
            expression: repr.expression,
            methods,
            priority: repr.priority,
            handler: repr.handler,
            class_parameters: repr.class_parameters,
            method_parameters: repr.method_parameters,
            template: repr.template,
        })
    }
}

impl From<CompiledRoute> for CompiledRouteRepr {
    fn from(route: CompiledRoute) -> Self {
        Self {
            expression: route.regex.as_str().to_string(),
            methods: route.methods.iter().map(ToString::to_string).collect(),
            priority: route.priority,
            handler: route.handler,
            class_parameters: route.parameters[..route.class_parameter_count].to_vec(),
            method_parameters: route.parameters[route.class_parameter_count..].to_vec(),
            template: route.template,
        }
    }
}

/// An introspection row: one compiled route as shown by `list-routes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteListing {
    /// The full path template.
    pub path: String,
    /// Allowed methods; empty means any.
    pub methods: Vec<String>,
    /// The handler the route dispatches to.
    pub handler: HandlerId,
}

impl RouteListing {
    /// Builds the row for a compiled route.
    pub fn for_route(route: &CompiledRoute) -> Self {
        Self {
            path: route.template.clone(),
            methods: route.methods.iter().map(ToString::to_string).collect(),
            handler: route.handler.clone(),
        }
    }

    /// Returns the methods joined for display, or `ANY` if unrestricted.
    pub fn methods_label(&self) -> String {
        if self.methods.is_empty() {
            "ANY".to_string()
        } else {
            self.methods.join("|")
        }
    }

    /// Sorts rows by path, then by method list.
    pub fn sort(rows: &mut [Self]) {
        rows.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.methods_label().cmp(&b.methods_label()))
        });
    }
}

/// The ordered, immutable dispatch table.
///
/// Routes are evaluated in table order; the first route whose expression
/// matches the path and whose methods allow the request method wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteTable {
    version: u32,
    routes: Vec<CompiledRoute>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RouteTable {
    /// Wraps routes that are already in evaluation order.
    pub const fn new(routes: Vec<CompiledRoute>) -> Self {
        Self {
            version: TABLE_FORMAT_VERSION,
            routes,
        }
    }

    /// Returns the routes in evaluation order.
    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    /// Returns the number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the first route matching the request.
    ///
    /// A route whose path matches but whose methods exclude the request
    /// method is skipped, so a later route for the same path can still match.
    pub fn match_request(&self, request: &RouteRequest) -> Option<Match> {
        for route in &self.routes {
            let Some(params) = route.match_path(request.path()) else {
                continue;
            };
            if !route.allows(request.method()) {
                tracing::trace!(
                    template = route.template(),
                    method = %request.method(),
                    "path matched but method not allowed, continuing"
                );
                continue;
            }
            tracing::debug!(
                template = route.template(),
                handler = %route.handler(),
                "route matched"
            );
            return Some(Match {
                handler: route.handler.clone(),
                params,
                route: Some(route.template.clone()),
            });
        }
        None
    }

    /// Returns the sorted introspection rows for this table.
    pub fn listing(&self) -> Vec<RouteListing> {
        let mut rows: Vec<RouteListing> = self.routes.iter().map(RouteListing::for_route).collect();
        RouteListing::sort(&mut rows);
        rows
    }

    /// Builds a URL that resolves to `handler` with the given parameters.
    ///
    /// See [`reverse::url_for`].
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::NoReverseMatch`] if no route for the handler
    /// can be filled in with `params`.
    pub fn url_for<S: BuildHasher>(
        &self,
        handler: &HandlerId,
        params: &HashMap<&str, &str, S>,
    ) -> WaypointResult<String> {
        reverse::url_for(self, handler, params)
    }

    /// Serializes the table to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::SerializationError`] if serialization fails.
    pub fn to_json(&self) -> WaypointResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| WaypointError::SerializationError(format!("Failed to serialize route table: {e}")))
    }

    /// Loads a table from JSON, re-checking every route's invariant.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::SerializationError`] if the JSON is malformed,
    /// a route is corrupt, or the format version is unknown.
    pub fn from_json(json: &str) -> WaypointResult<Self> {
        let table: Self = serde_json::from_str(json)
            .map_err(|e| WaypointError::SerializationError(format!("Failed to load route table: {e}")))?;
        if table.version != TABLE_FORMAT_VERSION {
            return Err(WaypointError::SerializationError(format!(
                "Unsupported route table version {} (expected {TABLE_FORMAT_VERSION})",
                table.version
            )));
        }
        Ok(table)
    }

    /// Writes the table to `path` as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> WaypointResult<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json)?;
        tracing::info!(path = %path.as_ref().display(), routes = self.len(), "route table saved");
        Ok(())
    }

    /// Reads a table previously written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid table.
    pub fn load(path: impl AsRef<Path>) -> WaypointResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(expression: &str, methods: &[Method], handler: &str, names: &[&str]) -> CompiledRoute {
        CompiledRoute::new(RouteParts {
            expression: expression.to_string(),
            methods: methods.to_vec(),
            priority: 0,
            handler: HandlerId::function(handler),
            class_parameters: Vec::new(),
            method_parameters: names.iter().map(|n| (*n).to_string()).collect(),
            template: expression.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_new_checks_invariant() {
        let err = CompiledRoute::new(RouteParts {
            expression: "^/a/([^/]+)$".into(),
            methods: Vec::new(),
            priority: 0,
            handler: HandlerId::function("h"),
            class_parameters: Vec::new(),
            method_parameters: Vec::new(),
            template: "/a/{x}".into(),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            WaypointError::BrokenInvariant { groups: 1, names: 0, .. }
        ));
    }

    #[test]
    fn test_new_invalid_expression() {
        let err = CompiledRoute::new(RouteParts {
            expression: "^/a/(".into(),
            methods: Vec::new(),
            priority: 0,
            handler: HandlerId::function("h"),
            class_parameters: Vec::new(),
            method_parameters: Vec::new(),
            template: "/a/(".into(),
        })
        .unwrap_err();
        assert!(matches!(err, WaypointError::InvalidPattern { .. }));
    }

    #[test]
    fn test_class_and_method_parameter_split() {
        let r = CompiledRoute::new(RouteParts {
            expression: "^/([^/]+)/users/([^/]+)$".into(),
            methods: Vec::new(),
            priority: 0,
            handler: HandlerId::function("h"),
            class_parameters: vec!["tenant".into()],
            method_parameters: vec!["id".into()],
            template: "/{tenant}/users/{id}".into(),
        })
        .unwrap();
        assert_eq!(r.class_parameter_names(), ["tenant"]);
        assert_eq!(r.method_parameter_names(), ["id"]);
        assert_eq!(r.parameter_names(), ["tenant", "id"]);
        assert_eq!(r.capture_group_count(), 2);
    }

    #[test]
    fn test_match_path_binds_by_position() {
        let r = route("^/([^/]+)/([^/]+)$", &[], "h", &["second", "first"]);
        let params = r.match_path("/x/y").unwrap();
        assert_eq!(params["second"], "x");
        assert_eq!(params["first"], "y");
        assert!(r.match_path("/x").is_none());
    }

    #[test]
    fn test_allows() {
        let any = route("^/$", &[], "h", &[]);
        assert!(any.allows(&Method::DELETE));
        let get = route("^/$", &[Method::GET], "h", &[]);
        assert!(get.allows(&Method::GET));
        assert!(!get.allows(&Method::POST));
    }

    #[test]
    fn test_match_request_method_is_soft() {
        let table = RouteTable::new(vec![
            route("^/a$", &[Method::GET], "get_a", &[]),
            route("^/a$", &[], "any_a", &[]),
        ]);
        let m = table.match_request(&RouteRequest::post("/a")).unwrap();
        assert_eq!(m.handler, HandlerId::function("any_a"));
        let m = table.match_request(&RouteRequest::get("/a")).unwrap();
        assert_eq!(m.handler, HandlerId::function("get_a"));
    }

    #[test]
    fn test_match_request_none() {
        let table = RouteTable::new(vec![route("^/a$", &[], "a", &[])]);
        assert!(table.match_request(&RouteRequest::get("/b")).is_none());
        assert!(RouteTable::default()
            .match_request(&RouteRequest::get("/"))
            .is_none());
    }

    #[test]
    fn test_listing_sorted() {
        let table = RouteTable::new(vec![
            route("^/b$", &[], "b", &[]),
            route("^/a$", &[Method::POST], "a_post", &[]),
            route("^/a$", &[Method::GET], "a_get", &[]),
        ]);
        let rows = table.listing();
        let labels: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r.path.clone(), r.methods_label()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("^/a$".to_string(), "GET".to_string()),
                ("^/a$".to_string(), "POST".to_string()),
                ("^/b$".to_string(), "ANY".to_string()),
            ]
        );
    }

    #[test]
    fn test_json_persistence_reloads_identically() {
        let table = RouteTable::new(vec![
            route("^/u/([0-9]+)$", &[Method::GET, Method::HEAD], "user", &["id"]),
            route("^/health$", &[], "health", &[]),
        ]);
        let json = table.to_json().unwrap();
        let reloaded = RouteTable::from_json(&json).unwrap();
        assert_eq!(reloaded.len(), 2);
        for (a, b) in table.routes().iter().zip(reloaded.routes()) {
            assert_eq!(a.expression(), b.expression());
            assert_eq!(a.methods(), b.methods());
            assert_eq!(a.handler(), b.handler());
            assert_eq!(a.parameter_names(), b.parameter_names());
        }
        let m = reloaded.match_request(&RouteRequest::get("/u/7")).unwrap();
        assert_eq!(m.params["id"], "7");
    }

    #[test]
    fn test_from_json_rejects_corrupt_route() {
        let json = r#"{
            "version": 1,
            "routes": [{
                "expression": "^/a/([^/]+)/([^/]+)$",
                "handler": "h",
                "method_parameters": ["only_one"],
                "template": "/a/{x}/{y}"
            }]
        }"#;
        let err = RouteTable::from_json(json).unwrap_err();
        assert!(matches!(err, WaypointError::SerializationError(_)));
    }

    #[test]
    fn test_from_json_rejects_unanchored_expression() {
        for expression in ["/a", "^/a", "/a$"] {
            let json = format!(
                r#"{{ "version": 1, "routes": [{{
                    "expression": "{expression}",
                    "handler": "h",
                    "template": "/a"
                }}] }}"#
            );
            let err = RouteTable::from_json(&json).unwrap_err();
            assert!(err.to_string().contains("not anchored"), "{expression}: {err}");
        }
    }

    #[test]
    fn test_from_json_rejects_unknown_version() {
        let err = RouteTable::from_json(r#"{ "version": 99, "routes": [] }"#).unwrap_err();
        assert!(err.to_string().contains("version 99"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.json");
        let table = RouteTable::new(vec![route("^/x$", &[Method::PUT], "x", &[])]);
        table.save(&path).unwrap();
        let loaded = RouteTable::load(&path).unwrap();
        assert_eq!(loaded.routes()[0].methods(), [Method::PUT]);
    }
}
