//! Controller descriptors: the declarative input to the route compiler.
//!
//! Descriptors are produced by whatever discovers controllers (attribute
//! readers, build scripts, hand-written files). The compiler only sees the
//! resolved data below and never inspects code.
//!
//! A descriptor file in TOML looks like:
//!
//! ```toml
//! [[controllers]]
//! prefix = { path = "/{tenant}", priority = 1 }
//!
//! [[controllers.actions]]
//! handler = { class = "UserController", method = "show" }
//! path = "/users/{id}"
//! methods = ["GET"]
//! patterns = { id = "[0-9]+" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use waypoint_core::{WaypointError, WaypointResult};

use crate::handler::HandlerId;

/// One declared route: a path template and its metadata.
///
/// Used both for a class-level prefix and for a method-level route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// The path template, e.g. `/users/{id}`.
    pub path: String,
    /// Regex fragments restricting individual placeholders.
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,
    /// Allowed HTTP methods. Empty means "use the compiler default".
    #[serde(default)]
    pub methods: Vec<String>,
    /// Explicit priority; higher is evaluated first.
    #[serde(default)]
    pub priority: Option<i32>,
}

impl RouteDefinition {
    /// Creates a definition for `path` with no patterns, methods, or priority.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Restricts placeholder `name` to the regex fragment `pattern`.
    #[must_use]
    pub fn pattern(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.patterns.insert(name.into(), pattern.into());
        self
    }

    /// Sets the allowed HTTP methods.
    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Sets an explicit priority.
    #[must_use]
    pub const fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// A method-level route bound to the handler it dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRoute {
    /// The handler to report when this route matches.
    pub handler: HandlerId,
    /// The route declared on the action.
    #[serde(flatten)]
    pub route: RouteDefinition,
}

impl ActionRoute {
    /// Binds a route definition to a handler.
    pub const fn new(handler: HandlerId, route: RouteDefinition) -> Self {
        Self { handler, route }
    }
}

/// Everything the compiler needs to know about one controller class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerDescriptor {
    /// Class-level route whose path prefixes every action route.
    #[serde(default)]
    pub prefix: Option<RouteDefinition>,
    /// Method-level routes, in declaration order.
    #[serde(default)]
    pub actions: Vec<ActionRoute>,
}

impl ControllerDescriptor {
    /// Creates a descriptor without a class-level prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a descriptor whose actions share a class-level prefix.
    pub fn with_prefix(prefix: RouteDefinition) -> Self {
        Self {
            prefix: Some(prefix),
            actions: Vec::new(),
        }
    }

    /// Appends an action route.
    #[must_use]
    pub fn action(mut self, handler: HandlerId, route: RouteDefinition) -> Self {
        self.actions.push(ActionRoute::new(handler, route));
        self
    }
}

/// A full set of controller descriptors, as loaded from a descriptor file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteManifest {
    /// Controllers in enumeration order.
    #[serde(default)]
    pub controllers: Vec<ControllerDescriptor>,
}

impl RouteManifest {
    /// Parses a manifest from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::SerializationError`] if the TOML is malformed.
    pub fn from_toml_str(s: &str) -> WaypointResult<Self> {
        toml::from_str(s).map_err(|e| {
            WaypointError::SerializationError(format!("Failed to parse descriptor TOML: {e}"))
        })
    }

    /// Parses a manifest from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::SerializationError`] if the JSON is malformed.
    pub fn from_json_str(s: &str) -> WaypointResult<Self> {
        serde_json::from_str(s).map_err(|e| {
            WaypointError::SerializationError(format!("Failed to parse descriptor JSON: {e}"))
        })
    }

    /// Reads a manifest file, choosing JSON for `.json` files and TOML otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> WaypointResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let def = RouteDefinition::new("/users/{id}")
            .pattern("id", "[0-9]+")
            .methods(["GET", "HEAD"])
            .priority(5);
        assert_eq!(def.path, "/users/{id}");
        assert_eq!(def.patterns.get("id").map(String::as_str), Some("[0-9]+"));
        assert_eq!(def.methods, vec!["GET", "HEAD"]);
        assert_eq!(def.priority, Some(5));
    }

    #[test]
    fn test_manifest_from_toml() {
        let toml = r#"
            [[controllers]]
            prefix = { path = "/{tenant}", priority = 2 }

            [[controllers.actions]]
            handler = { class = "UserController", method = "show" }
            path = "/users/{id}"
            methods = ["GET"]
            patterns = { id = "[0-9]+" }

            [[controllers.actions]]
            handler = "health"
            path = "/health"
        "#;

        let manifest = RouteManifest::from_toml_str(toml).unwrap();
        assert_eq!(manifest.controllers.len(), 1);
        let controller = &manifest.controllers[0];
        let prefix = controller.prefix.as_ref().unwrap();
        assert_eq!(prefix.path, "/{tenant}");
        assert_eq!(prefix.priority, Some(2));
        assert_eq!(controller.actions.len(), 2);
        assert_eq!(
            controller.actions[0].handler,
            HandlerId::method("UserController", "show")
        );
        assert_eq!(controller.actions[0].route.methods, vec!["GET"]);
        assert_eq!(controller.actions[1].handler, HandlerId::function("health"));
        assert!(controller.actions[1].route.patterns.is_empty());
        assert_eq!(controller.actions[1].route.priority, None);
    }

    #[test]
    fn test_manifest_from_json() {
        let json = r#"{
            "controllers": [
                { "actions": [ { "handler": "index", "path": "/" } ] }
            ]
        }"#;
        let manifest = RouteManifest::from_json_str(json).unwrap();
        assert!(manifest.controllers[0].prefix.is_none());
        assert_eq!(manifest.controllers[0].actions[0].route.path, "/");
    }

    #[test]
    fn test_manifest_empty() {
        let manifest = RouteManifest::from_toml_str("").unwrap();
        assert!(manifest.controllers.is_empty());
    }

    #[test]
    fn test_manifest_invalid() {
        let err = RouteManifest::from_toml_str("controllers = 3").unwrap_err();
        assert!(matches!(err, WaypointError::SerializationError(_)));
    }

    #[test]
    fn test_manifest_missing_file() {
        let err = RouteManifest::from_file("/nonexistent/routes.toml").unwrap_err();
        assert!(matches!(err, WaypointError::IoError(_)));
    }
}
