//! The route compiler.
//!
//! [`RouteCompiler::compile`] turns controller descriptors into a
//! [`RouteTable`]. Each class prefix is compiled once and fused with every
//! action route of that class into one flat, anchored expression. The
//! resulting routes are stably sorted by descending priority, so routes with
//! equal priority keep their declaration order.
//!
//! Any error aborts the whole compilation; a partially compiled table is
//! never returned.

use http::Method;

use waypoint_core::settings::RoutingSettings;
use waypoint_core::{WaypointError, WaypointResult};

use crate::descriptor::{ActionRoute, ControllerDescriptor, RouteDefinition};
use crate::request::parse_method;

use super::table::{CompiledRoute, RouteListing, RouteParts, RouteTable};
use super::template::{compile_template, CompiledTemplate};

/// The output of a compilation run.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    /// The dispatch table, in evaluation order.
    pub table: RouteTable,
    /// Introspection rows sorted by path, then methods.
    pub listing: Vec<RouteListing>,
}

/// Compiles controller descriptors into a route table.
///
/// # Examples
///
/// ```
/// use waypoint_routing::descriptor::{ControllerDescriptor, RouteDefinition};
/// use waypoint_routing::handler::HandlerId;
/// use waypoint_routing::request::RouteRequest;
/// use waypoint_routing::urls::compiler::RouteCompiler;
///
/// let users = ControllerDescriptor::with_prefix(RouteDefinition::new("/users"))
///     .action(
///         HandlerId::method("UserController", "show"),
///         RouteDefinition::new("/{id}").pattern("id", "[0-9]+").methods(["GET"]),
///     );
///
/// let table = RouteCompiler::new().compile(&[users]).unwrap().table;
/// let m = table.match_request(&RouteRequest::get("/users/42")).unwrap();
/// assert_eq!(m.params["id"], "42");
/// assert!(table.match_request(&RouteRequest::get("/users/abc")).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteCompiler {
    default_methods: Vec<Method>,
}

impl RouteCompiler {
    /// Creates a compiler whose actions accept any method unless they say otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compiler with a default method set for actions that declare none.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::InvalidMethod`] if a name is not a valid method.
    pub fn with_default_methods<I, S>(methods: I) -> WaypointResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let default_methods = methods
            .into_iter()
            .map(|m| parse_method(m.as_ref()))
            .collect::<WaypointResult<Vec<_>>>()?;
        Ok(Self { default_methods })
    }

    /// Creates a compiler from untyped configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::InvalidDefaultMethod`] if a member is not a
    /// string, or [`WaypointError::InvalidMethod`] if it is not a valid method.
    pub fn from_method_values(values: &[serde_json::Value]) -> WaypointResult<Self> {
        let names = values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                value.as_str().ok_or_else(|| WaypointError::InvalidDefaultMethod {
                    index,
                    found: json_type_name(value).to_string(),
                })
            })
            .collect::<WaypointResult<Vec<_>>>()?;
        Self::with_default_methods(names)
    }

    /// Creates a compiler from the routing settings.
    ///
    /// # Errors
    ///
    /// Returns [`WaypointError::InvalidMethod`] if a default method is invalid.
    pub fn from_settings(settings: &RoutingSettings) -> WaypointResult<Self> {
        Self::with_default_methods(&settings.default_methods)
    }

    /// Returns the default method set. Empty means any method.
    pub fn default_methods(&self) -> &[Method] {
        &self.default_methods
    }

    /// Compiles every action of every descriptor into one table.
    ///
    /// # Errors
    ///
    /// Returns the first template, pattern, method, or invariant error
    /// encountered. Nothing is returned for the descriptors compiled so far.
    pub fn compile(&self, descriptors: &[ControllerDescriptor]) -> WaypointResult<Compilation> {
        let mut routes: Vec<CompiledRoute> = Vec::new();
        let mut listing: Vec<RouteListing> = Vec::new();

        for descriptor in descriptors {
            let prefix = descriptor
                .prefix
                .as_ref()
                .map(|p| compile_template(&p.path, &p.patterns))
                .transpose()?;

            for action in &descriptor.actions {
                let route = self.compile_action(descriptor.prefix.as_ref(), prefix.as_ref(), action)?;
                tracing::debug!(
                    template = route.template(),
                    expression = route.expression(),
                    handler = %route.handler(),
                    "compiled route"
                );
                listing.push(RouteListing::for_route(&route));
                routes.push(route);
            }
        }

        // Vec::sort_by_key is stable: equal priorities keep declaration order.
        routes.sort_by_key(|r| std::cmp::Reverse(r.priority()));
        RouteListing::sort(&mut listing);

        tracing::info!(
            controllers = descriptors.len(),
            routes = routes.len(),
            "route table compiled"
        );

        Ok(Compilation {
            table: RouteTable::new(routes),
            listing,
        })
    }

    fn compile_action(
        &self,
        prefix_def: Option<&RouteDefinition>,
        prefix: Option<&CompiledTemplate>,
        action: &ActionRoute,
    ) -> WaypointResult<CompiledRoute> {
        let own = compile_template(&action.route.path, &action.route.patterns)?;

        let template = format!(
            "{}{}",
            prefix_def.map_or("", |p| p.path.as_str()),
            action.route.path
        );

        let class_parameters = prefix.map(|p| p.names.clone()).unwrap_or_default();
        if let Some(name) = own.names.iter().find(|n| class_parameters.contains(*n)) {
            return Err(WaypointError::DuplicateParameter {
                template,
                name: name.clone(),
            });
        }

        let methods = if action.route.methods.is_empty() {
            self.default_methods.clone()
        } else {
            action
                .route
                .methods
                .iter()
                .map(|m| parse_method(m))
                .collect::<WaypointResult<Vec<_>>>()?
        };

        let priority = action
            .route
            .priority
            .or_else(|| prefix_def.and_then(|p| p.priority))
            .unwrap_or(0);

        let expression = format!(
            "^{}{}$",
            prefix.map_or("", |p| p.fragment.as_str()),
            own.fragment
        );

        CompiledRoute::new(RouteParts {
            expression,
            methods,
            priority,
            handler: action.handler.clone(),
            class_parameters,
            method_parameters: own.names,
            template,
        })
    }
}

const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
