//! Route variants sharing one matching contract.
//!
//! Every [`Route`] answers [`Route::match_request`] with either a
//! [`Resolution`] or `None`. `None` always means "try the next candidate";
//! it is never an error. Configuration problems are reported when routes
//! are built, not when they are matched.

use std::collections::HashMap;
use std::sync::Arc;

use waypoint_core::settings::ConventionSettings;
use waypoint_core::utils::text::{dash_to_camel, dash_to_pascal, is_identifier_segment};

use crate::handler::HandlerId;
use crate::request::RouteRequest;

use super::table::RouteTable;

/// A successful match: the handler to run and the captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The handler to dispatch to.
    pub handler: HandlerId,
    /// Raw captured text keyed by parameter name.
    pub params: HashMap<String, String>,
    /// The template of the compiled route that matched, if any.
    pub route: Option<String>,
}

impl Match {
    /// Creates a match with no parameters and no originating template.
    pub fn new(handler: HandlerId) -> Self {
        Self {
            handler,
            params: HashMap::new(),
            route: None,
        }
    }

    /// Returns the captured value for `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// What a route decided for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Dispatch to a handler.
    Handler(Match),
    /// Answer with a redirect to the canonical location.
    Redirect {
        /// The path to redirect to.
        location: String,
    },
}

impl Resolution {
    /// Returns the match, if this resolution dispatches to a handler.
    pub const fn as_match(&self) -> Option<&Match> {
        match self {
            Self::Handler(m) => Some(m),
            Self::Redirect { .. } => None,
        }
    }

    /// Returns the redirect target, if this resolution is a redirect.
    pub fn redirect_location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location } => Some(location),
            Self::Handler(_) => None,
        }
    }
}

/// Derives handlers from the path by convention.
///
/// The last segment names the action, the one before it the controller,
/// and any remaining segments the namespace. Dashed segments are
/// camel-cased: `/admin/blog/show-post` maps to class `Admin::Blog` and
/// method `showPostAction` with the default suffixes.
///
/// A single-segment path redirects to `/<segment>/index`. A path that spells
/// out a trailing `index` does not match, since its canonical form omits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionRoute {
    namespace: String,
    controller_suffix: String,
    action_suffix: String,
}

impl Default for ConventionRoute {
    fn default() -> Self {
        Self::from_settings(&ConventionSettings::default())
    }
}

impl ConventionRoute {
    /// Creates a convention route from its settings.
    pub fn from_settings(settings: &ConventionSettings) -> Self {
        Self {
            namespace: settings.namespace.clone(),
            controller_suffix: settings.controller_suffix.clone(),
            action_suffix: settings.action_suffix.clone(),
        }
    }

    /// Applies the convention to a request path.
    ///
    /// A single segment redirects to `/<segment>/index`, which this route
    /// itself declines. The redirect target must be served by another route
    /// placed before or after it in the chain.
    pub fn match_path(&self, path: &str) -> Option<Resolution> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if !segments.iter().all(|s| is_identifier_segment(s)) {
            return None;
        }

        let (action, rest) = match segments.split_last() {
            None => return None,
            Some((only, [])) => {
                let location = format!("/{only}/index");
                tracing::debug!(path, location = %location, "redirecting to canonical action");
                return Some(Resolution::Redirect { location });
            }
            Some((action, rest)) => (*action, rest),
        };

        if action == "index" {
            return None;
        }

        let Some((controller, namespace)) = rest.split_last() else {
            return None;
        };

        let mut class_parts: Vec<String> = Vec::with_capacity(namespace.len() + 2);
        if !self.namespace.is_empty() {
            class_parts.push(self.namespace.clone());
        }
        class_parts.extend(namespace.iter().map(|s| dash_to_pascal(s)));
        class_parts.push(format!("{}{}", dash_to_pascal(controller), self.controller_suffix));

        let handler = HandlerId::method(
            class_parts.join("::"),
            format!("{}{}", dash_to_camel(action), self.action_suffix),
        );
        Some(Resolution::Handler(Match::new(handler)))
    }
}

/// A route candidate.
///
/// The set of route kinds is closed; callers compose them (for example a
/// table wrapped in a prefix guard) without caring which kind they hold.
#[derive(Debug, Clone)]
pub enum Route {
    /// A compiled table of declared routes.
    Table(Arc<RouteTable>),
    /// Delegates to `inner` only for paths starting with one of `prefixes`.
    PrefixGuard {
        /// Literal path prefixes.
        prefixes: Vec<String>,
        /// The guarded route.
        inner: Box<Route>,
    },
    /// Always resolves to the same pre-built resolution.
    CatchAll(Resolution),
    /// Derives the handler from the path.
    Convention(ConventionRoute),
    /// Tries each route in order and returns the first resolution.
    Chain(Vec<Route>),
}

impl Route {
    /// Wraps a compiled table.
    pub fn table(table: RouteTable) -> Self {
        Self::Table(Arc::new(table))
    }

    /// Guards `inner` with a set of literal path prefixes.
    pub fn prefixed<I, S>(prefixes: I, inner: Self) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::PrefixGuard {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            inner: Box::new(inner),
        }
    }

    /// A fallback that always dispatches to `handler`.
    pub fn catch_all(handler: HandlerId) -> Self {
        Self::CatchAll(Resolution::Handler(Match::new(handler)))
    }

    /// Matches the request against this route.
    pub fn match_request(&self, request: &RouteRequest) -> Option<Resolution> {
        match self {
            Self::Table(table) => table.match_request(request).map(Resolution::Handler),
            Self::PrefixGuard { prefixes, inner } => {
                if prefixes.iter().any(|p| request.path().starts_with(p.as_str())) {
                    inner.match_request(request)
                } else {
                    None
                }
            }
            Self::CatchAll(resolution) => Some(resolution.clone()),
            Self::Convention(convention) => convention.match_path(request.path()),
            Self::Chain(routes) => routes.iter().find_map(|r| r.match_request(request)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ControllerDescriptor, RouteDefinition};
    use crate::urls::compiler::RouteCompiler;

    fn convention() -> ConventionRoute {
        ConventionRoute::default()
    }

    fn handler_of(resolution: Option<Resolution>) -> HandlerId {
        resolution
            .and_then(|r| r.as_match().map(|m| m.handler.clone()))
            .expect("expected a handler match")
    }

    // ── Convention route ────────────────────────────────────────────

    #[test]
    fn test_convention_single_segment_redirects() {
        let r = convention().match_path("/blog").unwrap();
        assert_eq!(r.redirect_location(), Some("/blog/index"));
        let r = convention().match_path("/blog/").unwrap();
        assert_eq!(r.redirect_location(), Some("/blog/index"));
    }

    #[test]
    fn test_convention_explicit_index_declines() {
        assert!(convention().match_path("/blog/index").is_none());
        assert!(convention().match_path("/admin/blog/index").is_none());
    }

    #[test]
    fn test_convention_resolves_controller_and_action() {
        let h = handler_of(convention().match_path("/blog/show-post"));
        assert_eq!(h, HandlerId::method("Blog", "showPostAction"));
    }

    #[test]
    fn test_convention_namespace_segments() {
        let h = handler_of(convention().match_path("/admin/user-tools/blog/list-all"));
        assert_eq!(h, HandlerId::method("Admin::UserTools::Blog", "listAllAction"));
    }

    #[test]
    fn test_convention_configured_names() {
        let route = ConventionRoute::from_settings(&ConventionSettings {
            enabled: true,
            namespace: "app::controllers".into(),
            controller_suffix: "Controller".into(),
            action_suffix: String::new(),
            prefixes: Vec::new(),
        });
        let h = handler_of(route.match_path("/blog/show-post"));
        assert_eq!(
            h,
            HandlerId::method("app::controllers::BlogController", "showPost")
        );
    }

    #[test]
    fn test_convention_root_and_invalid_segments_decline() {
        assert!(convention().match_path("/").is_none());
        assert!(convention().match_path("").is_none());
        assert!(convention().match_path("/blog/show.post").is_none());
        assert!(convention().match_path("/blog/42").is_none());
    }

    // ── Variants ────────────────────────────────────────────────────

    #[test]
    fn test_prefix_guard_declines_without_evaluating_inner() {
        let guarded = Route::prefixed(["/api/"], Route::catch_all(HandlerId::function("api")));
        assert!(guarded.match_request(&RouteRequest::get("/web/x")).is_none());
        let h = handler_of(guarded.match_request(&RouteRequest::get("/api/x")));
        assert_eq!(h, HandlerId::function("api"));
    }

    #[test]
    fn test_prefix_guard_any_of_several() {
        let guarded = Route::prefixed(
            ["/legacy/", "/old/"],
            Route::catch_all(HandlerId::function("legacy")),
        );
        assert!(guarded.match_request(&RouteRequest::get("/old/page")).is_some());
        assert!(guarded.match_request(&RouteRequest::get("/legacy/page")).is_some());
        assert!(guarded.match_request(&RouteRequest::get("/new/page")).is_none());
    }

    #[test]
    fn test_catch_all_always_matches() {
        let route = Route::catch_all(HandlerId::function("fallback"));
        for path in ["/", "/anything/at/all", ""] {
            let h = handler_of(route.match_request(&RouteRequest::post(path)));
            assert_eq!(h, HandlerId::function("fallback"));
        }
    }

    #[test]
    fn test_chain_order() {
        let table = RouteCompiler::new()
            .compile(&[ControllerDescriptor::new()
                .action(HandlerId::function("about"), RouteDefinition::new("/about"))])
            .unwrap()
            .table;
        let chain = Route::Chain(vec![
            Route::table(table),
            Route::prefixed(["/legacy/"], Route::Convention(ConventionRoute::default())),
            Route::catch_all(HandlerId::function("not_found_page")),
        ]);

        let h = handler_of(chain.match_request(&RouteRequest::get("/about")));
        assert_eq!(h, HandlerId::function("about"));

        let h = handler_of(chain.match_request(&RouteRequest::get("/legacy/shop/cart")));
        assert_eq!(h, HandlerId::method("Legacy::Shop", "cartAction"));

        let h = handler_of(chain.match_request(&RouteRequest::get("/elsewhere")));
        assert_eq!(h, HandlerId::function("not_found_page"));
    }

    #[test]
    fn test_chain_redirect_stops_scan() {
        let chain = Route::Chain(vec![
            Route::Convention(ConventionRoute::default()),
            Route::catch_all(HandlerId::function("fallback")),
        ]);
        let r = chain.match_request(&RouteRequest::get("/shop")).unwrap();
        assert_eq!(r.redirect_location(), Some("/shop/index"));
    }

    #[test]
    fn test_convention_redirect_target_served_by_table() {
        let convention_only = Route::Convention(ConventionRoute::default());
        let r = convention_only.match_request(&RouteRequest::get("/blog")).unwrap();
        let location = r.redirect_location().unwrap().to_string();
        assert!(convention_only.match_request(&RouteRequest::get(location.as_str())).is_none());

        let table = RouteCompiler::new()
            .compile(&[ControllerDescriptor::new()
                .action(HandlerId::method("Blog", "indexAction"), RouteDefinition::new("/{controller}/index"))])
            .unwrap()
            .table;
        let chain = Route::Chain(vec![Route::table(table), convention_only]);
        let h = handler_of(chain.match_request(&RouteRequest::get(location.as_str())));
        assert_eq!(h, HandlerId::method("Blog", "indexAction"));
    }

    #[test]
    fn test_empty_chain_declines() {
        assert!(Route::Chain(Vec::new())
            .match_request(&RouteRequest::get("/"))
            .is_none());
    }
}
