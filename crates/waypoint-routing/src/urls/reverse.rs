//! Reverse routing.
//!
//! This module provides [`url_for`] for building a path that the table would
//! resolve back to a given handler.

use std::collections::HashMap;
use std::hash::BuildHasher;

use http::Method;
use waypoint_core::{WaypointError, WaypointResult};

use crate::handler::HandlerId;
use crate::request::RouteRequest;

use super::table::{CompiledRoute, RouteTable};
use super::template::{parse_template, TemplateSegment};

/// Builds a path for `handler` by filling in its route template.
///
/// Routes for the handler are tried in table order. A route is a candidate
/// when `params` supplies exactly its parameter names, no more and no fewer.
/// The filled-in path is then matched against the whole table, as a request
/// with the route's first allowed method (or `GET`) would be. It is accepted
/// only when that match lands on the same route and binds exactly `params`.
/// This rejects values that violate a pattern, paths shadowed by an earlier
/// route, values that split differently between adjacent placeholders, and
/// values the request view would truncate.
///
/// # Errors
///
/// Returns [`WaypointError::NoReverseMatch`] if no route for the handler
/// accepts the parameters.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use waypoint_routing::descriptor::{ControllerDescriptor, RouteDefinition};
/// use waypoint_routing::handler::HandlerId;
/// use waypoint_routing::urls::compiler::RouteCompiler;
/// use waypoint_routing::urls::reverse::url_for;
///
/// let show = HandlerId::method("Posts", "show");
/// let table = RouteCompiler::new()
///     .compile(&[ControllerDescriptor::new().action(
///         show.clone(),
///         RouteDefinition::new("/posts/{id}").pattern("id", "[0-9]+"),
///     )])
///     .unwrap()
///     .table;
///
/// let params = HashMap::from([("id", "7")]);
/// assert_eq!(url_for(&table, &show, &params).unwrap(), "/posts/7");
///
/// let params = HashMap::from([("id", "seven")]);
/// assert!(url_for(&table, &show, &params).is_err());
/// ```
pub fn url_for<S: BuildHasher>(
    table: &RouteTable,
    handler: &HandlerId,
    params: &HashMap<&str, &str, S>,
) -> WaypointResult<String> {
    let mut seen = false;
    for route in table.routes().iter().filter(|r| r.handler() == handler) {
        seen = true;
        let Some(url) = fill(route, params)? else {
            continue;
        };
        if resolves_back(table, route, &url, params) {
            return Ok(url);
        }
    }

    Err(WaypointError::NoReverseMatch(if seen {
        format!("No route for '{handler}' accepts the given parameters")
    } else {
        format!("No route for '{handler}'")
    }))
}

fn fill<S: BuildHasher>(
    route: &CompiledRoute,
    params: &HashMap<&str, &str, S>,
) -> WaypointResult<Option<String>> {
    let names = route.parameter_names();
    if names.len() != params.len() || !names.iter().all(|n| params.contains_key(n.as_str())) {
        return Ok(None);
    }

    let mut url = String::new();
    for segment in parse_template(route.template())? {
        match segment {
            TemplateSegment::Literal(text) => url.push_str(text),
            TemplateSegment::Placeholder(name) => match params.get(name) {
                Some(value) => url.push_str(value),
                None => return Ok(None),
            },
        }
    }

    Ok(Some(url))
}

/// Returns `true` if `url`, requested with a method `route` allows, is
/// dispatched to `route` with exactly `params`.
fn resolves_back<S: BuildHasher>(
    table: &RouteTable,
    route: &CompiledRoute,
    url: &str,
    params: &HashMap<&str, &str, S>,
) -> bool {
    let method = route.methods().first().cloned().unwrap_or(Method::GET);
    let request = RouteRequest::new(method, url);

    let winner = table
        .routes()
        .iter()
        .filter(|r| r.allows(request.method()))
        .find_map(|r| r.match_path(request.path()).map(|bound| (r, bound)));

    let Some((winner, bound)) = winner else {
        tracing::trace!(template = route.template(), url, "reversed path does not resolve");
        return false;
    };
    if !std::ptr::eq(winner, route) {
        tracing::trace!(
            template = route.template(),
            shadowed_by = winner.template(),
            url,
            "reversed path is claimed by an earlier route"
        );
        return false;
    }

    let same = bound.len() == params.len()
        && bound
            .iter()
            .all(|(name, value)| params.get(name.as_str()) == Some(&value.as_str()));
    if !same {
        tracing::trace!(template = route.template(), url, "reversed path binds different values");
    }
    same
}
