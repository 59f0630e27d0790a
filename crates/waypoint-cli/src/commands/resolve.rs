//! The `resolve` management command.
//!
//! Shows which handler a request would reach, using the same route chain
//! the application serves with.

use async_trait::async_trait;
use waypoint_core::{Settings, WaypointError};
use waypoint_routing::{Resolution, RouteRequest, Router};

use super::{current_table, descriptors_arg, routing_settings};
use crate::command::ManagementCommand;

/// Resolves a method and path against the routes.
pub struct ResolveCommand;

/// Describes a resolution in one line, with parameters sorted by name.
pub fn describe(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Handler(m) => {
            let mut params: Vec<_> = m.params.iter().collect();
            params.sort();
            let params: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
            let route = m.route.as_deref().unwrap_or("-");
            if params.is_empty() {
                format!("{} (route {route})", m.handler)
            } else {
                format!("{} (route {route}) {}", m.handler, params.join(" "))
            }
        }
        Resolution::Redirect { location } => format!("redirect to {location}"),
    }
}

#[async_trait]
impl ManagementCommand for ResolveCommand {
    fn name(&self) -> &'static str {
        "resolve"
    }

    fn help(&self) -> &'static str {
        "Show which handler a request reaches"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        descriptors_arg(cmd)
            .arg(
                clap::Arg::new("method")
                    .required(true)
                    .value_name("METHOD")
                    .help("HTTP method, e.g. GET"),
            )
            .arg(
                clap::Arg::new("path")
                    .required(true)
                    .value_name("PATH")
                    .help("Request path, e.g. /users/42"),
            )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), WaypointError> {
        let method = matches
            .get_one::<String>("method")
            .map_or("GET", String::as_str);
        let path = matches.get_one::<String>("path").map_or("/", String::as_str);
        let request = RouteRequest::parse(method, path)?;

        let table = current_table(matches, settings)?;
        let router = Router::from_table_and_settings(table, &routing_settings(matches, settings));
        let resolution = router.resolve(&request)?;

        println!("{} {} -> {}", request.method(), request.path(), describe(&resolution));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use waypoint_routing::{HandlerId, Match};

    fn parse(args: &[&str]) -> clap::ArgMatches {
        ResolveCommand
            .add_arguments(clap::Command::new("resolve"))
            .try_get_matches_from(args)
            .unwrap()
    }

    #[test]
    fn test_describe_handler() {
        let resolution = Resolution::Handler(Match {
            handler: HandlerId::method("Users", "show"),
            params: HashMap::from([
                ("tenant".to_string(), "acme".to_string()),
                ("id".to_string(), "42".to_string()),
            ]),
            route: Some("/{tenant}/users/{id}".to_string()),
        });
        assert_eq!(
            describe(&resolution),
            "Users::show (route /{tenant}/users/{id}) id=42 tenant=acme"
        );
    }

    #[test]
    fn test_describe_redirect() {
        let resolution = Resolution::Redirect {
            location: "/blog/index".to_string(),
        };
        assert_eq!(describe(&resolution), "redirect to /blog/index");
    }

    #[test]
    fn test_describe_convention_match() {
        let resolution = Resolution::Handler(Match::new(HandlerId::method("Blog", "showPostAction")));
        assert_eq!(describe(&resolution), "Blog::showPostAction (route -)");
    }

    #[test]
    fn test_method_and_path_are_required() {
        let result = ResolveCommand
            .add_arguments(clap::Command::new("resolve"))
            .try_get_matches_from(["resolve", "GET"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_resolve_found() {
        let dir = tempfile::tempdir().unwrap();
        let descriptors = dir.path().join("routes.toml");
        std::fs::write(
            &descriptors,
            "[[controllers]]\n[[controllers.actions]]\nhandler = \"home\"\npath = \"/\"\nmethods = [\"GET\"]\n",
        )
        .unwrap();
        let d = descriptors.to_str().unwrap();

        let found = parse(&["resolve", "--descriptors", d, "get", "/"]);
        assert!(ResolveCommand.handle(&found, &Settings::default()).await.is_ok());

        let wrong_method = parse(&["resolve", "--descriptors", d, "POST", "/"]);
        let err = ResolveCommand
            .handle(&wrong_method, &Settings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WaypointError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_invalid_method() {
        let matches = parse(&["resolve", "G ET", "/"]);
        let err = ResolveCommand
            .handle(&matches, &Settings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WaypointError::InvalidMethod(_)));
    }

    #[tokio::test]
    async fn test_resolve_through_convention() {
        let mut settings = Settings::default();
        settings.routing.convention.enabled = true;
        let matches = parse(&["resolve", "GET", "/blog/show-post"]);
        assert!(ResolveCommand.handle(&matches, &settings).await.is_ok());
    }
}
