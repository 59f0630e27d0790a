//! The `list-routes` management command.
//!
//! Prints every compiled route sorted by path, then by method.

use async_trait::async_trait;
use waypoint_core::{Settings, WaypointError};
use waypoint_routing::RouteListing;

use super::{current_table, descriptors_arg};
use crate::command::ManagementCommand;

/// Lists the compiled routes.
pub struct ListRoutesCommand;

/// Renders listing rows as aligned `METHODS  PATH  HANDLER` lines.
pub fn render_listing(rows: &[RouteListing]) -> String {
    let labels: Vec<String> = rows.iter().map(RouteListing::methods_label).collect();
    let method_width = labels.iter().map(String::len).max().unwrap_or(0);
    let path_width = rows.iter().map(|r| r.path.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (row, label) in rows.iter().zip(&labels) {
        out.push_str(&format!(
            "{label:<method_width$}  {:<path_width$}  {}\n",
            row.path, row.handler
        ));
    }
    out
}

#[async_trait]
impl ManagementCommand for ListRoutesCommand {
    fn name(&self) -> &'static str {
        "list-routes"
    }

    fn help(&self) -> &'static str {
        "List compiled routes sorted by path and method"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        descriptors_arg(cmd).arg(
            clap::Arg::new("json")
                .long("json")
                .action(clap::ArgAction::SetTrue)
                .help("Print the listing as JSON"),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), WaypointError> {
        let rows = current_table(matches, settings)?.listing();

        if matches.get_flag("json") {
            let json = serde_json::to_string_pretty(&rows).map_err(|e| {
                WaypointError::SerializationError(format!("Failed to serialize listing: {e}"))
            })?;
            println!("{json}");
        } else if rows.is_empty() {
            tracing::info!("No routes compiled");
        } else {
            print!("{}", render_listing(&rows));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_routing::HandlerId;

    fn row(path: &str, methods: &[&str], handler: HandlerId) -> RouteListing {
        RouteListing {
            path: path.to_string(),
            methods: methods.iter().map(|m| (*m).to_string()).collect(),
            handler,
        }
    }

    #[test]
    fn test_render_listing_aligns_columns() {
        let rows = vec![
            row("/", &[], HandlerId::function("home")),
            row("/users/{id}", &["GET", "HEAD"], HandlerId::method("Users", "show")),
        ];
        let out = render_listing(&rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ANY       /            home");
        assert_eq!(lines[1], "GET|HEAD  /users/{id}  Users::show");
    }

    #[test]
    fn test_render_listing_empty() {
        assert!(render_listing(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_list_routes_without_descriptors() {
        let cmd = ListRoutesCommand;
        let matches = cmd
            .add_arguments(clap::Command::new("list-routes"))
            .try_get_matches_from(["list-routes"])
            .unwrap();
        assert!(cmd.handle(&matches, &Settings::default()).await.is_ok());
    }
}
