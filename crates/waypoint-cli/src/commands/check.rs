//! The `check` management command.
//!
//! Runs the system checks over the settings, then compiles the configured
//! descriptors so that route declaration errors surface before deployment.

use async_trait::async_trait;
use waypoint_core::checks::{CheckLevel, CheckMessage, CheckRegistry};
use waypoint_core::settings::RoutingSettings;
use waypoint_core::{Settings, WaypointError};
use waypoint_routing::urls::router::compile_descriptors;

use super::{descriptors_arg, routing_settings};
use crate::command::ManagementCommand;

/// Validates settings and route descriptors.
pub struct CheckCommand;

/// Runs the built-in checks, optionally filtered by tag, plus a descriptor compile.
pub fn run_checks(
    settings: &Settings,
    routing: &RoutingSettings,
    tags: Option<&[&str]>,
) -> Vec<CheckMessage> {
    let mut messages = CheckRegistry::with_builtins().run_checks(tags, settings);

    let wants_compile = tags.map_or(true, |t| t.contains(&"routing"));
    if wants_compile && routing.descriptors.is_some() {
        match compile_descriptors(routing) {
            Ok(table) => {
                tracing::debug!(routes = table.len(), "descriptors compiled cleanly");
            }
            Err(e) => {
                let mut message = CheckMessage::error(
                    "routing.E002",
                    format!("Route descriptors do not compile: {e}"),
                )
                .with_hint("Fix the route declaration named in the message");
                if let Some(path) = &routing.descriptors {
                    message = message.with_obj(path.display().to_string());
                }
                messages.push(message);
            }
        }
    }

    messages
}

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Run system checks and compile the route descriptors"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        descriptors_arg(cmd).arg(
            clap::Arg::new("tag")
                .long("tag")
                .short('t')
                .help("Only run checks with this tag")
                .num_args(1..),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), WaypointError> {
        let tags: Option<Vec<&str>> = matches
            .get_many::<String>("tag")
            .map(|values| values.map(String::as_str).collect());
        let routing = routing_settings(matches, settings);
        let messages = run_checks(settings, &routing, tags.as_deref());

        if messages.is_empty() {
            tracing::info!("System check identified no issues");
            return Ok(());
        }

        let errors = messages.iter().filter(|m| m.is_error()).count();
        let warnings = messages.iter().filter(|m| m.level == CheckLevel::Warning).count();

        for msg in &messages {
            tracing::warn!("{msg}");
        }

        tracing::info!(
            "System check identified {} issue(s) ({} error(s), {} warning(s))",
            messages.len(),
            errors,
            warnings
        );

        if errors > 0 {
            return Err(WaypointError::ConfigurationError(format!(
                "System check found {errors} error(s)"
            )));
        }

        Ok(())
    }
}
