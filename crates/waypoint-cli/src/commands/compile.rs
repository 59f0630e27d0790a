//! The `compile` management command.
//!
//! Compiles the descriptors and writes the route table as JSON, either to
//! `--output`, to the configured route cache, or to stdout.

use std::path::PathBuf;

use async_trait::async_trait;
use waypoint_core::{Settings, WaypointError};
use waypoint_routing::urls::router::compile_descriptors;

use super::{descriptors_arg, routing_settings};
use crate::command::ManagementCommand;

/// Compiles descriptors into a persisted route table.
pub struct CompileCommand;

#[async_trait]
impl ManagementCommand for CompileCommand {
    fn name(&self) -> &'static str {
        "compile"
    }

    fn help(&self) -> &'static str {
        "Compile descriptors and write the route table"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        descriptors_arg(cmd)
            .arg(
                clap::Arg::new("output")
                    .long("output")
                    .short('o')
                    .value_name("FILE")
                    .value_parser(clap::value_parser!(PathBuf))
                    .help("Where to write the table (defaults to routing.route_cache)"),
            )
            .arg(
                clap::Arg::new("stdout")
                    .long("stdout")
                    .action(clap::ArgAction::SetTrue)
                    .conflicts_with("output")
                    .help("Print the table instead of writing it"),
            )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), WaypointError> {
        let routing = routing_settings(matches, settings);
        let table = compile_descriptors(&routing)?;

        let target = if matches.get_flag("stdout") {
            None
        } else {
            matches
                .get_one::<PathBuf>("output")
                .cloned()
                .or(routing.route_cache)
        };

        match target {
            Some(path) => {
                table.save(&path)?;
                tracing::info!(
                    "Compiled {} route(s) into {}",
                    table.len(),
                    path.display()
                );
            }
            None => println!("{}", table.to_json()?),
        }

        Ok(())
    }
}
