//! Built-in management commands.
//!
//! Each command implements the
//! [`ManagementCommand`](crate::command::ManagementCommand) trait.

pub mod check;
pub mod compile;
pub mod list_routes;
pub mod resolve;

pub use check::CheckCommand;
pub use compile::CompileCommand;
pub use list_routes::ListRoutesCommand;
pub use resolve::ResolveCommand;

use std::path::PathBuf;

use waypoint_core::settings::RoutingSettings;
use waypoint_core::{Settings, WaypointResult};
use waypoint_routing::urls::router::compile_descriptors;
use waypoint_routing::RouteTable;

use crate::command::CommandRegistry;

/// Name of the per-command option that overrides the descriptor file.
pub const DESCRIPTORS_ARG: &str = "descriptors";

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(ListRoutesCommand));
    registry.register(Box::new(ResolveCommand));
    registry.register(Box::new(CompileCommand));
    registry.register(Box::new(CheckCommand));
}

/// Adds the `--descriptors <FILE>` option to a command.
pub fn descriptors_arg(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        clap::Arg::new(DESCRIPTORS_ARG)
            .long(DESCRIPTORS_ARG)
            .short('d')
            .value_name("FILE")
            .value_parser(clap::value_parser!(PathBuf))
            .help("Descriptor file to compile instead of the configured one"),
    )
}

/// Returns the routing settings with any `--descriptors` override applied.
pub fn routing_settings(matches: &clap::ArgMatches, settings: &Settings) -> RoutingSettings {
    let mut routing = settings.routing.clone();
    if let Some(path) = matches.get_one::<PathBuf>(DESCRIPTORS_ARG) {
        routing.descriptors = Some(path.clone());
    }
    routing
}

/// Returns the table the application would serve, without writing anything.
///
/// An explicit `--descriptors` file is always compiled. Otherwise a persisted
/// table is preferred over compiling the configured descriptors.
pub fn current_table(matches: &clap::ArgMatches, settings: &Settings) -> WaypointResult<RouteTable> {
    let routing = routing_settings(matches, settings);
    let overridden = matches.get_one::<PathBuf>(DESCRIPTORS_ARG).is_some();
    match routing.route_cache.as_deref() {
        Some(cache) if !overridden && cache.exists() => RouteTable::load(cache),
        _ => compile_descriptors(&routing),
    }
}
