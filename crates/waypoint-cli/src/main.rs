//! The `waypoint` management utility.
//!
//! ```text
//! waypoint --settings waypoint.toml list-routes
//! waypoint resolve GET /acme/users/42 --descriptors routes.toml
//! waypoint compile --output routes.json
//! waypoint check
//! ```
//!
//! Without `--settings`, settings come from the defaults plus `WAYPOINT_*`
//! environment variables.

use std::path::PathBuf;
use std::process::ExitCode;

use waypoint_cli::command::{CommandRegistry, SETTINGS_ARG};
use waypoint_cli::commands::register_builtin_commands;
use waypoint_core::logging::setup_logging;
use waypoint_core::settings_loader;
use waypoint_core::{Settings, WaypointError, SETTINGS};

fn load_settings(matches: &clap::ArgMatches) -> Result<Settings, WaypointError> {
    match matches.get_one::<String>(SETTINGS_ARG) {
        Some(path) => settings_loader::from_file_with_env(PathBuf::from(path)),
        None => Ok(settings_loader::from_env()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry);

    let matches = registry.build_cli().get_matches();

    let settings = match load_settings(&matches) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("waypoint: {e}");
            return ExitCode::FAILURE;
        }
    };
    SETTINGS.configure(settings);
    let settings = SETTINGS.get();
    setup_logging(settings);

    match registry.execute(&matches, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, status = e.status_code(), "command failed");
            eprintln!("waypoint: {e}");
            ExitCode::FAILURE
        }
    }
}
