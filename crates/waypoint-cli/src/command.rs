//! Subcommand plumbing for the `waypoint` binary.
//!
//! Every subcommand implements [`ManagementCommand`]. A [`CommandRegistry`]
//! owns them, turns them into a clap command tree, and dispatches the parsed
//! matches to the right handler.
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use waypoint_cli::command::ManagementCommand;
//! use waypoint_core::{Settings, WaypointError};
//!
//! struct CountCommand;
//!
//! #[async_trait]
//! impl ManagementCommand for CountCommand {
//!     fn name(&self) -> &'static str { "count-routes" }
//!     fn help(&self) -> &'static str { "Print the number of compiled routes" }
//!
//!     async fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         settings: &Settings,
//!     ) -> Result<(), WaypointError> {
//!         let table = waypoint_routing::urls::router::load_or_compile(&settings.routing)?;
//!         println!("{}", table.len());
//!         Ok(())
//!     }
//! }
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use waypoint_core::{Settings, WaypointError};

/// Id of the global `--settings <FILE>` option.
pub const SETTINGS_ARG: &str = "settings";

/// One `waypoint` subcommand.
#[async_trait]
pub trait ManagementCommand: Send + Sync {
    /// The subcommand name typed on the command line.
    fn name(&self) -> &'static str;

    /// One-line description shown in `--help`.
    fn help(&self) -> &'static str;

    /// Declares the subcommand's own arguments. Adds none by default.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Runs the subcommand against its parsed arguments.
    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), WaypointError>;
}

/// Subcommands keyed by name, kept in name order.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Box<dyn ManagementCommand>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subcommand, replacing any earlier one of the same name.
    pub fn register(&mut self, command: Box<dyn ManagementCommand>) {
        self.commands.insert(command.name(), command);
    }

    pub fn get(&self, name: &str) -> Option<&dyn ManagementCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Registered names in alphabetical order.
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the clap tree: one subcommand per registration plus the global
    /// `--settings` option.
    pub fn build_cli(&self) -> clap::Command {
        let root = clap::Command::new("waypoint")
            .about("waypoint route compiler and inspector")
            .subcommand_required(true)
            .arg(
                clap::Arg::new(SETTINGS_ARG)
                    .long(SETTINGS_ARG)
                    .short('s')
                    .global(true)
                    .value_name("FILE")
                    .help("Settings file (TOML, or JSON with a .json extension)"),
            );

        self.commands.values().fold(root, |root, command| {
            let sub = clap::Command::new(command.name()).about(command.help());
            root.subcommand(command.add_arguments(sub))
        })
    }

    /// Dispatches the parsed matches to the selected subcommand.
    ///
    /// # Errors
    ///
    /// [`WaypointError::ConfigurationError`] when the matches carry no
    /// registered subcommand; otherwise whatever the subcommand returns.
    pub async fn execute(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
    ) -> Result<(), WaypointError> {
        let Some((name, sub_matches)) = matches.subcommand() else {
            return Err(WaypointError::ConfigurationError(
                "No subcommand specified".to_string(),
            ));
        };
        let command = self.get(name).ok_or_else(|| {
            WaypointError::ConfigurationError(format!("Unknown command: {name}"))
        })?;

        tracing::debug!(command = name, "running management command");
        command.handle(sub_matches, settings).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Counts its invocations; `broken` fails when given `--json`.
    struct Recorder {
        name: &'static str,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ManagementCommand for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn help(&self) -> &'static str {
            "records calls"
        }

        fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
            cmd.arg(clap::Arg::new("json").long("json").action(clap::ArgAction::SetTrue))
        }

        async fn handle(
            &self,
            matches: &clap::ArgMatches,
            _settings: &Settings,
        ) -> Result<(), WaypointError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.name == "broken" && matches.get_flag("json") {
                return Err(WaypointError::ConfigurationError("recorder failed".into()));
            }
            Ok(())
        }
    }

    fn registry(names: &[&'static str]) -> (CommandRegistry, Vec<Arc<AtomicUsize>>) {
        let mut registry = CommandRegistry::new();
        let mut counters = Vec::new();
        for &name in names {
            let calls = Arc::new(AtomicUsize::new(0));
            counters.push(Arc::clone(&calls));
            registry.register(Box::new(Recorder { name, calls }));
        }
        (registry, counters)
    }

    #[test]
    fn test_names_are_sorted_and_deduplicated() {
        let (registry, _) = registry(&["resolve", "check", "list-routes", "check"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.list_commands(), ["check", "list-routes", "resolve"]);
        assert!(registry.get("compile").is_none());
        assert!(CommandRegistry::new().is_empty());
    }

    #[test]
    fn test_subcommand_arguments_are_wired() {
        let (registry, _) = registry(&["list-routes"]);
        let matches = registry
            .build_cli()
            .try_get_matches_from(["waypoint", "list-routes", "--json"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "list-routes");
        assert!(sub.get_flag("json"));
    }

    #[test]
    fn test_settings_is_global() {
        let (registry, _) = registry(&["check"]);
        let matches = registry
            .build_cli()
            .try_get_matches_from(["waypoint", "-s", "waypoint.toml", "check"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>(SETTINGS_ARG).map(String::as_str),
            Some("waypoint.toml")
        );
    }

    #[test]
    fn test_subcommand_is_required() {
        let (registry, _) = registry(&["check"]);
        assert!(registry.build_cli().try_get_matches_from(["waypoint"]).is_err());
    }

    #[tokio::test]
    async fn test_execute_dispatches_by_name() {
        let (registry, counters) = registry(&["check", "compile"]);
        let matches = registry
            .build_cli()
            .try_get_matches_from(["waypoint", "compile"])
            .unwrap();
        registry.execute(&matches, &Settings::default()).await.unwrap();

        assert_eq!(counters[0].load(Ordering::SeqCst), 0);
        assert_eq!(counters[1].load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_propagates_failure() {
        let (registry, _) = registry(&["broken"]);
        let matches = registry
            .build_cli()
            .try_get_matches_from(["waypoint", "broken", "--json"])
            .unwrap();
        let result = registry.execute(&matches, &Settings::default()).await;
        assert!(matches!(result, Err(WaypointError::ConfigurationError(_))));
    }

    #[tokio::test]
    async fn test_execute_without_subcommand() {
        let (registry, _) = registry(&["check"]);
        let matches = clap::Command::new("waypoint").get_matches_from(["waypoint"]);
        let result = registry.execute(&matches, &Settings::default()).await;
        assert!(matches!(result, Err(WaypointError::ConfigurationError(_))));
    }
}
