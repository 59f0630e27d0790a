//! Settings system for waypoint.
//!
//! This module provides the [`Settings`] struct, which holds all routing
//! configuration, and [`LazySettings`], a globally-accessible, lazily-initialized
//! settings instance.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Configuration for the convention-based fallback route.
///
/// The convention route maps `/<namespace..>/<controller>/<action>` onto a
/// handler without any declared route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConventionSettings {
    /// Whether the convention route is appended after the compiled table.
    pub enabled: bool,
    /// Namespace prepended to every derived controller class.
    pub namespace: String,
    /// Suffix appended to the derived controller class name.
    pub controller_suffix: String,
    /// Suffix appended to the derived action method name.
    pub action_suffix: String,
    /// Literal path prefixes the convention route is restricted to (empty = all paths).
    pub prefixes: Vec<String>,
}

impl Default for ConventionSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            namespace: String::new(),
            controller_suffix: String::new(),
            action_suffix: "Action".to_string(),
            prefixes: Vec::new(),
        }
    }
}

/// Routing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingSettings {
    /// Methods used by actions that declare none. Empty means any method.
    pub default_methods: Vec<String>,
    /// File holding the controller descriptors (TOML or JSON).
    pub descriptors: Option<PathBuf>,
    /// File the compiled route table is persisted to and reloaded from.
    pub route_cache: Option<PathBuf>,
    /// The convention-based fallback route.
    pub convention: ConventionSettings,
}

/// The complete set of waypoint settings.
///
/// Use [`SETTINGS`] to access the global instance.
///
/// # Examples
///
/// ```
/// use waypoint_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert!(settings.routing.default_methods.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,

    // ── Routing ──────────────────────────────────────────────────────

    /// Route compilation and matching configuration.
    pub routing: RoutingSettings,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            routing: RoutingSettings::default(),
            log_level: "info".to_string(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
///
/// # Panics
///
/// [`get`](LazySettings::get) panics if settings have not been configured.
/// [`configure`](LazySettings::configure) panics if called more than once.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert!(s.routing.default_methods.is_empty());
        assert!(s.routing.descriptors.is_none());
        assert!(s.routing.route_cache.is_none());
        assert!(s.extra.is_empty());
    }

    #[test]
    fn test_default_convention() {
        let c = ConventionSettings::default();
        assert!(!c.enabled);
        assert_eq!(c.action_suffix, "Action");
        assert!(c.controller_suffix.is_empty());
        assert!(c.namespace.is_empty());
        assert!(c.prefixes.is_empty());
    }

    #[test]
    fn test_settings_serialize_roundtrip() {
        let mut s = Settings::default();
        s.routing.default_methods = vec!["GET".into(), "HEAD".into()];
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.routing, s.routing);
    }

    #[test]
    fn test_lazy_settings_unconfigured() {
        let lazy = LazySettings::new();
        assert!(!lazy.is_configured());
    }

    #[test]
    fn test_lazy_settings_configure() {
        let lazy = LazySettings::new();
        lazy.configure(Settings::default());
        assert!(lazy.is_configured());
        assert_eq!(lazy.get().log_level, "info");
    }

    #[test]
    #[should_panic(expected = "Settings have already been configured")]
    fn test_lazy_settings_configure_twice() {
        let lazy = LazySettings::new();
        lazy.configure(Settings::default());
        lazy.configure(Settings::default());
    }
}
