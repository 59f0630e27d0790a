//! Reading [`Settings`] from files and the environment.
//!
//! Values are layered: defaults, then the settings file (TOML, or JSON when
//! the file ends in `.json`), then `WAYPOINT_*` environment variables.
//!
//! | Variable                   | Setting                                    |
//! |----------------------------|--------------------------------------------|
//! | `WAYPOINT_DEBUG`           | `debug` (`true`, `1` or `yes`)             |
//! | `WAYPOINT_LOG_LEVEL`       | `log_level`                                |
//! | `WAYPOINT_DEFAULT_METHODS` | `routing.default_methods`, comma separated |
//! | `WAYPOINT_DESCRIPTORS`     | `routing.descriptors`                      |
//! | `WAYPOINT_ROUTE_CACHE`     | `routing.route_cache`                      |
//!
//! ```rust,no_run
//! use waypoint_core::settings_loader;
//!
//! let settings = settings_loader::from_file_with_env("config/waypoint.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::WaypointError;
use crate::settings::Settings;

/// Serialization format of a settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Toml,
    Json,
}

impl SettingsFormat {
    /// `.json` files are JSON; anything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        {
            Self::Json
        } else {
            Self::Toml
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }

    fn parse(self, text: &str) -> Result<serde_json::Value, WaypointError> {
        let parsed = match self {
            Self::Toml => toml::from_str::<toml::Value>(text)
                .map(toml_to_json)
                .map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|e| {
            WaypointError::ConfigurationError(format!("Failed to parse {}: {e}", self.label()))
        })
    }
}

/// Parses settings text, filling unspecified fields from the defaults.
///
/// # Errors
///
/// Malformed input, a non-list `routing.default_methods`, or one of its
/// members that is not a string.
pub fn from_str(text: &str, format: SettingsFormat) -> Result<Settings, WaypointError> {
    from_value(format.parse(text)?, format.label())
}

/// Reads a settings file without environment overrides.
pub fn from_file(path: impl AsRef<Path>) -> Result<Settings, WaypointError> {
    let path = path.as_ref();
    let format = SettingsFormat::from_path(path);
    let text = std::fs::read_to_string(path).map_err(|e| {
        WaypointError::ConfigurationError(format!(
            "Failed to read {} file '{}': {e}",
            format.label(),
            path.display()
        ))
    })?;
    from_str(&text, format)
}

/// Reads a settings file, then applies environment overrides.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, WaypointError> {
    let mut settings = from_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Defaults plus environment overrides, for runs without a settings file.
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Overwrites settings from any `WAYPOINT_*` variables that are set.
pub fn apply_env_overrides(settings: &mut Settings) {
    let var = |name: &str| std::env::var(name).ok();

    if let Some(val) = var("WAYPOINT_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }
    if let Some(val) = var("WAYPOINT_LOG_LEVEL") {
        settings.log_level = val;
    }
    if let Some(val) = var("WAYPOINT_DEFAULT_METHODS") {
        settings.routing.default_methods = val
            .split(',')
            .map(|m| m.trim().to_uppercase())
            .filter(|m| !m.is_empty())
            .collect();
    }
    if let Some(val) = var("WAYPOINT_DESCRIPTORS") {
        settings.routing.descriptors = Some(PathBuf::from(val));
    }
    if let Some(val) = var("WAYPOINT_ROUTE_CACHE") {
        settings.routing.route_cache = Some(PathBuf::from(val));
    }
}

/// Rejects a `routing.default_methods` that is not a list of strings.
///
/// Runs on the raw value so the error can name the offending position.
///
/// # Errors
///
/// [`WaypointError::InvalidDefaultMethod`] for the first non-string member,
/// [`WaypointError::ConfigurationError`] when the setting is not a list.
pub fn validate_default_methods(value: &serde_json::Value) -> Result<(), WaypointError> {
    let Some(methods) = value.pointer("/routing/default_methods") else {
        return Ok(());
    };
    let Some(members) = methods.as_array() else {
        return Err(WaypointError::ConfigurationError(format!(
            "routing.default_methods must be a list, found {}",
            json_type_name(methods)
        )));
    };
    match members.iter().position(|m| !m.is_string()) {
        Some(index) => Err(WaypointError::InvalidDefaultMethod {
            index,
            found: json_type_name(&members[index]).to_string(),
        }),
        None => Ok(()),
    }
}

// ============================================================
// Helpers
// ============================================================

fn from_value(value: serde_json::Value, format: &str) -> Result<Settings, WaypointError> {
    validate_default_methods(&value)?;

    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        WaypointError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        WaypointError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
