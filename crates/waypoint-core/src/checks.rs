//! System checks for routing settings.
//!
//! Checks inspect the loaded [`Settings`] for routing misconfigurations before
//! any route table is compiled. Each check is a plain function returning zero
//! or more [`CheckMessage`]s; a [`CheckRegistry`] runs them, optionally
//! restricted to a set of tags.
//!
//! Built-in checks:
//!
//! | id             | level   | condition                                        |
//! |----------------|---------|--------------------------------------------------|
//! | `routing.E001` | error   | a default method is not an HTTP token            |
//! | `routing.W001` | warning | no descriptor file is configured                 |
//! | `routing.W002` | warning | the convention route is enabled for every path   |
//!
//! ## Examples
//!
//! ```
//! use waypoint_core::checks::{CheckMessage, CheckRegistry};
//!
//! let mut registry = CheckRegistry::new();
//! registry.register(
//!     |_settings| vec![CheckMessage::warning("myapp.W001", "Custom check warning")],
//!     &["myapp"],
//! );
//!
//! let settings = waypoint_core::settings::Settings::default();
//! let messages = registry.run_checks(None, &settings);
//! assert_eq!(messages[0].id, "myapp.W001");
//! ```

use std::fmt;

use crate::settings::Settings;

/// Severity of a check message, in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckLevel {
    /// Informational.
    Info,
    /// Probably unintended, but routing still works.
    Warning,
    /// Routing will not behave as configured.
    Error,
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        })
    }
}

/// One finding reported by a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMessage {
    /// Severity.
    pub level: CheckLevel,
    /// Stable identifier such as `routing.W001`.
    pub id: String,
    /// What is wrong.
    pub msg: String,
    /// How to fix it.
    pub hint: Option<String>,
    /// The setting or file the finding is about.
    pub obj: Option<String>,
}

impl CheckMessage {
    /// Creates a message with no hint and no object.
    pub fn new(level: CheckLevel, id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
            msg: msg.into(),
            hint: None,
            obj: None,
        }
    }

    /// Shorthand for an [`CheckLevel::Info`] message.
    pub fn info(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(CheckLevel::Info, id, msg)
    }

    /// Shorthand for a [`CheckLevel::Warning`] message.
    pub fn warning(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(CheckLevel::Warning, id, msg)
    }

    /// Shorthand for an [`CheckLevel::Error`] message.
    pub fn error(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(CheckLevel::Error, id, msg)
    }

    /// Attaches a hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Attaches the object the finding is about.
    #[must_use]
    pub fn with_obj(mut self, obj: impl Into<String>) -> Self {
        self.obj = Some(obj.into());
        self
    }

    /// Returns `true` for errors, which should stop a deployment.
    pub fn is_error(&self) -> bool {
        self.level >= CheckLevel::Error
    }
}

impl fmt::Display for CheckMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {}: {}", self.id, self.level, self.msg)?;
        if let Some(obj) = &self.obj {
            write!(f, " [{obj}]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n\tHINT: {hint}")?;
        }
        Ok(())
    }
}

/// A check over the loaded settings.
pub type CheckFn = fn(&Settings) -> Vec<CheckMessage>;

/// An ordered collection of tagged checks.
#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<(CheckFn, Vec<String>)>,
}

impl CheckRegistry {
    /// Creates an empty registry.
    pub const fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Creates a registry holding the built-in routing checks.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(check_default_methods, &["routing"]);
        registry.register(check_descriptor_source, &["routing"]);
        registry.register(check_convention_guard, &["routing", "convention"]);
        registry
    }

    /// Adds a check under the given tags.
    pub fn register(&mut self, check: CheckFn, tags: &[&str]) {
        let tags = tags.iter().map(|t| (*t).to_string()).collect();
        self.checks.push((check, tags));
    }

    /// Runs every check, or only those sharing a tag with `tags`.
    pub fn run_checks(&self, tags: Option<&[&str]>, settings: &Settings) -> Vec<CheckMessage> {
        self.checks
            .iter()
            .filter(|(_, own)| tags.map_or(true, |wanted| own.iter().any(|t| wanted.contains(&t.as_str()))))
            .flat_map(|(check, _)| check(settings))
            .collect()
    }

    /// Returns the number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns `true` if no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// RFC 9110 `tchar`.
const fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '\'' | '*' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
}

fn check_default_methods(settings: &Settings) -> Vec<CheckMessage> {
    settings
        .routing
        .default_methods
        .iter()
        .filter(|m| m.is_empty() || !m.chars().all(is_token_char))
        .map(|m| {
            CheckMessage::error(
                "routing.E001",
                format!("Default method '{m}' is not a valid HTTP method token."),
            )
            .with_hint("Use method names such as GET, POST, or PUT.")
            .with_obj("routing.default_methods")
        })
        .collect()
}

fn check_descriptor_source(settings: &Settings) -> Vec<CheckMessage> {
    if settings.routing.descriptors.is_some() {
        return Vec::new();
    }
    vec![CheckMessage::warning(
        "routing.W001",
        "No controller descriptors are configured; the route table will be empty.",
    )
    .with_hint("Set routing.descriptors to a TOML or JSON descriptor file.")
    .with_obj("routing.descriptors")]
}

fn check_convention_guard(settings: &Settings) -> Vec<CheckMessage> {
    let convention = &settings.routing.convention;
    if !convention.enabled || !convention.prefixes.is_empty() {
        return Vec::new();
    }
    vec![
        CheckMessage::warning("routing.W002", "The convention route is enabled for every path.")
            .with_hint("Restrict it with routing.convention.prefixes.")
            .with_obj("routing.convention"),
    ]
}
