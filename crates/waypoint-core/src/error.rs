//! Core error types for waypoint.
//!
//! [`WaypointError`] covers route compilation failures (which are fatal at
//! startup), request-time resolution signals, configuration errors, and
//! I/O or serialization failures from the loaders.

use thiserror::Error;

/// The primary error type for waypoint.
///
/// Compile-time variants describe programmer errors in route declarations and
/// abort compilation of the whole table. [`WaypointError::NotFound`] is the
/// only variant produced while serving a request.
#[derive(Error, Debug)]
pub enum WaypointError {
    // ── Route compilation ────────────────────────────────────────────

    /// A parameter pattern names a placeholder the template does not declare.
    #[error("Pattern for '{name}' does not match any parameter in '{template}'")]
    PatternWithoutParameter {
        /// The path template being compiled.
        template: String,
        /// The pattern key with no matching placeholder.
        name: String,
    },

    /// A parameter pattern contains a capturing group.
    #[error("Pattern for '{name}' must not contain capturing groups: {pattern}")]
    CapturingGroupInPattern {
        /// The parameter the pattern belongs to.
        name: String,
        /// The offending regex fragment.
        pattern: String,
    },

    /// A parameter pattern is not a valid regular expression.
    #[error("Invalid pattern for '{name}': {reason}")]
    InvalidPattern {
        /// The parameter the pattern belongs to.
        name: String,
        /// The regex engine's error message.
        reason: String,
    },

    /// A placeholder name is declared twice in one composed route.
    #[error("Duplicate parameter '{name}' in '{template}'")]
    DuplicateParameter {
        /// The full path template.
        template: String,
        /// The repeated placeholder name.
        name: String,
    },

    /// A path template cannot be parsed (unclosed brace, empty name, etc.).
    #[error("Malformed path template '{template}': {reason}")]
    MalformedTemplate {
        /// The path template being compiled.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A configured default HTTP method is not a string.
    #[error("Default method at index {index} must be a string, found {found}")]
    InvalidDefaultMethod {
        /// Position of the offending member.
        index: usize,
        /// The JSON type that was found instead.
        found: String,
    },

    /// An HTTP method name is not a valid method token.
    #[error("Invalid HTTP method '{0}'")]
    InvalidMethod(String),

    /// A compiled route does not have one capture group per parameter name.
    #[error("Compiled route '{expression}' has {groups} capture groups for {names} parameters")]
    BrokenInvariant {
        /// The regex source of the route.
        expression: String,
        /// Number of capturing groups in the expression.
        groups: usize,
        /// Number of parameter names recorded for the route.
        names: usize,
    },

    // ── Resolution ───────────────────────────────────────────────────

    /// No route matched the request.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A URL could not be generated for a handler.
    #[error("No reverse match: {0}")]
    NoReverseMatch(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl WaypointError {
    /// Returns the HTTP status code a dispatcher should answer with.
    ///
    /// - `NotFound`, `NoReverseMatch` -> 404
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::NoReverseMatch(_) => 404,
            Self::PatternWithoutParameter { .. }
            | Self::CapturingGroupInPattern { .. }
            | Self::InvalidPattern { .. }
            | Self::DuplicateParameter { .. }
            | Self::MalformedTemplate { .. }
            | Self::InvalidDefaultMethod { .. }
            | Self::InvalidMethod(_)
            | Self::BrokenInvariant { .. }
            | Self::ConfigurationError(_)
            | Self::SerializationError(_)
            | Self::IoError(_) => 500,
        }
    }

    /// Returns `true` for errors raised while compiling a route table.
    pub const fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::PatternWithoutParameter { .. }
                | Self::CapturingGroupInPattern { .. }
                | Self::InvalidPattern { .. }
                | Self::DuplicateParameter { .. }
                | Self::MalformedTemplate { .. }
                | Self::InvalidDefaultMethod { .. }
                | Self::InvalidMethod(_)
                | Self::BrokenInvariant { .. }
        )
    }
}

/// A convenience type alias for `Result<T, WaypointError>`.
pub type WaypointResult<T> = Result<T, WaypointError>;
