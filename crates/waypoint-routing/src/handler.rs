//! Handler identifiers.
//!
//! A [`HandlerId`] names the code a matched route should run. The routing
//! layer never invokes it; it only carries it from the descriptor to the
//! [`Match`](crate::urls::route::Match) handed back to the dispatcher.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque reference to a controller action or a bare function.
///
/// In descriptor files a method handler is written as a table
/// (`{ class = "UserController", method = "show" }`) and a function handler
/// as a plain string (`"health_check"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandlerId {
    /// A method on a controller class.
    Method {
        /// The fully-qualified controller class.
        class: String,
        /// The action method name.
        method: String,
    },
    /// A free-standing function.
    Function(String),
}

impl HandlerId {
    /// Creates a handler that points at `class::method`.
    pub fn method(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Method {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Creates a handler that points at a bare function.
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(name.into())
    }

    /// Returns the controller class, if this is a method handler.
    pub fn class(&self) -> Option<&str> {
        match self {
            Self::Method { class, .. } => Some(class),
            Self::Function(_) => None,
        }
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method { class, method } => write!(f, "{class}::{method}"),
            Self::Function(name) => write!(f, "{name}"),
        }
    }
}
