//! Path template translation.
//!
//! A path template such as `/users/{id}/posts/{slug}` is translated into a
//! regex fragment with one capturing group per placeholder, plus the list of
//! placeholder names in the order their groups appear. Literal text is
//! escaped so that `.`, `+`, and friends match themselves.
//!
//! Fragments are unanchored: the compiler concatenates a class fragment and a
//! method fragment and anchors the result once.

use std::collections::BTreeMap;

use regex::Regex;

use waypoint_core::{WaypointError, WaypointResult};

/// Fragment used for placeholders without an explicit pattern.
pub const DEFAULT_PARAMETER_PATTERN: &str = "[^/]+";

/// The regex form of one path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    /// Unanchored regex source.
    pub fragment: String,
    /// Placeholder names in capture-group order.
    pub names: Vec<String>,
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment<'a> {
    /// Text matched literally.
    Literal(&'a str),
    /// A `{name}` placeholder.
    Placeholder(&'a str),
}

/// Splits a template into literal runs and placeholders.
///
/// # Errors
///
/// Returns [`WaypointError::MalformedTemplate`] for an unclosed `{`, a stray
/// `}`, or a placeholder name that is not an identifier.
pub fn parse_template(template: &str) -> WaypointResult<Vec<TemplateSegment<'_>>> {
    let malformed = |reason: String| WaypointError::MalformedTemplate {
        template: template.to_string(),
        reason,
    };

    let mut segments = Vec::new();
    let mut remaining = template;

    while !remaining.is_empty() {
        let Some(start) = remaining.find(['{', '}']) else {
            segments.push(TemplateSegment::Literal(remaining));
            break;
        };

        if remaining[start..].starts_with('}') {
            return Err(malformed("unmatched '}'".to_string()));
        }
        if start > 0 {
            segments.push(TemplateSegment::Literal(&remaining[..start]));
        }

        let end = remaining[start..]
            .find('}')
            .ok_or_else(|| malformed("unclosed '{'".to_string()))?
            + start;

        let name = &remaining[start + 1..end];
        if !is_parameter_name(name) {
            return Err(malformed(format!("invalid parameter name '{name}'")));
        }
        segments.push(TemplateSegment::Placeholder(name));

        remaining = &remaining[end + 1..];
    }

    Ok(segments)
}

/// Returns the placeholder names of a template in left-to-right order.
///
/// # Errors
///
/// Returns an error if the template is malformed.
pub fn parameter_names(template: &str) -> WaypointResult<Vec<&str>> {
    Ok(parse_template(template)?
        .into_iter()
        .filter_map(|segment| match segment {
            TemplateSegment::Placeholder(name) => Some(name),
            TemplateSegment::Literal(_) => None,
        })
        .collect())
}

/// Translates a template into a regex fragment and its parameter names.
///
/// Each placeholder becomes `(<pattern>)` where `<pattern>` comes from
/// `patterns` or defaults to [`DEFAULT_PARAMETER_PATTERN`].
///
/// # Errors
///
/// - [`WaypointError::MalformedTemplate`] if the template cannot be parsed.
/// - [`WaypointError::DuplicateParameter`] if a placeholder appears twice.
/// - [`WaypointError::InvalidPattern`] if a pattern is not a valid regex.
/// - [`WaypointError::CapturingGroupInPattern`] if a pattern has a capturing group.
/// - [`WaypointError::PatternWithoutParameter`] if a pattern names no placeholder.
pub fn compile_template(
    template: &str,
    patterns: &BTreeMap<String, String>,
) -> WaypointResult<CompiledTemplate> {
    for (name, pattern) in patterns {
        validate_pattern(name, pattern)?;
    }

    let mut fragment = String::new();
    let mut names: Vec<String> = Vec::new();

    for segment in parse_template(template)? {
        match segment {
            TemplateSegment::Literal(text) => fragment.push_str(&regex::escape(text)),
            TemplateSegment::Placeholder(name) => {
                if names.iter().any(|n| n == name) {
                    return Err(WaypointError::DuplicateParameter {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }
                let pattern = patterns
                    .get(name)
                    .map_or(DEFAULT_PARAMETER_PATTERN, String::as_str);
                fragment.push('(');
                fragment.push_str(pattern);
                fragment.push(')');
                names.push(name.to_string());
            }
        }
    }

    if let Some(name) = patterns.keys().find(|key| !names.contains(*key)) {
        return Err(WaypointError::PatternWithoutParameter {
            template: template.to_string(),
            name: name.clone(),
        });
    }

    Ok(CompiledTemplate { fragment, names })
}

/// Checks that a parameter pattern is a standalone regex without capturing groups.
///
/// # Errors
///
/// Returns [`WaypointError::InvalidPattern`] or
/// [`WaypointError::CapturingGroupInPattern`].
pub fn validate_pattern(name: &str, pattern: &str) -> WaypointResult<()> {
    let regex = Regex::new(pattern).map_err(|e| WaypointError::InvalidPattern {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    // captures_len counts the implicit whole-match group.
    if regex.captures_len() > 1 {
        return Err(WaypointError::CapturingGroupInPattern {
            name: name.to_string(),
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}

fn is_parameter_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
