//! String utility functions.
//!
//! Case conversions between dashed URL segments (`show-post`) and the
//! camel-case names controllers and actions are declared with.

/// Uppercases the first character of a string.
///
/// # Examples
///
/// ```
/// use waypoint_core::utils::text::capfirst;
///
/// assert_eq!(capfirst("blog"), "Blog");
/// assert_eq!(capfirst(""), "");
/// ```
pub fn capfirst(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |c| {
        let mut result = c.to_uppercase().to_string();
        result.extend(chars);
        result
    })
}

/// Converts a dashed segment to lower camel case.
///
/// Each dash is dropped and the character after it uppercased. Consecutive
/// dashes collapse.
///
/// # Examples
///
/// ```
/// use waypoint_core::utils::text::dash_to_camel;
///
/// assert_eq!(dash_to_camel("show-post"), "showPost");
/// assert_eq!(dash_to_camel("index"), "index");
/// ```
pub fn dash_to_camel(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        if c == '-' {
            upper_next = !result.is_empty();
        } else if upper_next {
            result.extend(c.to_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Converts a dashed segment to upper camel (Pascal) case.
///
/// # Examples
///
/// ```
/// use waypoint_core::utils::text::dash_to_pascal;
///
/// assert_eq!(dash_to_pascal("blog"), "Blog");
/// assert_eq!(dash_to_pascal("user-admin"), "UserAdmin");
/// ```
pub fn dash_to_pascal(s: &str) -> String {
    capfirst(&dash_to_camel(s))
}

/// Returns `true` if `s` is a non-empty run of ASCII letters, digits, `-`, and `_`
/// that starts with a letter.
pub fn is_identifier_segment(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
