//! Placeholder substitution for task descriptions
//!
//! Only `{{city}}` and `{{famous_things}}` are recognised, with exactly that
//! spelling. Substitution is a single left-to-right pass, so text inserted for
//! one token is never scanned again for the other.

use std::sync::LazyLock;

use regex::{Captures, Regex};

pub const CITY_TOKEN: &str = "{{city}}";
pub const FAMOUS_THINGS_TOKEN: &str = "{{famous_things}}";

static SUPPORTED_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(city|famous_things)\}\}").expect("Invalid placeholder regex")
});

static ANY_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]*\}\}").expect("Invalid placeholder regex"));

/// Replace placeholder tokens with the supplied values.
///
/// A token whose value is `None` is left in the text as-is.
pub fn substitute(template: &str, city: Option<&str>, famous_things: Option<&str>) -> String {
    SUPPORTED_TOKEN_REGEX
        .replace_all(template, |caps: &Captures| {
            let value = match &caps[1] {
                "city" => city,
                _ => famous_things,
            };
            value.unwrap_or(&caps[0]).to_string()
        })
        .into_owned()
}

/// Every `{{...}}` token still present in `text`, in order of first appearance
pub fn unresolved_placeholders(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in ANY_TOKEN_REGEX.find_iter(text) {
        if !found.iter().any(|t| t == m.as_str()) {
            found.push(m.as_str().to_string());
        }
    }
    found
}
