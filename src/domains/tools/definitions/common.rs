//! Common utilities shared across tool definitions.

use std::collections::HashSet;
use std::time::Duration;

use url::Url;

use super::super::{ToolContext, ToolResult};
use crate::core::security::validate_remote_url;

/// Upper bound for caller-supplied request timeouts, in seconds.
const MAX_TIMEOUT_SECS: u64 = 120;

/// Serde default helper for flags that default to `true`.
pub fn default_true() -> bool {
    true
}

/// Validate a caller-supplied URL against the server's URL policy.
pub fn checked_url(ctx: &ToolContext, raw: &str) -> ToolResult<Url> {
    Ok(validate_remote_url(raw, &ctx.config.security)?)
}

/// Convert a caller-supplied timeout to a duration clamped to 1..=120 seconds.
pub fn timeout_from_secs(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(1, MAX_TIMEOUT_SECS))
}

/// Keep the first occurrence of every item, preserving order.
pub fn dedupe_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Truncate a string to at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Round a float to the given number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_preserving_order() {
        let items = vec!["b", "a", "b", "c", "a"]
            .into_iter()
            .map(String::from);
        assert_eq!(dedupe_preserving_order(items), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_timeout_clamped() {
        assert_eq!(timeout_from_secs(0), Duration::from_secs(1));
        assert_eq!(timeout_from_secs(10), Duration::from_secs(10));
        assert_eq!(timeout_from_secs(10_000), Duration::from_secs(120));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(4.12345, 2), 4.12);
        assert_eq!(round_to(1.005_1, 3), 1.005);
    }
}
