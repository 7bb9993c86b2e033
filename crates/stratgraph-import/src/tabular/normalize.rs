//! Column-name normalization shared by mapping keys and source headers.

use regex::Regex;
use std::sync::OnceLock;

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"[\s\-/\\()\[\].,;:–—]+"#).unwrap())
}

/// Uppercase, collapse the separator class into `_`, collapse runs of `_`,
/// trim leading/trailing `_`. The only basis mapping keys and source headers
/// are matched on.
pub fn normalize_column_name(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    let collapsed = separator_pattern().replace_all(&upper, "_");
    let mut result = String::with_capacity(collapsed.len());
    let mut last_was_underscore = false;
    for ch in collapsed.chars() {
        if ch == '_' {
            if !last_was_underscore {
                result.push('_');
            }
            last_was_underscore = true;
        } else {
            result.push(ch);
            last_was_underscore = false;
        }
    }
    result.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators_and_case() {
        assert_eq!(normalize_column_name("US number"), "US_NUMBER");
        assert_eq!(normalize_column_name("US/Number"), "US_NUMBER");
        assert_eq!(normalize_column_name("  US - Number  "), "US_NUMBER");
    }

    #[test]
    fn collapses_runs_and_trims() {
        assert_eq!(normalize_column_name("US..Number"), "US_NUMBER");
        assert_eq!(normalize_column_name("_US_Number_"), "US_NUMBER");
    }

    #[test]
    fn already_normalized_is_idempotent() {
        assert_eq!(normalize_column_name("US_NUMBER"), "US_NUMBER");
    }
}
