//! Bracketed key-value vocabulary shared by the graph header and epoch
//! labels: `"Some Name [key:value;key2:value2]"`.

use std::collections::HashMap;

/// Split `text` into its display name (everything before the first `[`)
/// and the parsed `key:value` pairs inside the brackets, if any.
pub fn parse(text: &str) -> (String, HashMap<String, String>) {
    let mut vocab = HashMap::new();
    let Some(open) = text.find('[') else {
        return (text.trim().to_string(), vocab);
    };
    let Some(close) = text.rfind(']') else {
        return (text[..open].trim().to_string(), vocab);
    };
    if close <= open {
        return (text[..open].trim().to_string(), vocab);
    }
    let name = text[..open].trim().to_string();
    let body = &text[open + 1..close];
    for pair in body.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        if let Some((k, v)) = pair.split_once(':') {
            vocab.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    (name, vocab)
}

/// Epoch bound sentinel: `XX` or `X` denotes an unbounded/unknown value,
/// represented as the literal `10000` everywhere downstream.
pub fn parse_time_bound(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("xx") || trimmed.eq_ignore_ascii_case("x") {
        return 10000;
    }
    trimmed.parse().unwrap_or(10000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_pairs() {
        let (name, vocab) = parse("Phase 1 [start:100;end:50]");
        assert_eq!(name, "Phase 1");
        assert_eq!(vocab.get("start").map(String::as_str), Some("100"));
        assert_eq!(vocab.get("end").map(String::as_str), Some("50"));
    }

    #[test]
    fn no_brackets_returns_bare_name() {
        let (name, vocab) = parse("Plain Name");
        assert_eq!(name, "Plain Name");
        assert!(vocab.is_empty());
    }

    #[test]
    fn xx_and_x_sentinel_to_10000() {
        assert_eq!(parse_time_bound("XX"), 10000);
        assert_eq!(parse_time_bound("X"), 10000);
        assert_eq!(parse_time_bound("x"), 10000);
        assert_eq!(parse_time_bound("1500"), 1500);
    }
}
