//! Attribute extraction for GROT lines.
//!
//! GROT attaches metadata to lines as `@Key"Value"` pairs, where the key
//! starts with an uppercase letter and may contain letters, digits,
//! underscores and colons, and the value is any run of characters up to
//! the closing double quote.
//!
//! Extraction is pure and per-line: the parser uses it on every line it
//! keeps, and consumers (hover-style lookups) can call it on a single
//! line without re-parsing the whole document.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::AttributeSet;

/// One `@Key"Value"` pair anywhere in a line.
static ATTR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@([A-Z][A-Za-z0-9_:]*)"([^"]*)""#).unwrap());

/// Extracts every `@Key"Value"` pair from a line, left to right.
///
/// Matches are non-overlapping; a repeated key overwrites the earlier
/// value while keeping its first-seen position. A line with no pairs
/// yields an empty set; this never fails.
pub fn extract(line: &str) -> AttributeSet {
    let mut attrs = AttributeSet::new();
    for caps in ATTR_PATTERN.captures_iter(line) {
        attrs.insert(&caps[1], &caps[2]);
    }
    attrs
}

/// Extracts only the first `@Key"Value"` pair, if any.
pub fn extract_first(line: &str) -> Option<(String, String)> {
    ATTR_PATTERN
        .captures(line)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_pair() {
        let attrs = extract(r#"@DC:title"Global model""#);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("DC:title"), Some("Global model"));
    }

    #[test]
    fn test_extract_multiple_pairs() {
        let attrs = extract(r#"101 10.0 0.0 0.0 0.0 000 @REF"Mueller_2016" @DOI"10.1x/y""#);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("REF"), Some("Mueller_2016"));
        assert_eq!(attrs.get("DOI"), Some("10.1x/y"));
    }

    #[test]
    fn test_extract_duplicate_key_last_wins() {
        let attrs = extract(r#"@REF"first" @REF"second""#);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("REF"), Some("second"));
    }

    #[test]
    fn test_extract_empty_value() {
        let attrs = extract(r#"@C"""#);
        assert_eq!(attrs.get("C"), Some(""));
    }

    #[test]
    fn test_extract_rejects_lowercase_key() {
        let attrs = extract(r#"@ref"nope" @REF"yes""#);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("REF"), Some("yes"));
    }

    #[test]
    fn test_extract_none() {
        assert!(extract("101 10.0 0.0 0.0 0.0 000").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_extract_first() {
        let first = extract_first(r#"@A"1" @B"2""#).unwrap();
        assert_eq!(first, ("A".to_string(), "1".to_string()));
        assert!(extract_first("no attributes here").is_none());
    }
}
