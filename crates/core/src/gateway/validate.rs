//! # Request Validation
//!
//! Local checks applied before anything is sent to the memory backend.

use super::Metadata;
use super::MetadataValue;

/// Required prefix of backend API keys
pub const API_KEY_PREFIX: &str = "sm_";
const MIN_API_KEY_LEN: usize = 20;

const MAX_TAG_LEN: usize = 100;

/// Default upper bound for stored content, in characters
pub const MAX_CONTENT_CHARS: usize = 100_000;

const MAX_METADATA_ENTRIES: usize = 50;
const MAX_METADATA_KEY_LEN: usize = 64;
const MAX_METADATA_VALUE_CHARS: usize = 1024;

/// Check the shape of an API key without contacting the backend
pub fn validate_api_key_format(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("key is empty".to_string());
    }
    if key.chars().any(char::is_whitespace) {
        return Err("key contains whitespace".to_string());
    }
    if !key.starts_with(API_KEY_PREFIX) {
        return Err(format!("key must start with '{}'", API_KEY_PREFIX));
    }
    if key.len() < MIN_API_KEY_LEN {
        return Err(format!("key is shorter than {} characters", MIN_API_KEY_LEN));
    }
    Ok(())
}

/// Check that a container tag is one the backend accepts
pub fn validate_container_tag(tag: &str) -> Result<(), String> {
    if tag.is_empty() {
        return Err("tag is empty".to_string());
    }
    if tag.len() > MAX_TAG_LEN {
        return Err(format!("tag exceeds {} characters", MAX_TAG_LEN));
    }
    if let Some(bad) = tag
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(format!("tag contains invalid character '{}'", bad));
    }
    if tag.starts_with('-') || tag.ends_with('-') {
        return Err("tag must not start or end with '-'".to_string());
    }
    Ok(())
}

/// Strip control characters (keeping newlines and tabs), trim, and cap the
/// length at `max_chars`.
pub fn sanitize_content(content: &str, max_chars: usize) -> String {
    let cleaned: String = content
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();
    cleaned.trim().chars().take(max_chars).collect()
}

/// Drop metadata entries with unusable keys and cap string values
pub fn sanitize_metadata(metadata: &Metadata) -> Metadata {
    metadata
        .iter()
        .filter(|(key, _)| {
            !key.is_empty()
                && key.len() <= MAX_METADATA_KEY_LEN
                && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
        .take(MAX_METADATA_ENTRIES)
        .map(|(key, value)| {
            let value = match value {
                MetadataValue::Text(text) => {
                    MetadataValue::Text(text.chars().take(MAX_METADATA_VALUE_CHARS).collect())
                }
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Truncate `text` to `max` characters, marking the cut with an ellipsis
pub fn limit_text(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}…", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_format() {
        assert!(validate_api_key_format("sm_abcdefghijklmnopqrstu").is_ok());
        assert!(validate_api_key_format("").is_err());
        assert!(validate_api_key_format("sm_short").is_err());
        assert!(validate_api_key_format("sk_abcdefghijklmnopqrstu").is_err());
        assert!(validate_api_key_format("sm_abcdefghij klmnopqrstu").is_err());
    }

    #[test]
    fn test_container_tag() {
        assert!(validate_container_tag("memoria_laptop").is_ok());
        assert!(validate_container_tag("team-notes").is_ok());
        assert!(validate_container_tag("").is_err());
        assert!(validate_container_tag("has space").is_err());
        assert!(validate_container_tag("-leading").is_err());
        assert!(validate_container_tag(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_sanitize_content() {
        assert_eq!(sanitize_content("  hi\u{0000}\tthere\n ", 100), "hi\tthere");
        assert_eq!(sanitize_content("abcdef", 3), "abc");
    }

    #[test]
    fn test_sanitize_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), "memoria".into());
        metadata.insert("bad key".to_string(), "x".into());
        metadata.insert("note".to_string(), "y".repeat(2000).into());

        let clean = sanitize_metadata(&metadata);
        assert_eq!(clean.len(), 2);
        assert!(!clean.contains_key("bad key"));
        match &clean["note"] {
            MetadataValue::Text(text) => assert_eq!(text.chars().count(), 1024),
            other => panic!("unexpected value {:?}", other),
        }
    }

    #[test]
    fn test_limit_text() {
        assert_eq!(limit_text("short", 10), "short");
        assert_eq!(limit_text("abcdef", 3), "abc…");
    }
}
