//! # Session Document Identity
//!
//! Maps a host session key to a stable storage key so every capture in one
//! conversation lands on the same backend document.
//!
//! The mapping is lossy: keys that differ only in punctuation
//! (`abc-123` and `abc_123`) share a document.

/// Prefix for session-scoped document ids
pub const SESSION_PREFIX: &str = "session_";

/// Reduce `raw` to `[A-Za-z0-9_]` with single underscores and no
/// leading/trailing underscore.
pub fn sanitize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        let ch = if ch.is_ascii_alphanumeric() || ch == '_' {
            ch
        } else {
            '_'
        };
        if ch == '_' && out.ends_with('_') {
            continue;
        }
        out.push(ch);
    }
    out.trim_matches('_').to_string()
}

/// Derive the document id for a session key
pub fn document_id(session_key: &str) -> String {
    format!("{}{}", SESSION_PREFIX, sanitize_key(session_key))
}

/// Document id for an optional session key; `None` lets the backend assign one
pub fn document_id_for(session_key: Option<&str>) -> Option<String> {
    session_key.map(document_id)
}
