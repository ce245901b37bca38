//! # Context Assembly
//!
//! Merges the three recall sources (static profile, dynamic profile,
//! similarity hits) into one bounded block for the agent's context window.
//!
//! ## Ordering
//!
//! ```text
//! static facts  ──┐
//! dynamic facts ──┼── shared seen-set ── truncate per list ── render sections
//! search hits   ──┘
//! ```
//!
//! Earlier lists win: a fact already emitted as profile is never repeated
//! as a search hit.

use crate::gateway::SearchHit;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Opening delimiter of an injected block
pub const CONTEXT_OPEN_TAG: &str = "<memoria-context>";
/// Closing delimiter of an injected block
pub const CONTEXT_CLOSE_TAG: &str = "</memoria-context>";

pub const PROFILE_HEADING: &str = "## User Profile (Persistent)";
pub const RECENT_HEADING: &str = "## Recent Context";
pub const RELEVANT_HEADING: &str = "## Relevant Memories (with relevance %)";

const INTRO: &str = "The following is recalled context about the user. \
Reference it only when relevant to the conversation.";

const DISCLAIMER: &str = "Use these memories naturally when relevant, including indirect \
connections, but don't force them into every response or make assumptions beyond what's stated.";

static INJECTED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<memoria-context>.*?</memoria-context>\s*").expect("static pattern")
});

/// Deduplicated, not yet truncated recall sources
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupedMemories {
    pub static_facts: Vec<String>,
    pub dynamic_facts: Vec<String>,
    pub search_hits: Vec<SearchHit>,
}

/// Drop exact-duplicate facts across all three sources, keeping the first
/// occurrence in priority order. Hits without text are dropped.
pub fn deduplicate(
    static_facts: &[String],
    dynamic_facts: &[String],
    search_hits: &[SearchHit],
) -> DedupedMemories {
    let mut seen: HashSet<&str> = HashSet::new();

    let static_facts = static_facts
        .iter()
        .filter(|&f| seen.insert(f.as_str()))
        .cloned()
        .collect();

    let dynamic_facts = dynamic_facts
        .iter()
        .filter(|&f| seen.insert(f.as_str()))
        .cloned()
        .collect();

    let search_hits = search_hits
        .iter()
        .filter(|&hit| {
            let text = hit.text();
            !text.is_empty() && seen.insert(text)
        })
        .cloned()
        .collect();

    DedupedMemories {
        static_facts,
        dynamic_facts,
        search_hits,
    }
}

/// Assemble the context block relative to the current time.
///
/// Returns `None` when there is nothing to inject.
pub fn assemble_context(
    static_facts: &[String],
    dynamic_facts: &[String],
    search_hits: &[SearchHit],
    max_per_list: usize,
) -> Option<String> {
    assemble_context_at(static_facts, dynamic_facts, search_hits, max_per_list, Utc::now())
}

/// Assemble the context block with an explicit "now" for the time labels
pub fn assemble_context_at(
    static_facts: &[String],
    dynamic_facts: &[String],
    search_hits: &[SearchHit],
    max_per_list: usize,
    now: DateTime<Utc>,
) -> Option<String> {
    let deduped = deduplicate(static_facts, dynamic_facts, search_hits);

    let statics: Vec<&String> = deduped.static_facts.iter().take(max_per_list).collect();
    let dynamics: Vec<&String> = deduped.dynamic_facts.iter().take(max_per_list).collect();
    let hits: Vec<&SearchHit> = deduped.search_hits.iter().take(max_per_list).collect();

    if statics.is_empty() && dynamics.is_empty() && hits.is_empty() {
        return None;
    }

    let mut sections = Vec::new();

    if !statics.is_empty() {
        sections.push(render_fact_section(PROFILE_HEADING, &statics));
    }

    if !dynamics.is_empty() {
        sections.push(render_fact_section(RECENT_HEADING, &dynamics));
    }

    if !hits.is_empty() {
        let lines: Vec<String> = hits.iter().map(|hit| render_hit(hit, now)).collect();
        sections.push(format!("{}\n{}", RELEVANT_HEADING, lines.join("\n")));
    }

    Some(format!(
        "{}\n{}\n\n{}\n\n{}\n{}",
        CONTEXT_OPEN_TAG,
        INTRO,
        sections.join("\n\n"),
        DISCLAIMER,
        CONTEXT_CLOSE_TAG
    ))
}

/// Render `## Heading` followed by one `- fact` line per entry
pub fn render_fact_section<S: AsRef<str>>(heading: &str, facts: &[S]) -> String {
    let lines: Vec<String> = facts.iter().map(|f| format!("- {}", f.as_ref())).collect();
    format!("{}\n{}", heading, lines.join("\n"))
}

fn render_hit(hit: &SearchHit, now: DateTime<Utc>) -> String {
    let time = hit
        .updated_at
        .as_deref()
        .map(|ts| relative_time(ts, now))
        .unwrap_or_default();
    let prefix = if time.is_empty() {
        String::new()
    } else {
        format!("[{}]", time)
    };
    let pct = hit
        .similarity
        .map(|s| format!("[{}%]", (s * 100.0).round() as i64))
        .unwrap_or_default();

    format!("- {}{} {}", prefix, hit.text(), pct).trim().to_string()
}

/// Human-readable age of an ISO-8601 timestamp; empty when unparseable
pub fn relative_time(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(then) = parse_timestamp(timestamp) else {
        return String::new();
    };

    let seconds = (now - then).num_seconds() as f64;
    let minutes = seconds / 60.0;
    let hours = seconds / 3600.0;
    let days = seconds / 86400.0;

    if minutes < 30.0 {
        "just now".to_string()
    } else if minutes < 60.0 {
        format!("{} mins ago", minutes.floor() as i64)
    } else if hours < 24.0 {
        format!("{} hrs ago", hours.floor() as i64)
    } else if days < 7.0 {
        format!("{} d ago", days.floor() as i64)
    } else if then.year() == now.year() {
        format!("{} {}", then.day(), then.format("%b"))
    } else {
        format!("{} {}, {}", then.day(), then.format("%b"), then.year())
    }
}

fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    let timestamp = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Remove previously injected context blocks from captured text
pub fn strip_injected_context(text: &str) -> String {
    INJECTED_BLOCK.replace_all(text, "").into_owned()
}
