//! # Memory Categories
//!
//! Heuristic classification of free text into a fixed set of categories.
//! Rules are evaluated in order and the first match wins.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category attached to every stored memory
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MemoryCategory {
    Preference,
    Fact,
    Decision,
    Entity,
    Other,
}

impl MemoryCategory {
    /// Get all categories
    pub fn all() -> [MemoryCategory; 5] {
        [
            MemoryCategory::Preference,
            MemoryCategory::Fact,
            MemoryCategory::Decision,
            MemoryCategory::Entity,
            MemoryCategory::Other,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryCategory::Preference => "preference",
            MemoryCategory::Fact => "fact",
            MemoryCategory::Decision => "decision",
            MemoryCategory::Entity => "entity",
            MemoryCategory::Other => "other",
        }
    }
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemoryCategory::all()
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown memory category: {}", s))
    }
}

static PREFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)prefer|like|love|hate|want").expect("static pattern"));
static DECISION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)decided|will use|going with").expect("static pattern"));
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\+\d{10,}|@[\w.-]+\.\w+|is called").expect("static pattern"));
static FACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)is|are|has|have").expect("static pattern"));

/// Classify text into a memory category.
///
/// Matching is substring-based, so "likes" counts as preference vocabulary
/// and "this" contains "is". Total: anything unmatched is `Other`.
pub fn classify(text: &str) -> MemoryCategory {
    let rules: [(&Lazy<Regex>, MemoryCategory); 4] = [
        (&PREFERENCE, MemoryCategory::Preference),
        (&DECISION, MemoryCategory::Decision),
        (&ENTITY, MemoryCategory::Entity),
        (&FACT, MemoryCategory::Fact),
    ];

    rules
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, category)| *category)
        .unwrap_or(MemoryCategory::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_wins_over_decision() {
        assert_eq!(
            classify("I prefer the plan we decided on"),
            MemoryCategory::Preference
        );
    }

    #[test]
    fn test_each_rule() {
        assert_eq!(classify("I love dark roast"), MemoryCategory::Preference);
        assert_eq!(classify("We DECIDED on postgres"), MemoryCategory::Decision);
        assert_eq!(classify("Going with option B"), MemoryCategory::Decision);
        assert_eq!(classify("ping me at dev@example.org"), MemoryCategory::Entity);
        assert_eq!(classify("call +15551234567 tomorrow"), MemoryCategory::Entity);
        assert_eq!(classify("my dog is called Rex"), MemoryCategory::Entity);
        assert_eq!(classify("The server has 64GB"), MemoryCategory::Fact);
        assert_eq!(classify("ok"), MemoryCategory::Other);
        assert_eq!(classify(""), MemoryCategory::Other);
    }

    #[test]
    fn test_short_phone_number_is_not_entity() {
        // fewer than ten digits falls through to later rules
        assert_eq!(classify("+12345"), MemoryCategory::Other);
    }

    #[test]
    fn test_deterministic() {
        let text = "Sarah has two cats";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Decision".parse::<MemoryCategory>(), Ok(MemoryCategory::Decision));
        assert!("opinion".parse::<MemoryCategory>().is_err());
        let json = serde_json::to_string(&MemoryCategory::Entity).unwrap();
        assert_eq!(json, "\"entity\"");
    }
}
