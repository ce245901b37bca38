//! # Recall Schedule
//!
//! Decides per turn whether the full profile is injected or only the
//! similarity hits. Re-sending the profile every turn costs tokens, so it
//! goes out on the first turn and then every `frequency` turns.

use crate::session::events::{ConversationMessage, Role};

/// Prompts shorter than this (in characters) never trigger recall
pub const MIN_RECALL_PROMPT_CHARS: usize = 5;

/// Whether turn `turn` (1-based count of user messages) carries the full
/// profile. A frequency of zero behaves like one.
pub fn should_include_full_profile(turn: usize, frequency: usize) -> bool {
    let frequency = frequency.max(1);
    turn <= 1 || turn % frequency == 0
}

/// Whether a prompt is substantial enough to recall for
pub fn needs_recall(prompt: &str) -> bool {
    prompt.chars().count() >= MIN_RECALL_PROMPT_CHARS
}

/// Number of user-authored messages in a conversation
pub fn count_user_turns(messages: &[ConversationMessage]) -> usize {
    messages.iter().filter(|m| m.role == Role::User).count()
}
