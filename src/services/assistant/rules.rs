//! Keyword policy for the assistant.
//!
//! Trigger words, stop words and lead-ins are plain data so the classifier
//! and extractor can be rebuilt with a different vocabulary without touching
//! their matching logic.

use regex::Regex;

pub const SCHEDULE_TRIGGERS: &[&str] = &["schedule", "book", "set up", "arrange", "make"];
pub const RESCHEDULE_TRIGGERS: &[&str] = &["reschedule", "change", "move", "update"];
pub const CANCEL_TRIGGERS: &[&str] = &["cancel", "delete", "remove"];

/// Openers that mark an utterance as a question about the calendar. Checked
/// at the start of the utterance only. A question still takes any explicit
/// trigger it contains, except schedule words used as a noun.
pub const QUESTION_LEADS: &[&str] = &[
    "what",
    "what's",
    "whats",
    "when is",
    "when's",
    "which",
    "do i have",
    "how many",
    "show me",
    "list",
];

/// Determiners that turn a schedule trigger into a noun: "my schedule",
/// "the book".
pub const NOUN_DETERMINERS: &[&str] = &["my", "the", "your", "our", "this", "that"];

/// Words that introduce a title: "for", "about", "regarding".
pub const TITLE_LEADS: &[&str] = &["for", "about", "regarding"];

/// Words that end a captured title or description.
pub const STOP_WORDS: &[&str] = &["on", "at", "with", "tomorrow", "next", "in", "for", "about"];

pub const WEEKDAYS: &[&str] = &[
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

pub const DEFAULT_DURATION_MINUTES: u32 = 60;

pub const GREETING: &str =
    "Hello! I'm your AI appointment assistant. How can I help you today?";

/// Regex alternation for a word list. Multi-word phrases match any run of
/// whitespace between their words.
pub fn alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| {
            w.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Case-insensitive whole-word matcher for any of `words`.
pub fn keyword_regex(words: &[&str]) -> anyhow::Result<Regex> {
    anyhow::ensure!(!words.is_empty(), "keyword list must not be empty");
    Ok(Regex::new(&format!(r"(?i)\b(?:{})\b", alternation(words)))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternation_escapes_and_spaces() {
        assert_eq!(alternation(&["set up", "what's"]), r"set\s+up|what's");
        assert_eq!(alternation(&["a.b"]), r"a\.b");
    }

    #[test]
    fn test_keyword_regex_whole_words() {
        let re = keyword_regex(&["book", "set up"]).unwrap();
        assert!(re.is_match("Please BOOK a room"));
        assert!(re.is_match("set   up a call"));
        assert!(!re.is_match("my notebook"));
    }

    #[test]
    fn test_keyword_regex_rejects_empty() {
        assert!(keyword_regex(&[]).is_err());
    }
}
