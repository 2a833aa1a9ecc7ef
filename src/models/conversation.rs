use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationEntry {
    pub speaker: Speaker,
    pub text: String,
}

/// Entries kept when no limit is configured.
pub const DEFAULT_CAPACITY: usize = 200;

/// Transcript shown next to the assistant, holding at most `capacity`
/// entries; the oldest are dropped first. Display only, it never feeds back
/// into command interpretation.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    entries: VecDeque<ConversationEntry>,
    capacity: usize,
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn with_greeting(greeting: &str, capacity: usize) -> Self {
        let mut log = Self::with_capacity(capacity);
        log.push(Speaker::Assistant, greeting);
        log
    }

    pub fn push(&mut self, speaker: Speaker, text: &str) -> ConversationEntry {
        let entry = ConversationEntry {
            speaker,
            text: text.to_string(),
        };
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.clone());
        entry
    }

    /// Oldest first.
    pub fn entries(&self) -> Vec<ConversationEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_order() {
        let mut log = ConversationLog::with_greeting("Hello!", DEFAULT_CAPACITY);
        log.push(Speaker::User, "what's on my schedule");
        log.push(Speaker::Assistant, "You have no upcoming appointments.");

        let speakers: Vec<Speaker> = log.entries().iter().map(|e| e.speaker).collect();
        assert_eq!(
            speakers,
            vec![Speaker::Assistant, Speaker::User, Speaker::Assistant]
        );
        assert_eq!(log.entries()[1].text, "what's on my schedule");
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = ConversationEntry {
            speaker: Speaker::User,
            text: "hi".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["speaker"], "user");
        assert_eq!(json["text"], "hi");
    }

    #[test]
    fn test_full_log_drops_oldest_entries() {
        let mut log = ConversationLog::with_greeting("Hello!", 4);
        for i in 1..=3 {
            log.push(Speaker::User, &format!("question {i}"));
            log.push(Speaker::Assistant, &format!("answer {i}"));
        }

        assert_eq!(log.len(), 4);
        let texts: Vec<String> = log.entries().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["question 2", "answer 2", "question 3", "answer 3"]);
    }

    #[test]
    fn test_zero_capacity_still_keeps_latest() {
        let mut log = ConversationLog::with_capacity(0);
        log.push(Speaker::User, "first");
        log.push(Speaker::User, "second");
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.entries()[0].text, "second");
    }
}
