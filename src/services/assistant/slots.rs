//! Slot extraction: date, time, duration, title and description fragments.
//!
//! Each slot has its own ordered rule list, evaluated top to bottom with the
//! first match winning. All rules run against the original utterance, so two
//! slots may claim overlapping text.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::SlotSet;

use super::rules;

const MONTH_PREFIXES: &str = "jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";

/// Ordered date rules.
static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let weekdays = rules::alternation(rules::WEEKDAYS);
    [
        // MM/DD/YYYY
        r"\b\d{1,2}/\d{1,2}/\d{4}\b".to_string(),
        // MM-DD-YYYY
        r"\b\d{1,2}-\d{1,2}-\d{4}\b".to_string(),
        // January 1st, 2024
        format!(r"(?i)\b(?:{MONTH_PREFIXES})[a-z]* \d{{1,2}}(?:st|nd|rd|th)?,? \d{{4}}\b"),
        // tomorrow, next monday
        format!(r"(?i)\b(?:tomorrow|next (?:{weekdays}))\b"),
        r"(?i)\b(?:today|tonight)\b".to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

/// Ordered time rules.
static TIME_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 3pm, 11:30 am
        r"(?i)\b(?:1[0-2]|0?[1-9])(?::[0-5][0-9])?\s*(?:am|pm)\b",
        // 9:00, 15:30
        r"\b(?:2[0-3]|[01]?[0-9]):[0-5][0-9]\b",
        r"(?i)\b(?:morning|afternoon|evening|noon|midnight)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex"))
    .collect()
});

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:for\s+)?(\d+)\s*(min(?:ute)?s?|hours?)\b").expect("Invalid regex")
});

/// Word lists the title and description rules are built from.
#[derive(Debug, Clone)]
pub struct SlotVocabulary<'a> {
    pub title_leads: &'a [&'a str],
    pub stop_words: &'a [&'a str],
}

impl Default for SlotVocabulary<'static> {
    fn default() -> Self {
        Self {
            title_leads: rules::TITLE_LEADS,
            stop_words: rules::STOP_WORDS,
        }
    }
}

pub struct SlotExtractor {
    title: Regex,
    description: Regex,
}

impl SlotExtractor {
    pub fn new(vocabulary: &SlotVocabulary<'_>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !vocabulary.title_leads.is_empty() && !vocabulary.stop_words.is_empty(),
            "title leads and stop words must not be empty"
        );
        let stops = rules::alternation(vocabulary.stop_words);
        let leads = rules::alternation(vocabulary.title_leads);

        let title = Regex::new(&format!(
            r"(?i)\b(?:{leads})\s+(.+?)(?:\s+(?:{stops})\s+|$)"
        ))?;
        let description = Regex::new(&format!(
            r"(?i)\bdescription\s+(?:is\s+)?(.+?)(?:\s+(?:{stops})\s+|$)"
        ))?;

        Ok(Self { title, description })
    }

    pub fn extract(&self, utterance: &str) -> SlotSet {
        SlotSet {
            date: first_match(&DATE_PATTERNS, utterance),
            time: first_match(&TIME_PATTERNS, utterance),
            duration: extract_duration(utterance),
            title: capture_phrase(&self.title, utterance),
            description: capture_phrase(&self.description, utterance),
        }
    }
}

static DEFAULT_EXTRACTOR: LazyLock<SlotExtractor> = LazyLock::new(|| {
    SlotExtractor::new(&SlotVocabulary::default()).expect("Invalid slot vocabulary")
});

/// Extract with the built-in vocabulary.
pub fn extract(utterance: &str) -> SlotSet {
    DEFAULT_EXTRACTOR.extract(utterance)
}

fn first_match(patterns: &[Regex], text: &str) -> Option<String> {
    patterns
        .iter()
        .find_map(|p| p.find(text))
        .map(|m| m.as_str().to_string())
}

fn extract_duration(text: &str) -> Option<u32> {
    let caps = DURATION_PATTERN.captures(text)?;
    let value: u32 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_lowercase();
    let minutes = if unit.starts_with("hour") {
        value.checked_mul(60)?
    } else {
        value
    };
    (minutes > 0).then_some(minutes)
}

fn capture_phrase(pattern: &Regex, text: &str) -> Option<String> {
    let captured = pattern.captures(text)?.get(1)?.as_str().trim();
    (!captured.is_empty()).then(|| captured.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_schedule_client_review() {
        let slots = extract("schedule a meeting for Client Review tomorrow at 3pm");
        assert_eq!(slots.title.as_deref(), Some("Client Review"));
        assert_eq!(slots.date.as_deref(), Some("tomorrow"));
        assert_eq!(slots.time.as_deref(), Some("3pm"));
        assert_eq!(slots.duration, None);
        assert_eq!(slots.description, None);
    }

    #[test]
    fn test_empty_utterance_has_no_slots() {
        assert!(extract("").is_empty());
        assert!(extract("   ").is_empty());
    }

    #[test]
    fn test_date_rule_order() {
        assert_eq!(extract("on 12/25/2024 or tomorrow").date.as_deref(), Some("12/25/2024"));
        assert_eq!(extract("on 12-25-2024").date.as_deref(), Some("12-25-2024"));
        assert_eq!(
            extract("book it January 1st, 2025 please").date.as_deref(),
            Some("January 1st, 2025")
        );
        assert_eq!(extract("sept 5 2025").date.as_deref(), Some("sept 5 2025"));
        assert_eq!(extract("tomorrow, not today").date.as_deref(), Some("tomorrow"));
        assert_eq!(extract("see you Next Friday").date.as_deref(), Some("Next Friday"));
        assert_eq!(extract("later tonight").date.as_deref(), Some("tonight"));
        assert_eq!(extract("next week").date, None);
    }

    #[test]
    fn test_time_rule_order() {
        assert_eq!(extract("at 3:30pm").time.as_deref(), Some("3:30pm"));
        assert_eq!(extract("at 11 AM").time.as_deref(), Some("11 AM"));
        assert_eq!(extract("at 15:30").time.as_deref(), Some("15:30"));
        assert_eq!(extract("9:00 in the morning").time.as_deref(), Some("9:00"));
        assert_eq!(extract("in the afternoon").time.as_deref(), Some("afternoon"));
        assert_eq!(extract("at noon").time.as_deref(), Some("noon"));
        assert_eq!(extract("at 13pm").time, None);
    }

    #[test]
    fn test_duration_units() {
        assert_eq!(extract("for 2 hours").duration, Some(120));
        assert_eq!(extract("1 hour").duration, Some(60));
        assert_eq!(extract("for 45 minutes").duration, Some(45));
        assert_eq!(extract("30 mins").duration, Some(30));
        assert_eq!(extract("15min").duration, Some(15));
        assert_eq!(extract("for 1 minute").duration, Some(1));
        assert_eq!(extract("for a while").duration, None);
    }

    #[test]
    fn test_duration_rejects_zero_and_overflow() {
        assert_eq!(extract("for 0 minutes").duration, None);
        assert_eq!(extract("for 99999999999 hours").duration, None);
        assert_eq!(extract("for 4294967295 hours").duration, None);
    }

    #[test]
    fn test_title_stops_at_stop_word() {
        assert_eq!(
            extract("cancel my appointment for Client Review").title.as_deref(),
            Some("Client Review")
        );
        assert_eq!(
            extract("set up a call about Budget Planning with Sam at 2pm").title.as_deref(),
            Some("Budget Planning")
        );
        assert_eq!(
            extract("move the sync regarding Q3 goals next monday").title.as_deref(),
            Some("Q3 goals")
        );
        assert_eq!(extract("schedule something").title, None);
    }

    #[test]
    fn test_title_stop_word_needs_trailing_space() {
        // "at" at the very end is not followed by whitespace, so the capture
        // runs to the end of the utterance.
        assert_eq!(extract("book time for lunch at").title.as_deref(), Some("lunch at"));
    }

    #[test]
    fn test_description() {
        let slots = extract("book a demo for Acme description is product walkthrough on friday");
        assert_eq!(slots.description.as_deref(), Some("product walkthrough"));
        assert_eq!(
            extract("description bring the contract").description.as_deref(),
            Some("bring the contract")
        );
    }

    #[test]
    fn test_slots_may_overlap() {
        // "for 30 minutes" is both the duration and the title lead-in.
        let slots = extract("set up a call for 30 minutes about budget");
        assert_eq!(slots.duration, Some(30));
        assert_eq!(slots.title.as_deref(), Some("30 minutes"));
    }

    #[test]
    fn test_extract_is_repeatable() {
        let text = "reschedule Client Review to next tuesday at 10:15am for 90 minutes";
        assert_eq!(extract(text), extract(text));
    }

    #[test]
    fn test_custom_vocabulary() {
        let extractor = SlotExtractor::new(&SlotVocabulary {
            title_leads: &["called"],
            stop_words: &["on"],
        })
        .unwrap();
        let slots = extractor.extract("plan a party called Summer Bash on friday");
        assert_eq!(slots.title.as_deref(), Some("Summer Bash"));
        assert!(SlotExtractor::new(&SlotVocabulary {
            title_leads: &[],
            stop_words: &["on"],
        })
        .is_err());
    }
}
