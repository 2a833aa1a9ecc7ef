use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Command, Intent, SlotSet};

use super::rules;

/// Keyword vocabulary the classifier is built from.
#[derive(Debug, Clone)]
pub struct IntentVocabulary<'a> {
    pub question_leads: &'a [&'a str],
    pub noun_determiners: &'a [&'a str],
    pub schedule: &'a [&'a str],
    pub reschedule: &'a [&'a str],
    pub cancel: &'a [&'a str],
}

impl Default for IntentVocabulary<'static> {
    fn default() -> Self {
        Self {
            question_leads: rules::QUESTION_LEADS,
            noun_determiners: rules::NOUN_DETERMINERS,
            schedule: rules::SCHEDULE_TRIGGERS,
            reschedule: rules::RESCHEDULE_TRIGGERS,
            cancel: rules::CANCEL_TRIGGERS,
        }
    }
}

/// Ordered keyword rules; the first matching rule decides the intent and
/// anything unmatched is a `Query`.
///
/// In an utterance that opens like a question, schedule triggers preceded by
/// a determiner ("what's on my schedule") are nouns and do not count.
pub struct IntentClassifier {
    question: Option<Regex>,
    schedule_noun: Option<Regex>,
    rules: Vec<(Intent, Regex)>,
}

impl IntentClassifier {
    pub fn new(vocabulary: &IntentVocabulary<'_>) -> anyhow::Result<Self> {
        let question = if vocabulary.question_leads.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?i)^\s*(?:{})\b",
                rules::alternation(vocabulary.question_leads)
            ))?)
        };

        let schedule_noun = if vocabulary.noun_determiners.is_empty() || vocabulary.schedule.is_empty()
        {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?i)\b(?:{})\s+(?:{})\b",
                rules::alternation(vocabulary.noun_determiners),
                rules::alternation(vocabulary.schedule)
            ))?)
        };

        let rules = vec![
            (Intent::Schedule, rules::keyword_regex(vocabulary.schedule)?),
            (Intent::Reschedule, rules::keyword_regex(vocabulary.reschedule)?),
            (Intent::Cancel, rules::keyword_regex(vocabulary.cancel)?),
        ];

        Ok(Self {
            question,
            schedule_noun,
            rules,
        })
    }

    pub fn classify(&self, utterance: &str) -> Intent {
        let is_question = self
            .question
            .as_ref()
            .is_some_and(|q| q.is_match(utterance));

        let verbs_only = match (&self.schedule_noun, is_question) {
            (Some(noun), true) => noun.replace_all(utterance, " "),
            _ => Cow::Borrowed(utterance),
        };

        self.rules
            .iter()
            .find(|(intent, pattern)| match intent {
                Intent::Schedule => pattern.is_match(&verbs_only),
                _ => pattern.is_match(utterance),
            })
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::Query)
    }
}

static DEFAULT_CLASSIFIER: LazyLock<IntentClassifier> = LazyLock::new(|| {
    IntentClassifier::new(&IntentVocabulary::default()).expect("Invalid intent vocabulary")
});

/// Classify with the built-in vocabulary.
pub fn classify(utterance: &str) -> Intent {
    DEFAULT_CLASSIFIER.classify(utterance)
}

pub fn normalize(intent: Intent, parameters: SlotSet) -> Command {
    Command { intent, parameters }
}
