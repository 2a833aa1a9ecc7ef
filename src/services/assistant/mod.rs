//! Rule-based appointment assistant: keyword intent classification, slot
//! extraction, date/time resolution and dispatch against the store.

pub mod dispatch;
pub mod intent;
pub mod resolver;
pub mod rules;
pub mod slots;

use crate::models::Command;

pub use dispatch::dispatch;
pub use intent::{classify, normalize, IntentClassifier, IntentVocabulary};
pub use resolver::{resolve, ResolveError};
pub use slots::{extract, SlotExtractor, SlotVocabulary};

/// Classify, extract and normalise one utterance with the built-in rules.
pub fn interpret(utterance: &str) -> Command {
    normalize(classify(utterance), extract(utterance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Intent, SlotSet};

    #[test]
    fn test_empty_utterance_is_bare_query() {
        let command = interpret("");
        assert_eq!(command.intent, Intent::Query);
        assert_eq!(command.parameters, SlotSet::default());
    }

    #[test]
    fn test_interpret_serializes_without_absent_slots() {
        let command = interpret("cancel my appointment for Client Review");
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["intent"], "cancel");
        assert_eq!(json["parameters"]["title"], "Client Review");
        assert!(json["parameters"].get("date").is_none());
    }
}
