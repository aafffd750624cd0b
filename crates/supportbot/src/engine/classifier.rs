//! Message classification: help shortcut, normalization, matching, reply choice

use crate::engine::intent_matcher::IntentMatcher;
use crate::engine::responses::{self, EMPTY_INPUT_RESPONSE, FALLBACK_RESPONSES, HELP_TEXT};
use crate::knowledge::{KnowledgeBase, KnowledgeBaseError};
use crate::nlp::TextNormalizer;
use crate::utils::TextUtils;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const HELP_INTENT: &str = "help";
pub const EMPTY_INTENT: &str = "empty";
pub const UNKNOWN_INTENT: &str = "unknown";

/// Inputs with at least this many surviving tokens match with high confidence.
const HIGH_CONFIDENCE_MIN_TOKENS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} label: {value}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

/// Coarse certainty label derived from match outcome and token count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "high")]
    High,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "n/a")]
    NotApplicable,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
            Confidence::NotApplicable => "n/a",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            "n/a" => Ok(Confidence::NotApplicable),
            other => Err(UnknownLabel {
                kind: "confidence",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub response: String,
    pub intent: String,
    pub confidence: Confidence,
}

/// Read-only classifier shared across requests.
#[derive(Debug, Clone)]
pub struct Chatbot {
    knowledge: Arc<KnowledgeBase>,
    normalizer: Arc<TextNormalizer>,
    matcher: IntentMatcher,
}

impl Chatbot {
    pub fn new(knowledge: Arc<KnowledgeBase>, normalizer: Arc<TextNormalizer>) -> Self {
        let matcher = IntentMatcher::new(&knowledge, &normalizer);
        Self {
            knowledge,
            normalizer,
            matcher,
        }
    }

    pub fn builtin() -> Result<Self, KnowledgeBaseError> {
        Ok(Self::new(
            Arc::new(KnowledgeBase::builtin()?),
            Arc::new(TextNormalizer::new()),
        ))
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn matcher(&self) -> &IntentMatcher {
        &self.matcher
    }

    /// Classifies with the thread-local RNG.
    pub fn classify(&self, message: &str) -> ClassificationResult {
        self.classify_with(message, &mut rand::thread_rng())
    }

    /// Classifies with a caller-supplied RNG; seed it for reproducible replies.
    pub fn classify_with<R: Rng + ?Sized>(&self, message: &str, rng: &mut R) -> ClassificationResult {
        if responses::is_help_alias(message) {
            return ClassificationResult {
                response: HELP_TEXT.to_string(),
                intent: HELP_INTENT.to_string(),
                confidence: Confidence::High,
            };
        }

        let tokens = self.normalizer.normalize(message);
        if tokens.is_empty() {
            return ClassificationResult {
                response: EMPTY_INPUT_RESPONSE.to_string(),
                intent: EMPTY_INTENT.to_string(),
                confidence: Confidence::NotApplicable,
            };
        }

        let matched = self
            .matcher
            .match_intent(&tokens)
            .and_then(|intent| self.knowledge.get(&intent));

        let result = match matched {
            Some(entry) => ClassificationResult {
                response: entry
                    .responses
                    .choose(rng)
                    .cloned()
                    .unwrap_or_else(|| FALLBACK_RESPONSES[0].to_string()),
                intent: entry.intent.clone(),
                confidence: if tokens.len() >= HIGH_CONFIDENCE_MIN_TOKENS {
                    Confidence::High
                } else {
                    Confidence::Medium
                },
            },
            None => ClassificationResult {
                response: FALLBACK_RESPONSES
                    .choose(rng)
                    .copied()
                    .unwrap_or(FALLBACK_RESPONSES[0])
                    .to_string(),
                intent: UNKNOWN_INTENT.to_string(),
                confidence: Confidence::Low,
            },
        };

        debug!(
            "Classified {:?} as {} ({})",
            TextUtils::preview(message, 48),
            result.intent,
            result.confidence
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn bot() -> Chatbot {
        Chatbot::builtin().unwrap()
    }

    #[test]
    fn test_help_aliases_bypass_matching() {
        let bot = bot();
        for alias in ["help", "?", "menu", "commands", "  HeLp  ", "\tMENU\n"] {
            let result = bot.classify(alias);
            assert_eq!(result.intent, "help");
            assert_eq!(result.confidence, Confidence::High);
            assert_eq!(result.response, HELP_TEXT);
        }
    }

    #[test]
    fn test_stopwords_and_punctuation_are_empty() {
        let bot = bot();
        for input in ["the of !!", "", "   ", "...", "is it?"] {
            let result = bot.classify(input);
            assert_eq!(result.intent, "empty", "input {:?}", input);
            assert_eq!(result.confidence, Confidence::NotApplicable);
            assert_eq!(result.response, EMPTY_INPUT_RESPONSE);
        }
    }

    #[test]
    fn test_unmatched_token_falls_back() {
        let result = bot().classify("xyzzyplugh");

        assert_eq!(result.intent, "unknown");
        assert_eq!(result.confidence, Confidence::Low);
        assert!(FALLBACK_RESPONSES.contains(&result.response.as_str()));
    }

    #[test]
    fn test_cost_question_is_high_confidence_pricing() {
        let bot = bot();
        let result = bot.classify("How much does it cost?");

        assert_eq!(result.intent, "pricing");
        assert_eq!(result.confidence, Confidence::High);
        assert!(bot.knowledge().get("pricing").unwrap().responses.contains(&result.response));
    }

    #[test]
    fn test_single_token_match_is_medium() {
        let result = bot().classify("refund!");
        assert_eq!(result.intent, "refund");
        assert_eq!(result.confidence, Confidence::Medium);
    }

    #[test]
    fn test_two_tokens_with_one_unmatched_is_high() {
        let result = bot().classify("refund xyzzyplugh");
        assert_eq!(result.intent, "refund");
        assert_eq!(result.confidence, Confidence::High);
    }

    /// Built-in patterns made only of stopwords; they normalize to nothing.
    const STOPWORD_ONLY_PATTERNS: [&str; 6] =
        ["when", "what can", "down", "who are you", "what are you", "about you"];

    #[test]
    fn test_verbatim_patterns_classify_to_their_intent() {
        let bot = bot();
        let kb = bot.knowledge();

        for entry in kb.entries() {
            let foreign: HashSet<&String> = kb
                .entries()
                .iter()
                .filter(|other| other.intent != entry.intent)
                .flat_map(|other| bot.matcher().pattern_tokens(&other.intent).unwrap_or(&[]))
                .collect();

            for pattern in &entry.patterns {
                let tokens = bot.normalizer().normalize(pattern);
                if tokens.is_empty() {
                    assert!(
                        STOPWORD_ONLY_PATTERNS.contains(&pattern.as_str()),
                        "pattern {:?} normalizes to nothing",
                        pattern
                    );
                    continue;
                }
                if tokens.iter().any(|t| foreign.contains(t)) {
                    continue;
                }
                assert_eq!(bot.classify(pattern).intent, entry.intent, "pattern {:?}", pattern);
            }
        }
    }

    #[test]
    fn test_contraction_pattern_matches_greeting() {
        let result = bot().classify("What's up");
        assert_eq!(result.intent, "greetings");
        assert_eq!(result.confidence, Confidence::Medium);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let bot = bot();
        let first: Vec<String> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..8).map(|_| bot.classify_with("hello", &mut rng).response).collect()
        };
        let second: Vec<String> = {
            let mut rng = StdRng::seed_from_u64(7);
            (0..8).map(|_| bot.classify_with("hello", &mut rng).response).collect()
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_confidence_labels_round_trip_through_strings() {
        for label in ["high", "medium", "low", "n/a"] {
            assert_eq!(label.parse::<Confidence>().unwrap().as_str(), label);
        }
        assert!("certain".parse::<Confidence>().is_err());
        assert_eq!(serde_json::to_string(&Confidence::NotApplicable).unwrap(), "\"n/a\"");
    }

    proptest! {
        #[test]
        fn prop_classify_is_total(message in "\\PC{0,80}") {
            let result = bot().classify(&message);
            prop_assert!(!result.response.is_empty());
            prop_assert!(!result.intent.is_empty());
        }

        #[test]
        fn prop_matched_confidence_follows_token_count(message in "[a-z ]{1,40}") {
            let bot = bot();
            let result = bot.classify(&message);
            if !["help", "empty", "unknown"].contains(&result.intent.as_str()) {
                let expected = if bot.normalizer().normalize(&message).len() >= 2 {
                    Confidence::High
                } else {
                    Confidence::Medium
                };
                prop_assert_eq!(result.confidence, expected);
            }
        }
    }
}
