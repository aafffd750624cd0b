//! Bag-of-words intent scoring
//!
//! Every normalized pattern token of an intent adds one point when the same
//! token occurs anywhere in the input. Scores are not weighted by pattern
//! specificity or input length, so a long message that brushes against many
//! intents is decided by raw overlap alone. A token repeated inside an
//! intent's patterns scores once per occurrence; this over-weights repeated
//! words and is kept for compatibility with existing transcripts.

use crate::knowledge::KnowledgeBase;
use crate::nlp::TextNormalizer;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub intent: Option<String>,
    pub score: u32,
}

#[derive(Debug, Clone)]
struct IntentPatterns {
    intent: String,
    tokens: Vec<String>,
}

/// Scores input tokens against every intent in knowledge-base order.
///
/// Pattern phrases are normalized once here, with the caller's normalizer,
/// instead of on every request.
#[derive(Debug, Clone)]
pub struct IntentMatcher {
    intents: Vec<IntentPatterns>,
}

impl IntentMatcher {
    pub fn new(knowledge: &KnowledgeBase, normalizer: &TextNormalizer) -> Self {
        let intents = knowledge
            .entries()
            .iter()
            .map(|entry| IntentPatterns {
                intent: entry.intent.clone(),
                tokens: entry
                    .patterns
                    .iter()
                    .flat_map(|pattern| normalizer.normalize(pattern))
                    .collect(),
            })
            .collect();

        Self { intents }
    }

    /// Highest-scoring intent. Only a strictly greater score replaces the
    /// running best, so ties go to the intent defined first.
    pub fn best_match(&self, tokens: &[String]) -> MatchResult {
        let input: HashSet<&str> = tokens.iter().map(String::as_str).collect();

        let mut best: Option<&str> = None;
        let mut best_score = 0u32;

        for candidate in &self.intents {
            let score = candidate
                .tokens
                .iter()
                .filter(|token| input.contains(token.as_str()))
                .count() as u32;

            if score > best_score {
                best_score = score;
                best = Some(candidate.intent.as_str());
            }
        }

        debug!("Best intent {:?} with score {}", best, best_score);

        MatchResult {
            intent: best.map(str::to_string),
            score: best_score,
        }
    }

    /// The winning intent key, or `None` when nothing scored above zero.
    pub fn match_intent(&self, tokens: &[String]) -> Option<String> {
        self.best_match(tokens).intent
    }

    /// Normalized pattern tokens for one intent, in pattern order.
    pub fn pattern_tokens(&self, intent: &str) -> Option<&[String]> {
        self.intents
            .iter()
            .find(|candidate| candidate.intent == intent)
            .map(|candidate| candidate.tokens.as_slice())
    }
}
