//! Knowledge base - the fixed intent catalogue the matcher scores against
//!
//! Entries are loaded once (embedded JSON or a file named by the config) and
//! are read-only afterwards. Definition order is significant: it is the
//! iteration order of the matcher and therefore decides ties.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const DEFAULT_KNOWLEDGE_JSON: &str = include_str!("default_knowledge.json");

/// Intent keys the classifier emits on its own; a knowledge base may not reuse them.
pub const RESERVED_INTENTS: [&str; 3] = ["help", "empty", "unknown"];

#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("failed to read knowledge base file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid knowledge base JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("knowledge base has no intents")]
    Empty,
    #[error("intent key must not be blank")]
    BlankIntent,
    #[error("duplicate intent key: {0}")]
    DuplicateIntent(String),
    #[error("intent key {0} is reserved")]
    ReservedIntent(String),
    #[error("intent {0} has no responses")]
    NoResponses(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub intent: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    pub responses: Vec<String>,
}

/// One row of the coverage report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentCoverage {
    pub intent: String,
    pub patterns: usize,
    pub responses: usize,
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    /// The catalogue compiled into the binary.
    pub fn builtin() -> Result<Self, KnowledgeBaseError> {
        Self::from_json_str(DEFAULT_KNOWLEDGE_JSON)
    }

    pub fn from_json_str(json: &str) -> Result<Self, KnowledgeBaseError> {
        let entries: Vec<KnowledgeEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    pub fn from_path(path: &Path) -> Result<Self, KnowledgeBaseError> {
        info!("Loading knowledge base from: {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn from_entries(entries: Vec<KnowledgeEntry>) -> Result<Self, KnowledgeBaseError> {
        if entries.is_empty() {
            return Err(KnowledgeBaseError::Empty);
        }

        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.intent.trim().is_empty() {
                return Err(KnowledgeBaseError::BlankIntent);
            }
            if RESERVED_INTENTS.contains(&entry.intent.as_str()) {
                return Err(KnowledgeBaseError::ReservedIntent(entry.intent.clone()));
            }
            if !seen.insert(entry.intent.as_str()) {
                return Err(KnowledgeBaseError::DuplicateIntent(entry.intent.clone()));
            }
            if entry.responses.is_empty() {
                return Err(KnowledgeBaseError::NoResponses(entry.intent.clone()));
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn get(&self, intent: &str) -> Option<&KnowledgeEntry> {
        self.entries.iter().find(|entry| entry.intent == intent)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn coverage(&self) -> Vec<IntentCoverage> {
        self.entries
            .iter()
            .map(|entry| IntentCoverage {
                intent: entry.intent.clone(),
                patterns: entry.patterns.len(),
                responses: entry.responses.len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(intent: &str, responses: &[&str]) -> KnowledgeEntry {
        KnowledgeEntry {
            intent: intent.to_string(),
            patterns: vec![intent.to_string()],
            responses: responses.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_builtin_keeps_definition_order() {
        let kb = KnowledgeBase::builtin().unwrap();
        let intents: Vec<&str> = kb.entries().iter().map(|e| e.intent.as_str()).collect();

        assert_eq!(intents.len(), 12);
        assert_eq!(intents[0], "greetings");
        assert_eq!(intents[4], "pricing");
        assert_eq!(intents[11], "about");
    }

    #[test]
    fn test_lookup_by_intent() {
        let kb = KnowledgeBase::builtin().unwrap();

        let refund = kb.get("refund").unwrap();
        assert!(refund.patterns.contains(&"money back".to_string()));
        assert_eq!(refund.responses.len(), 2);
        assert!(kb.get("weather").is_none());
    }

    #[test]
    fn test_coverage_counts() {
        let kb = KnowledgeBase::builtin().unwrap();
        let coverage = kb.coverage();

        assert_eq!(coverage.len(), kb.len());
        let pricing = coverage.iter().find(|c| c.intent == "pricing").unwrap();
        assert_eq!(pricing.patterns, 12);
        assert_eq!(pricing.responses, 2);
    }

    #[test]
    fn test_rejects_duplicate_intent() {
        let result = KnowledgeBase::from_entries(vec![entry("a", &["x"]), entry("a", &["y"])]);
        assert!(matches!(result, Err(KnowledgeBaseError::DuplicateIntent(ref k)) if k == "a"));
    }

    #[test]
    fn test_rejects_reserved_intent() {
        let result = KnowledgeBase::from_entries(vec![entry("unknown", &["x"])]);
        assert!(matches!(result, Err(KnowledgeBaseError::ReservedIntent(_))));
    }

    #[test]
    fn test_rejects_intent_without_responses() {
        let result = KnowledgeBase::from_entries(vec![entry("quiet", &[])]);
        assert!(matches!(result, Err(KnowledgeBaseError::NoResponses(_))));
    }

    #[test]
    fn test_rejects_empty_catalogue() {
        assert!(matches!(KnowledgeBase::from_json_str("[]"), Err(KnowledgeBaseError::Empty)));
        assert!(matches!(KnowledgeBase::from_json_str("{"), Err(KnowledgeBaseError::Json(_))));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(
            &path,
            r#"[{"intent": "weather", "patterns": ["rain"], "responses": ["Bring an umbrella."]}]"#,
        )
        .unwrap();

        let kb = KnowledgeBase::from_path(&path).unwrap();
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.get("weather").unwrap().responses[0], "Bring an umbrella.");
    }
}
