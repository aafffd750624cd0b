// supportbot/crates/supportbot/src/lib.rs

pub mod bot;
pub mod config;
pub mod engine;
pub mod knowledge;
pub mod memory_db;
pub mod nlp;
pub mod telemetry;
pub mod utils;

// Public API exports
pub use bot::{new_session_id, SupportBot};
pub use config::Config;
pub use engine::{Chatbot, ClassificationResult, Confidence, IntentMatcher, MatchResult};
pub use knowledge::{KnowledgeBase, KnowledgeBaseError, KnowledgeEntry};
pub use nlp::{Lemmatizer, TextNormalizer};

// Storage exports
pub use memory_db::{
    ConversationDatabase, ConversationStore, IntentCount, Message, MessageParams, Role,
    SessionRecord, StorageError, StorageResult, Totals,
};
