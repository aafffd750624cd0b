//! One chat turn end to end: classify, then persist both sides of the exchange

use crate::config::Config;
use crate::engine::{Chatbot, ClassificationResult};
use crate::knowledge::KnowledgeBase;
use crate::memory_db::{ConversationDatabase, StorageResult};
use crate::nlp::TextNormalizer;
use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

/// Short opaque session id: the first 8 hex digits of a random UUID.
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

pub struct SupportBot {
    chatbot: Chatbot,
    database: Arc<ConversationDatabase>,
    rng: Mutex<StdRng>,
}

impl SupportBot {
    pub fn new(chatbot: Chatbot, database: Arc<ConversationDatabase>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            chatbot,
            database,
            rng: Mutex::new(rng),
        }
    }

    /// Build everything the config names: knowledge base, normalizer, database.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let knowledge = match &config.knowledge_path {
            Some(path) => KnowledgeBase::from_path(path)
                .with_context(|| format!("Failed to load knowledge base from {}", path.display()))?,
            None => KnowledgeBase::builtin().context("Embedded knowledge base is invalid")?,
        };
        info!("Knowledge base ready with {} intents", knowledge.len());

        let chatbot = Chatbot::new(Arc::new(knowledge), Arc::new(TextNormalizer::new()));
        let database = ConversationDatabase::open(&config.db_path, config.pool_size)
            .with_context(|| format!("Failed to open conversation database at {}", config.db_path.display()))?;

        Ok(Self::new(chatbot, Arc::new(database), config.rng_seed))
    }

    pub fn chatbot(&self) -> &Chatbot {
        &self.chatbot
    }

    pub fn database(&self) -> &ConversationDatabase {
        &self.database
    }

    /// Classify without logging.
    pub fn classify(&self, message: &str) -> ClassificationResult {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.chatbot.classify_with(message, &mut *rng)
    }

    /// Classify and log the user message plus the reply in one transaction.
    /// A failed write is returned, never dropped.
    pub fn respond(&self, session_id: &str, message: &str) -> StorageResult<ClassificationResult> {
        let result = self.classify(message);
        self.database.conversations.log_turn(session_id, message, &result)?;
        Ok(result)
    }
}
