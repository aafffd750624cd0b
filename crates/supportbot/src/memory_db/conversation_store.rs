use crate::engine::classifier::{ClassificationResult, Confidence};
use crate::memory_db::error::{StorageError, StorageResult};
use crate::memory_db::schema::*;
use crate::utils::TextUtils;
use chrono::Local;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::Arc;
use tracing::{debug, info};

/// Fields of one message to be logged.
#[derive(Debug, Clone, Copy)]
pub struct MessageParams<'a> {
    pub session_id: &'a str,
    pub role: Role,
    pub message: &'a str,
    pub intent: Option<&'a str>,
    pub confidence: Option<Confidence>,
}

impl<'a> MessageParams<'a> {
    pub fn user(session_id: &'a str, message: &'a str) -> Self {
        Self {
            session_id,
            role: Role::User,
            message,
            intent: None,
            confidence: None,
        }
    }

    pub fn bot(session_id: &'a str, message: &'a str) -> Self {
        Self {
            role: Role::Bot,
            ..Self::user(session_id, message)
        }
    }

    pub fn with_classification(self, intent: &'a str, confidence: Confidence) -> Self {
        Self {
            intent: Some(intent),
            confidence: Some(confidence),
            ..self
        }
    }
}

/// Durable message log plus per-session counters.
///
/// Every write touches `sessions` and `conversations` inside one immediate
/// transaction, so a session's `message_count` always equals its number of
/// rows, also under concurrent writers.
pub struct ConversationStore {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl ConversationStore {
    pub fn new(pool: Arc<Pool<SqliteConnectionManager>>) -> Self {
        Self { pool }
    }

    fn get_conn(&self) -> StorageResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// `LIMIT` bound; SQLite reads a negative limit as "no limit".
    fn sql_limit(limit: usize) -> i64 {
        i64::try_from(limit).unwrap_or(i64::MAX)
    }

    fn now() -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }

    /// Upsert the session (first write sets `started_at`) and bump its counter.
    fn upsert_session_with_conn(
        conn: &Connection,
        session_id: &str,
        now: &str,
        added: i64,
    ) -> StorageResult<()> {
        conn.execute(
            "INSERT INTO sessions (session_id, started_at, message_count)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(session_id) DO UPDATE SET
                 message_count = message_count + excluded.message_count",
            params![session_id, now, added],
        )?;
        Ok(())
    }

    fn insert_message_with_conn(
        conn: &Connection,
        params: &MessageParams<'_>,
        now: &str,
    ) -> StorageResult<Message> {
        conn.execute(
            "INSERT INTO conversations
                 (session_id, timestamp, role, message, intent, confidence)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                params.session_id,
                now,
                params.role.as_str(),
                params.message,
                params.intent,
                params.confidence.map(|c| c.as_str()),
            ],
        )?;

        Ok(Message {
            id: conn.last_insert_rowid(),
            session_id: params.session_id.to_string(),
            timestamp: now.to_string(),
            role: params.role,
            message: params.message.to_string(),
            intent: params.intent.map(str::to_string),
            confidence: params.confidence,
        })
    }

    /// Append messages for one session atomically; either all rows and the
    /// counter update land, or none do.
    pub fn log_messages_batch(&self, batch: &[MessageParams<'_>]) -> StorageResult<Vec<Message>> {
        let Some(first) = batch.first() else {
            return Ok(Vec::new());
        };
        let session_id = first.session_id;
        if session_id.trim().is_empty() || batch.iter().any(|p| p.session_id != session_id) {
            return Err(StorageError::InvalidSessionId);
        }

        let mut conn = self.get_conn()?;
        let now = Self::now();

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Self::upsert_session_with_conn(&tx, session_id, &now, batch.len() as i64)?;
        let mut stored = Vec::with_capacity(batch.len());
        for params in batch {
            stored.push(Self::insert_message_with_conn(&tx, params, &now)?);
        }
        tx.commit()?;

        for message in &stored {
            debug!(
                "Logged {} message #{} for session {}: {}",
                message.role,
                message.id,
                session_id,
                TextUtils::preview(&message.message, 60)
            );
        }
        Ok(stored)
    }

    pub fn log_message(&self, params: MessageParams<'_>) -> StorageResult<Message> {
        self.log_messages_batch(&[params])?
            .pop()
            .ok_or_else(|| StorageError::Corrupt("message insert returned no row".to_string()))
    }

    /// Log a full chat turn: the user's message and the bot's reply, both
    /// tagged with the classification.
    pub fn log_turn(
        &self,
        session_id: &str,
        user_message: &str,
        result: &ClassificationResult,
    ) -> StorageResult<(Message, Message)> {
        let user = MessageParams::user(session_id, user_message)
            .with_classification(&result.intent, result.confidence);
        let bot = MessageParams::bot(session_id, &result.response)
            .with_classification(&result.intent, result.confidence);

        let mut stored = self.log_messages_batch(&[user, bot])?.into_iter();
        match (stored.next(), stored.next()) {
            (Some(user), Some(bot)) => Ok((user, bot)),
            _ => Err(StorageError::Corrupt("chat turn insert returned too few rows".to_string())),
        }
    }

    /// Most recent first, at most `limit` rows.
    pub fn fetch_recent_messages(&self, limit: usize) -> StorageResult<Vec<Message>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, session_id, timestamp, role, message, intent, confidence
             FROM conversations ORDER BY id DESC LIMIT ?1",
        )?;
        let mut rows = stmt.query([Self::sql_limit(limit)])?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(Self::row_to_message(row)?);
        }
        Ok(messages)
    }

    /// One session's messages in insertion order.
    pub fn fetch_session_messages(&self, session_id: &str) -> StorageResult<Vec<Message>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, session_id, timestamp, role, message, intent, confidence
             FROM conversations WHERE session_id = ?1 ORDER BY id",
        )?;
        let mut rows = stmt.query([session_id])?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            messages.push(Self::row_to_message(row)?);
        }
        Ok(messages)
    }

    /// User-message counts per intent, most frequent first.
    pub fn fetch_intent_counts(&self) -> StorageResult<Vec<IntentCount>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT intent, COUNT(*) AS count
             FROM conversations
             WHERE role = 'user' AND intent IS NOT NULL
             GROUP BY intent ORDER BY count DESC, intent ASC",
        )?;
        let counts = stmt
            .query_map([], |row| {
                Ok(IntentCount {
                    intent: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }

    /// Counts come from `conversations` alone, in a single statement.
    pub fn fetch_totals(&self) -> StorageResult<Totals> {
        let conn = self.get_conn()?;
        let (total_messages, total_sessions, user_messages): (i64, i64, i64) = conn.query_row(
            "SELECT COUNT(*),
                    COUNT(DISTINCT session_id),
                    COALESCE(SUM(CASE WHEN role = 'user' THEN 1 ELSE 0 END), 0)
             FROM conversations",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(Totals {
            total_messages,
            total_sessions,
            user_messages,
            bot_messages: total_messages - user_messages,
        })
    }

    /// Newest sessions first.
    pub fn fetch_session_stats(&self, limit: usize) -> StorageResult<Vec<SessionRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT session_id, started_at, message_count
             FROM sessions ORDER BY started_at DESC, session_id ASC LIMIT ?1",
        )?;
        let sessions = stmt
            .query_map([Self::sql_limit(limit)], Self::row_to_session)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    pub fn get_session(&self, session_id: &str) -> StorageResult<Option<SessionRecord>> {
        let conn = self.get_conn()?;
        let session = conn
            .query_row(
                "SELECT session_id, started_at, message_count FROM sessions WHERE session_id = ?1",
                [session_id],
                Self::row_to_session,
            )
            .optional()?;
        Ok(session)
    }

    pub fn get_session_message_count(&self, session_id: &str) -> StorageResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM conversations WHERE session_id = ?1",
            [session_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Delete every message and session. Irreversible.
    pub fn clear_all(&self) -> StorageResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let messages = tx.execute("DELETE FROM conversations", [])?;
        let sessions = tx.execute("DELETE FROM sessions", [])?;
        tx.commit()?;

        info!("Cleared {} messages across {} sessions", messages, sessions);
        Ok(())
    }

    fn row_to_message(row: &Row) -> StorageResult<Message> {
        let role: String = row.get(3)?;
        let confidence: Option<String> = row.get(6)?;

        Ok(Message {
            id: row.get(0)?,
            session_id: row.get(1)?,
            timestamp: row.get(2)?,
            role: role.parse::<Role>()?,
            message: row.get(4)?,
            intent: row.get(5)?,
            confidence: confidence.map(|c| c.parse::<Confidence>()).transpose()?,
        })
    }

    fn row_to_session(row: &Row) -> rusqlite::Result<SessionRecord> {
        Ok(SessionRecord {
            session_id: row.get(0)?,
            started_at: row.get(1)?,
            message_count: row.get(2)?,
        })
    }
}
