use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::PathBuf;
use std::sync::Arc;
use supportbot::memory_db::{ConversationDatabase, Message, MessageParams, Role, StorageError};
use supportbot::{ClassificationResult, Confidence};

fn storage_err(e: StorageError) -> PyErr {
    match e {
        StorageError::InvalidSessionId => PyValueError::new_err(e.to_string()),
        other => PyRuntimeError::new_err(format!("Conversation log error: {}", other)),
    }
}

fn result_to_dict<'py>(py: Python<'py>, result: &ClassificationResult) -> PyResult<&'py PyDict> {
    let dict = PyDict::new(py);
    dict.set_item("response", &result.response)?;
    dict.set_item("intent", &result.intent)?;
    dict.set_item("confidence", result.confidence.as_str())?;
    Ok(dict)
}

fn message_to_dict<'py>(py: Python<'py>, m: &Message) -> PyResult<&'py PyDict> {
    let dict = PyDict::new(py);
    dict.set_item("id", m.id)?;
    dict.set_item("session_id", &m.session_id)?;
    dict.set_item("timestamp", &m.timestamp)?;
    dict.set_item("role", m.role.as_str())?;
    dict.set_item("message", &m.message)?;
    dict.set_item("intent", m.intent.as_deref())?;
    dict.set_item("confidence", m.confidence.map(|c| c.as_str()))?;
    Ok(dict)
}

fn open_database(db_path: Option<&str>) -> PyResult<ConversationDatabase> {
    match db_path {
        Some(":memory:") => ConversationDatabase::new_in_memory(),
        Some(path) => ConversationDatabase::open(&PathBuf::from(path), supportbot::config::DEFAULT_POOL_SIZE),
        None => ConversationDatabase::open(
            &PathBuf::from(supportbot::config::DEFAULT_DB_PATH),
            supportbot::config::DEFAULT_POOL_SIZE,
        ),
    }
    .map_err(storage_err)
}

/// Direct access to the persisted conversation log.
#[pyclass]
pub struct ConversationLog {
    db: Arc<ConversationDatabase>,
}

#[pymethods]
impl ConversationLog {
    #[new]
    #[pyo3(signature = (db_path=None))]
    fn new(db_path: Option<&str>) -> PyResult<Self> {
        Ok(ConversationLog {
            db: Arc::new(open_database(db_path)?),
        })
    }

    /// Raises ValueError for an empty `session_id` or an unknown role or
    /// confidence label.
    #[pyo3(signature = (session_id, role, message, intent=None, confidence=None))]
    fn log_message(
        &self,
        py: Python<'_>,
        session_id: &str,
        role: &str,
        message: &str,
        intent: Option<&str>,
        confidence: Option<&str>,
    ) -> PyResult<PyObject> {
        let role: Role = role.parse().map_err(|e| PyValueError::new_err(format!("{}", e)))?;
        let confidence = confidence
            .map(|c| c.parse::<Confidence>())
            .transpose()
            .map_err(|e| PyValueError::new_err(format!("{}", e)))?;

        let logged = self
            .db
            .conversations
            .log_message(MessageParams {
                session_id,
                role,
                message,
                intent,
                confidence,
            })
            .map_err(storage_err)?;
        Ok(message_to_dict(py, &logged)?.into())
    }

    #[pyo3(signature = (limit=supportbot::memory_db::DEFAULT_RECENT_LIMIT))]
    fn fetch_recent_messages(&self, py: Python<'_>, limit: usize) -> PyResult<Vec<PyObject>> {
        let rows = self.db.conversations.fetch_recent_messages(limit).map_err(storage_err)?;
        rows.iter()
            .map(|m| message_to_dict(py, m).map(PyObject::from))
            .collect()
    }

    /// List of (intent, count) tuples, most frequent first.
    fn fetch_intent_counts(&self) -> PyResult<Vec<(String, i64)>> {
        let counts = self.db.conversations.fetch_intent_counts().map_err(storage_err)?;
        Ok(counts.into_iter().map(|c| (c.intent, c.count)).collect())
    }

    fn fetch_totals(&self, py: Python<'_>) -> PyResult<PyObject> {
        let totals = self.db.conversations.fetch_totals().map_err(storage_err)?;
        let dict = PyDict::new(py);
        dict.set_item("total_messages", totals.total_messages)?;
        dict.set_item("total_sessions", totals.total_sessions)?;
        dict.set_item("user_messages", totals.user_messages)?;
        dict.set_item("bot_messages", totals.bot_messages)?;
        Ok(dict.into())
    }

    #[pyo3(signature = (limit=supportbot::memory_db::DEFAULT_SESSION_LIMIT))]
    fn fetch_session_stats(&self, py: Python<'_>, limit: usize) -> PyResult<Vec<PyObject>> {
        let sessions = self.db.conversations.fetch_session_stats(limit).map_err(storage_err)?;
        sessions
            .iter()
            .map(|s| -> PyResult<PyObject> {
                let dict = PyDict::new(py);
                dict.set_item("session_id", &s.session_id)?;
                dict.set_item("started_at", &s.started_at)?;
                dict.set_item("message_count", s.message_count)?;
                Ok(dict.into())
            })
            .collect()
    }

    fn clear_all(&self) -> PyResult<()> {
        self.db.conversations.clear_all().map_err(storage_err)
    }
}

/// Classifier plus conversation log, one call per chat turn.
#[pyclass]
pub struct SupportBot {
    inner: supportbot::SupportBot,
}

#[pymethods]
impl SupportBot {
    #[new]
    #[pyo3(signature = (db_path=None, knowledge_path=None, seed=None))]
    fn new(db_path: Option<&str>, knowledge_path: Option<&str>, seed: Option<u64>) -> PyResult<Self> {
        let knowledge = match knowledge_path {
            Some(path) => supportbot::KnowledgeBase::from_path(&PathBuf::from(path)),
            None => supportbot::KnowledgeBase::builtin(),
        }
        .map_err(|e| PyValueError::new_err(format!("Invalid knowledge base: {}", e)))?;

        let chatbot = supportbot::Chatbot::new(Arc::new(knowledge), Arc::new(supportbot::TextNormalizer::new()));
        let db = Arc::new(open_database(db_path)?);

        Ok(SupportBot {
            inner: supportbot::SupportBot::new(chatbot, db, seed),
        })
    }

    #[staticmethod]
    fn new_session_id() -> String {
        supportbot::new_session_id()
    }

    /// Classify without logging.
    fn classify(&self, py: Python<'_>, message: &str) -> PyResult<PyObject> {
        let result = self.inner.classify(message);
        Ok(result_to_dict(py, &result)?.into())
    }

    /// Classify and log both sides of the turn. Raises ValueError for an
    /// empty `session_id`; nothing is logged in that case.
    fn respond(&self, py: Python<'_>, session_id: &str, message: &str) -> PyResult<PyObject> {
        let result = self.inner.respond(session_id, message).map_err(storage_err)?;
        Ok(result_to_dict(py, &result)?.into())
    }

    fn intents(&self) -> Vec<String> {
        self.inner
            .chatbot()
            .knowledge()
            .entries()
            .iter()
            .map(|e| e.intent.clone())
            .collect()
    }
}

#[pymodule]
fn supportbot_py(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<SupportBot>()?;
    m.add_class::<ConversationLog>()?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
