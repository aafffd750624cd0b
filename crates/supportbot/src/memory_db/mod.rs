//! Memory database module - SQLite-backed conversation log and session counters
pub mod conversation_store;
pub mod error;
pub mod migration;
pub mod schema;
pub use conversation_store::{ConversationStore, MessageParams};
pub use error::{StorageError, StorageResult};
pub use migration::MigrationManager;
pub use schema::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the connection pool and hands it to the stores.
pub struct ConversationDatabase {
    pub conversations: ConversationStore,
    pool: Arc<Pool<SqliteConnectionManager>>,
    on_disk: bool,
}
impl ConversationDatabase {
    /// Open (or create) the database file and run `init`.
    pub fn open(db_path: &Path, pool_size: u32) -> StorageResult<Self> {
        info!("Opening conversation database at: {}", db_path.display());
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let manager = SqliteConnectionManager::file(db_path)
            .with_flags(
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_FULL_MUTEX,
            )
            .with_init(|conn| {
                conn.busy_timeout(BUSY_TIMEOUT)?;
                conn.execute_batch("PRAGMA synchronous = NORMAL;")
            });
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .build(manager)?;

        {
            let conn = pool.get()?;
            let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
            info!("SQLite journal mode: {}", mode);
        }
        let db = Self::from_pool(pool, true);
        db.init()?;
        info!("Conversation database initialized successfully");
        Ok(db)
    }
    /// A private in-memory database. The pool holds a single connection
    /// because every SQLite memory connection is its own database.
    pub fn new_in_memory() -> StorageResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)?;
        let db = Self::from_pool(pool, false);
        db.init()?;
        Ok(db)
    }
    fn from_pool(pool: Pool<SqliteConnectionManager>, on_disk: bool) -> Self {
        let pool = Arc::new(pool);
        Self {
            conversations: ConversationStore::new(Arc::clone(&pool)),
            pool,
            on_disk,
        }
    }
    /// Ensure both tables exist. Idempotent; never drops data.
    pub fn init(&self) -> StorageResult<()> {
        let mut conn = self.pool.get()?;
        let mut migrator = MigrationManager::new(&mut conn);
        migrator.initialize_database()?;
        Ok(())
    }
    pub fn schema_version(&self) -> StorageResult<i32> {
        let mut conn = self.pool.get()?;
        let migrator = MigrationManager::new(&mut conn);
        Ok(migrator.get_current_version()?)
    }
}
impl Drop for ConversationDatabase {
    fn drop(&mut self) {

        if !self.on_disk {
            return;
        }
        if let Ok(conn) = self.pool.get() {
            let _ = conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);");
        }
    }
}
