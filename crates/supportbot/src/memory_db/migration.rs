//! Database migration system

use rusqlite::{Connection, OptionalExtension, Result, TransactionBehavior};
use tracing::{error, info};

/// Manages database schema migrations
pub struct MigrationManager<'a> {
    conn: &'a mut Connection,
}

impl<'a> MigrationManager<'a> {
    /// Create a new migration manager
    pub fn new(conn: &'a mut Connection) -> Self {
        Self { conn }
    }

    /// Bring the schema up to date. Safe to run on every start and from
    /// several processes at once; existing data is never touched.
    pub fn initialize_database(&mut self) -> Result<()> {
        info!("Initializing conversation database schema...");

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        info!("Current database schema version: {}", self.get_current_version()?);

        self.apply_migrations()
    }

    /// Each migration runs in its own write transaction and re-checks the
    /// version table inside it, so a concurrent initializer cannot apply it twice.
    fn apply_migrations(&mut self) -> Result<()> {
        for (version, migration_sql) in get_migrations() {
            let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let applied = tx
                .query_row("SELECT 1 FROM schema_version WHERE version = ?1", [version], |_| Ok(()))
                .optional()?
                .is_some();
            if applied {
                continue;
            }

            info!("Applying migration {}...", version);
            if let Err(e) = tx.execute_batch(migration_sql) {
                error!("Failed to apply migration {}: {}", version, e);
                return Err(e);
            }
            tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
            tx.commit()?;

            info!("Migration {} applied successfully", version);
        }

        Ok(())
    }

    /// Get current schema version
    pub fn get_current_version(&self) -> Result<i32> {
        self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }

    /// Check if a specific migration has been applied
    pub fn has_migration_applied(&self, version: i32) -> Result<bool> {
        self.conn
            .query_row(
                "SELECT 1 FROM schema_version WHERE version = ?1",
                [version],
                |_| Ok(1),
            )
            .optional()
            .map(|result| result.is_some())
    }
}

/// Get all migration SQL scripts
fn get_migrations() -> Vec<(i32, &'static str)> {
    vec![
        (1, include_str!("migrations/001_initial.sql")),
        (2, include_str!("migrations/002_indexes.sql")),
    ]
}

pub fn latest_version() -> i32 {
    get_migrations().last().map(|(version, _)| *version).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_database_reaches_latest_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        let mut migrator = MigrationManager::new(&mut conn);

        migrator.initialize_database().unwrap();

        assert_eq!(migrator.get_current_version().unwrap(), latest_version());
        assert!(migrator.has_migration_applied(1).unwrap());
        assert!(migrator.has_migration_applied(2).unwrap());
        assert!(!migrator.has_migration_applied(99).unwrap());
    }

    #[test]
    fn test_initialize_is_idempotent_and_keeps_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        MigrationManager::new(&mut conn).initialize_database().unwrap();
        conn.execute(
            "INSERT INTO sessions (session_id, started_at, message_count) VALUES ('s1', '2024-01-01 00:00:00', 3)",
            [],
        )
        .unwrap();

        MigrationManager::new(&mut conn).initialize_database().unwrap();

        let count: i64 = conn
            .query_row("SELECT message_count FROM sessions WHERE session_id = 's1'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);
        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(versions, 2);
    }

    #[test]
    fn test_adopts_tables_created_without_version_table() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT, session_id TEXT NOT NULL,
                timestamp TEXT NOT NULL, role TEXT NOT NULL, message TEXT NOT NULL,
                intent TEXT, confidence TEXT
            );
            INSERT INTO conversations (session_id, timestamp, role, message)
            VALUES ('legacy', '2024-01-01 00:00:00', 'user', 'hi');",
        )
        .unwrap();

        MigrationManager::new(&mut conn).initialize_database().unwrap();

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM conversations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
