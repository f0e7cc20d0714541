use rusqlite::{Connection, Result};
use tracing::debug;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.configure_pragmas()?;
        db.migrate_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.configure_pragmas()?;
        db.migrate_schema()?;
        Ok(db)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured (WAL mode)");
        Ok(())
    }

    /// Check schema version and migrate if needed.
    /// Version < 1: drop all tables and recreate (records are re-acquirable).
    fn migrate_schema(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version < 1 {
            debug!(
                "Schema version {} < 1, dropping all tables and recreating",
                version
            );
            self.conn.execute_batch(
                "DROP TABLE IF EXISTS extension_pref;
                 DROP TABLE IF EXISTS access_grant;",
            )?;
        }

        self.conn.execute_batch(include_str!("schema.sql"))?;
        debug!("SQLite schema initialized (version 1)");
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Flush the WAL into the main database file.
    pub fn checkpoint(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }

    pub fn truncate_all(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM extension_pref;
             DELETE FROM access_grant;",
        )?;
        debug!("All tables truncated");
        Ok(())
    }
}
