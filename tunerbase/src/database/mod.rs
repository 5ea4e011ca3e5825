//! Database module for tuning configuration storage.
//!
//! This module provides SQLite-based persistent storage for:
//! - Capture cards and their default input
//! - Card inputs (source, start channel, external changer)
//! - Channel lineups per source
//!
//! [`Database`] implements [`InputStore`](crate::store::InputStore), so a
//! session can load and store its inputs through it directly.

mod card;
mod channel;
mod input;
mod models;
mod schema;
mod store;

pub use models::*;

use std::path::Path;

use log::debug;
use rusqlite::{Connection, Result as SqliteResult};
use thiserror::Error;

/// Database error types.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Capture card not found: {0}")]
    CardNotFound(u32),

    #[error("Input not found: card={card_id}, name={name}")]
    InputNotFound { card_id: u32, name: String },

    #[error("Channel not found: {0}")]
    ChannelNotFound(u32),

    #[error("Database path error: {0}")]
    PathError(String),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Main database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the specified path.
    ///
    /// Missing parent directories are created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| DatabaseError::PathError(format!("{}: {}", parent.display(), e)))?;
        }

        let conn = Connection::open(path)?;

        // Enable foreign keys
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self { conn };
        db.initialize_schema()?;
        debug!("Opened database {}", path.display());

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA_SQL)?;
        Ok(())
    }

    /// Get the underlying connection (for advanced queries).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction.
    pub fn transaction(&mut self) -> SqliteResult<rusqlite::Transaction<'_>> {
        self.conn.transaction()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.connection().is_autocommit());
    }

    #[test]
    fn test_schema_creation() {
        let db = Database::open_in_memory().unwrap();

        let count: i32 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('capture_cards', 'card_inputs', 'channels')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 3);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = std::env::temp_dir().join(format!("tunerbase-db-{}", std::process::id()));
        let path = dir.join("nested").join("tunerbase.db");

        let db = Database::open(&path).unwrap();
        drop(db);
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
