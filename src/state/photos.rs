use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Result as SqlResult};
use std::path::{Path, PathBuf};
use tracing::info;

use super::data::PhotoRecord;
use super::settings;
use crate::error::{Result, RosterError};

/// The PhotoCache stores one user-picked photo per locomotive id
/// in a small SQLite database. Records are only ever overwritten.
pub struct PhotoCache {
    conn: Connection,
    db_path: PathBuf,
}

impl PhotoCache {
    /// Open the photo database in the user's data directory:
    /// - Linux: ~/.local/share/loco-roster/photos.db
    /// - macOS: ~/Library/Application Support/loco-roster/photos.db
    /// - Windows: %APPDATA%\loco-roster\photos.db
    pub fn new() -> Result<Self> {
        Self::open(&settings::data_dir().join("photos.db"))
    }

    /// Open or create the database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RosterError::StorageUnavailable(e.to_string()))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| RosterError::StorageUnavailable(e.to_string()))?;

        let cache = PhotoCache {
            conn,
            db_path: db_path.to_path_buf(),
        };
        cache.init_schema()?;

        info!("📁 Photo cache at: {}", cache.path().display());
        Ok(cache)
    }

    /// In-memory database, nothing survives the process
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let cache = PhotoCache {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    /// One fixed table, keyed by locomotive id
    fn init_schema(&self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS photos (
                id              TEXT PRIMARY KEY,
                blob            BLOB NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Number of stored photos
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Insert or overwrite the photo for `id`
    pub fn put(&self, id: &str, blob: &[u8]) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO photos (id, blob, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET blob = excluded.blob, updated_at = excluded.updated_at",
                rusqlite::params![id, blob, Utc::now().timestamp()],
            )
            .map_err(|e| RosterError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }

    /// The stored photo for `id`; an id never written is `Ok(None)`
    pub fn get(&self, id: &str) -> Result<Option<PhotoRecord>> {
        let record = self
            .conn
            .query_row("SELECT id, blob FROM photos WHERE id = ?1", [id], |row| {
                Ok(PhotoRecord {
                    locomotive_id: row.get(0)?,
                    image_blob: row.get(1)?,
                })
            })
            .optional()?;
        Ok(record)
    }
}

impl std::fmt::Debug for PhotoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoCache")
            .field("db_path", &self.db_path)
            .finish()
    }
}
