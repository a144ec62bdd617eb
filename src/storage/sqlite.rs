use std::path::Path;

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use crate::error::StorageError;

use super::records::RecordStore;

/// Durable store backed by a single SQLite file.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database and its tables.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be opened or the schema cannot
    /// be created.
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)
            .await
            .map_err(|err| StorageError::Sqlite {
                context: "open sqlite db",
                source: err,
            })?;
        Self::init(conn).await
    }

    /// # Errors
    ///
    /// Returns an error when the schema cannot be created.
    pub async fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|err| StorageError::Sqlite {
                context: "open sqlite db",
                source: err,
            })?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS records (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS task_index (
                    run_id TEXT NOT NULL,
                    task_id TEXT NOT NULL,
                    position INTEGER NOT NULL,
                    PRIMARY KEY (run_id, task_id)
                );",
            )?;
            Ok(())
        })
        .await
        .map_err(|err| StorageError::Sqlite {
            context: "create sqlite schema",
            source: err,
        })?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl RecordStore for SqliteStorage {
    async fn put(&self, key: String, value: String) -> Result<(), StorageError> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO records (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    rusqlite::params![key, value],
                )?;
                Ok(())
            })
            .await
            .map_err(|err| StorageError::Sqlite {
                context: "write record",
                source: err,
            })
    }

    async fn fetch(&self, key: String) -> Result<Option<String>, StorageError> {
        self.conn
            .call(move |conn| {
                let value = conn
                    .query_row(
                        "SELECT value FROM records WHERE key = ?1",
                        rusqlite::params![key],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await
            .map_err(|err| StorageError::Sqlite {
                context: "read record",
                source: err,
            })
    }

    async fn add_task_id(&self, run_id: String, task_id: String) -> Result<(), StorageError> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT OR IGNORE INTO task_index (run_id, task_id, position)
                     VALUES (?1, ?2, (SELECT COUNT(*) FROM task_index WHERE run_id = ?1))",
                    rusqlite::params![run_id, task_id],
                )?;
                Ok(())
            })
            .await
            .map_err(|err| StorageError::Sqlite {
                context: "index task",
                source: err,
            })
    }

    async fn task_ids(&self, run_id: String) -> Result<Vec<String>, StorageError> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT task_id FROM task_index WHERE run_id = ?1 ORDER BY position",
                )?;
                let rows = stmt.query_map(rusqlite::params![run_id], |row| row.get::<_, String>(0))?;
                let mut ids = Vec::new();
                for row in rows {
                    ids.push(row?);
                }
                Ok(ids)
            })
            .await
            .map_err(|err| StorageError::Sqlite {
                context: "read task index",
                source: err,
            })
    }
}
