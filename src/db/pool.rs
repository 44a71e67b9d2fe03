//! SQLite connection pool.
//!
//! The store is written by one editing session at a time, so a small pool in
//! WAL mode is enough: the dashboard can read while autosave writes.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::time::Duration;

/// Type alias for the SQLite connection pool.
pub type DbPool = Pool<Sqlite>;

/// Maximum pooled connections.
const MAX_CONNECTIONS: u32 = 4;

/// Create a connection pool for the database file at `db_path`.
///
/// The file is created if missing; its parent directory must exist.
pub async fn create_pool(db_path: &Path) -> Result<DbPool, sqlx::Error> {
    let connect_options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(10));

    SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_pool_with_wal() {
        let dir = tempdir().unwrap();
        let pool = create_pool(&dir.path().join("test.db")).await.unwrap();

        let mode: (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode.0.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_missing_parent_directory_fails() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("missing/test.db");

        assert!(create_pool(&db_path).await.is_err());
    }
}
