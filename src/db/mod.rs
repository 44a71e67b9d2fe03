//! Database layer for local SQLite storage.
//!
//! The engine only needs a key-value table; this module owns the connection
//! pool, the migrations that create that table, and the queries against it.

pub mod kv_store;
pub mod pool;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Database-related errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Migrations in application order, by name.
const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_kv_store",
    include_str!("migrations/0001_kv_store.sql"),
)];

/// Get the path to the SQLite database file inside a data directory.
pub fn get_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("rfc-assembler.db")
}

/// Initialize the database: create the file if needed and run migrations.
pub async fn initialize(db_path: &Path) -> Result<pool::DbPool, DbError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            DbError::Migration(format!("Failed to create database directory: {}", e))
        })?;
    }

    let pool = pool::create_pool(db_path).await?;
    run_migrations(&pool).await?;

    Ok(pool)
}

/// Apply every migration not yet recorded in `_migrations`.
async fn run_migrations(pool: &pool::DbPool) -> Result<(), DbError> {
    let mut conn = pool.acquire().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: Option<(i64,)> = sqlx::query_as("SELECT id FROM _migrations WHERE name = ?")
            .bind(*name)
            .fetch_optional(&mut *conn)
            .await?;
        if applied.is_some() {
            continue;
        }

        log::info!("Applying migration {}", name);
        for statement in split_statements(sql) {
            sqlx::query(&statement)
                .execute(&mut *conn)
                .await
                .map_err(|e| DbError::Migration(format!("{}: {}", name, e)))?;
        }

        sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
            .bind(*name)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Split a migration script into statements.
///
/// `--` comments are dropped and `;` only ends a statement outside parentheses
/// and string literals.
fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;

    for line in sql.lines() {
        let code = match line.find("--") {
            Some(idx) if !in_string => &line[..idx],
            _ => line,
        };

        for ch in code.chars() {
            match ch {
                '\'' => in_string = !in_string,
                '(' if !in_string => depth += 1,
                ')' if !in_string => depth = depth.saturating_sub(1),
                ';' if !in_string && depth == 0 => {
                    let stmt = current.trim();
                    if !stmt.is_empty() {
                        statements.push(stmt.to_string());
                    }
                    current.clear();
                    continue;
                }
                _ => {}
            }
            current.push(ch);
        }
        current.push(' ');
    }

    let tail = current.trim();
    if !tail.is_empty() {
        statements.push(tail.to_string());
    }

    statements
}
