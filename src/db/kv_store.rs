//! Queries against the `kv_store` table.

use crate::db::pool::DbPool;
use crate::error::AppError;

/// Get the value stored under `key`.
pub async fn get_value(pool: &DbPool, key: &str) -> Result<Option<String>, AppError> {
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(value,)| value))
}

/// Insert or replace the value stored under `key`.
pub async fn set_value(pool: &DbPool, key: &str, value: &str) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO kv_store (key, value, updated_at)
        VALUES (?, ?, strftime('%s', 'now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete the value stored under `key`. Missing keys are not an error.
pub async fn delete_value(pool: &DbPool, key: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM kv_store WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(())
}

/// List keys starting with `prefix`, sorted.
pub async fn keys_with_prefix(pool: &DbPool, prefix: &str) -> Result<Vec<String>, AppError> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT key FROM kv_store WHERE substr(key, 1, length(?)) = ? ORDER BY key")
            .bind(prefix)
            .bind(prefix)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(key,)| key).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_set_get_delete() {
        let dir = tempdir().unwrap();
        let pool = crate::db::initialize(&dir.path().join("test.db")).await.unwrap();

        assert_eq!(get_value(&pool, "rfcs").await.unwrap(), None);

        set_value(&pool, "rfcs", "[]").await.unwrap();
        set_value(&pool, "rfcs", "[1]").await.unwrap();
        assert_eq!(get_value(&pool, "rfcs").await.unwrap().as_deref(), Some("[1]"));

        delete_value(&pool, "rfcs").await.unwrap();
        delete_value(&pool, "rfcs").await.unwrap();
        assert_eq!(get_value(&pool, "rfcs").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_with_prefix() {
        let dir = tempdir().unwrap();
        let pool = crate::db::initialize(&dir.path().join("test.db")).await.unwrap();

        set_value(&pool, "rfcs", "[]").await.unwrap();
        set_value(&pool, "rfc_2", "{}").await.unwrap();
        set_value(&pool, "rfc_1", "{}").await.unwrap();

        let keys = keys_with_prefix(&pool, "rfc_").await.unwrap();
        assert_eq!(keys, vec!["rfc_1", "rfc_2"]);
    }
}
