//! Database initialization
//!
//! Opens (or creates) grove.db and applies the schema. Every table uses
//! CREATE TABLE IF NOT EXISTS so startup is idempotent across restarts
//! and safe with multiple portal replicas pointed at the same file.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode: concurrent readers with one writer, needed because the
    // webhook handler, the reconciliation sweep, and user requests all
    // touch the same records
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create the Grove schema (idempotent)
///
/// Also used directly by tests against in-memory pools.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            wallet_address TEXT NOT NULL,
            level INTEGER NOT NULL DEFAULT 1,
            description TEXT,
            contact_email TEXT,
            social_shared INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS community_metrics (
            project_id TEXT PRIMARY KEY REFERENCES projects(id) ON DELETE CASCADE,
            guild_id TEXT,
            guild_name TEXT,
            member_count INTEGER NOT NULL DEFAULT 0,
            messages_count INTEGER NOT NULL DEFAULT 0,
            papers_shared INTEGER NOT NULL DEFAULT 0,
            quality_score INTEGER NOT NULL DEFAULT 0,
            bot_linked INTEGER NOT NULL DEFAULT 0,
            verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Idempotency ledger: one row per counted activity, keyed by the
    // platform message identifier
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS activity_log (
            activity_id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            category TEXT NOT NULL,
            confidence INTEGER NOT NULL DEFAULT 0,
            counted_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS assets (
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            tx_id TEXT NOT NULL,
            minted_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (project_id, kind)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Second guard beyond the level CAS: at most one notification row
    // per (project, level)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS level_notifications (
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            level INTEGER NOT NULL,
            notified_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (project_id, level)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chat_messages (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_activity_log_project ON activity_log(project_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_chat_messages_project ON chat_messages(project_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_creation_is_idempotent() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        create_tables(&pool).await.unwrap();
        // Second pass must not fail
        create_tables(&pool).await.unwrap();

        sqlx::query("INSERT INTO projects (id, name, wallet_address) VALUES ('p1', 'Test', '0xabc')")
            .execute(&pool)
            .await
            .unwrap();
    }
}
