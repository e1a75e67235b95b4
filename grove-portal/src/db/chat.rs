//! Chat history persistence for the LLM relay

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// One persisted chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChatMessage {
    pub id: Uuid,
    pub project_id: Uuid,
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// Append a message to a project's chat history
pub async fn insert_message(
    pool: &SqlitePool,
    project_id: Uuid,
    role: &str,
    content: &str,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO chat_messages (id, project_id, role, content) VALUES (?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(project_id.to_string())
    .bind(role)
    .bind(content)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Most recent messages for a project, oldest first, bounded by `limit`
pub async fn recent_messages(
    pool: &SqlitePool,
    project_id: Uuid,
    limit: u32,
) -> Result<Vec<StoredChatMessage>> {
    let rows = sqlx::query(
        r#"
        SELECT id, project_id, role, content, created_at
        FROM (
            SELECT id, project_id, role, content, created_at
            FROM chat_messages
            WHERE project_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
        )
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(project_id.to_string())
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let id_str: String = row.get("id");
            let project_str: String = row.get("project_id");
            Ok(StoredChatMessage {
                id: Uuid::parse_str(&id_str)?,
                project_id: Uuid::parse_str(&project_str)?,
                role: row.get("role"),
                content: row.get("content"),
                created_at: row.get("created_at"),
            })
        })
        .collect()
}
