//! Project database operations

use crate::models::Project;
use anyhow::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Insert a new project (level 1)
pub async fn create_project(pool: &SqlitePool, project: &Project) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO projects (id, name, wallet_address, level, description, contact_email, social_shared)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(project.id.to_string())
    .bind(&project.name)
    .bind(&project.wallet_address)
    .bind(project.level)
    .bind(&project.description)
    .bind(&project.contact_email)
    .bind(project.social_shared as i64)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a project by id
pub async fn get_project(pool: &SqlitePool, project_id: Uuid) -> Result<Option<Project>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, wallet_address, level, description, contact_email,
               social_shared, created_at, updated_at
        FROM projects
        WHERE id = ?
        "#,
    )
    .bind(project_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(project_from_row).transpose()
}

/// List all projects, newest first
pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<Project>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, wallet_address, level, description, contact_email,
               social_shared, created_at, updated_at
        FROM projects
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(project_from_row).collect()
}

/// Ids of all projects with a linked guild (reconciliation sweep input)
pub async fn list_projects_with_guild(pool: &SqlitePool) -> Result<Vec<(Uuid, String)>> {
    let rows = sqlx::query(
        r#"
        SELECT p.id, m.guild_id
        FROM projects p
        JOIN community_metrics m ON m.project_id = p.id
        WHERE m.guild_id IS NOT NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let id_str: String = row.get("id");
            let guild_id: String = row.get("guild_id");
            Ok((Uuid::parse_str(&id_str)?, guild_id))
        })
        .collect()
}

/// Update mutable project fields (name/description/contact email)
pub async fn update_project(
    pool: &SqlitePool,
    project_id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
    contact_email: Option<&str>,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE projects
        SET name = COALESCE(?, name),
            description = COALESCE(?, description),
            contact_email = COALESCE(?, contact_email),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(contact_email)
    .bind(project_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a project and (via FK cascade) its metrics, ledger, and assets
pub async fn delete_project(pool: &SqlitePool, project_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(project_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Record that the project shared itself on the social platform (one-way)
pub async fn set_social_shared(pool: &SqlitePool, project_id: Uuid) -> Result<()> {
    sqlx::query(
        "UPDATE projects SET social_shared = 1, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
    )
    .bind(project_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

fn project_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Project> {
    let id_str: String = row.get("id");
    let social_shared: i64 = row.get("social_shared");

    Ok(Project {
        id: Uuid::parse_str(&id_str)?,
        name: row.get("name"),
        wallet_address: row.get("wallet_address"),
        level: row.get("level"),
        description: row.get("description"),
        contact_email: row.get("contact_email"),
        social_shared: social_shared != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
