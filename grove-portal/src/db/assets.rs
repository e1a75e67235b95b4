//! Minted onboarding asset records

use crate::models::{AssetKind, MintedAsset};
use anyhow::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Record a mint, idempotent per (project, kind).
///
/// Returns the transaction id on record: the freshly minted one, or the
/// previously recorded one if this kind was already minted (a repeated
/// mint request must not create a second asset).
pub async fn record_mint(
    pool: &SqlitePool,
    project_id: Uuid,
    kind: AssetKind,
    tx_id: &str,
) -> Result<String> {
    let result = sqlx::query(
        r#"
        INSERT INTO assets (project_id, kind, tx_id)
        VALUES (?, ?, ?)
        ON CONFLICT (project_id, kind) DO NOTHING
        "#,
    )
    .bind(project_id.to_string())
    .bind(kind.as_str())
    .bind(tx_id)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(tx_id.to_string());
    }

    let existing: String = sqlx::query_scalar(
        "SELECT tx_id FROM assets WHERE project_id = ? AND kind = ?",
    )
    .bind(project_id.to_string())
    .bind(kind.as_str())
    .fetch_one(pool)
    .await?;

    Ok(existing)
}

/// All minted assets for a project
pub async fn get_assets(pool: &SqlitePool, project_id: Uuid) -> Result<Vec<MintedAsset>> {
    let rows = sqlx::query(
        "SELECT project_id, kind, tx_id, minted_at FROM assets WHERE project_id = ? ORDER BY minted_at",
    )
    .bind(project_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .filter_map(|row| {
            let kind_str: String = row.get("kind");
            let id_str: String = row.get("project_id");
            let kind = AssetKind::parse(&kind_str)?;
            let project_id = Uuid::parse_str(&id_str).ok()?;
            Some(Ok(MintedAsset {
                project_id,
                kind,
                tx_id: row.get("tx_id"),
                minted_at: row.get("minted_at"),
            }))
        })
        .collect()
}

/// Onboarding completion flags consumed by the level gate
pub async fn asset_flags(pool: &SqlitePool, project_id: Uuid) -> Result<(bool, bool)> {
    let rows = sqlx::query("SELECT kind FROM assets WHERE project_id = ?")
        .bind(project_id.to_string())
        .fetch_all(pool)
        .await?;

    let mut idea = false;
    let mut vision = false;
    for row in rows {
        let kind: String = row.get("kind");
        match kind.as_str() {
            "idea" => idea = true,
            "vision" => vision = true,
            _ => {}
        }
    }

    Ok((idea, vision))
}
