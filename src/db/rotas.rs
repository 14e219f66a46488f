//! Rota queries.
//!
//! All functions run on a connection borrowed from a caller-owned transaction.

use chrono::Utc;
use sqlx::{Row, SqliteConnection};

use crate::errors::AppError;
use crate::models::{Rota, SaveRotaParams};

/// Insert a new rota when `params.rota_id` is empty, otherwise update name and
/// metadata of the existing one. Returns the rota ID.
///
/// A name already used in the same team and channel yields `AlreadyExists`;
/// updating an unknown ID yields `NotFound`.
pub async fn create_or_update(
    conn: &mut SqliteConnection,
    params: &SaveRotaParams,
) -> Result<String, AppError> {
    let result = if params.rota_id.is_empty() {
        insert(conn, params).await
    } else {
        update(conn, params).await
    };

    result.inspect_err(|e| match e {
        AppError::AlreadyExists(_) => tracing::info!(
            team_id = %params.team_id,
            channel_id = %params.channel_id,
            name = %params.name,
            "rota_name_taken"
        ),
        _ => tracing::debug!(rota_id = %params.rota_id, error = %e, "failed_to_save_rota"),
    })
}

async fn insert(conn: &mut SqliteConnection, params: &SaveRotaParams) -> Result<String, AppError> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let metadata = serde_json::to_string(&params.metadata)?;

    sqlx::query(
        "INSERT INTO rotas (id, team_id, channel_id, name, metadata, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&params.team_id)
    .bind(&params.channel_id)
    .bind(&params.name)
    .bind(&metadata)
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    Ok(id)
}

async fn update(conn: &mut SqliteConnection, params: &SaveRotaParams) -> Result<String, AppError> {
    let now = Utc::now().to_rfc3339();
    let metadata = serde_json::to_string(&params.metadata)?;

    let result = sqlx::query("UPDATE rotas SET name = ?, metadata = ?, updated_at = ? WHERE id = ?")
        .bind(&params.name)
        .bind(&metadata)
        .bind(&now)
        .bind(&params.rota_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Rota {} not found",
            params.rota_id
        )));
    }

    Ok(params.rota_id.clone())
}

/// Get a rota by ID.
pub async fn find_by_id(conn: &mut SqliteConnection, id: &str) -> Result<Rota, AppError> {
    let row = sqlx::query(
        "SELECT id, team_id, channel_id, name, metadata, created_at, updated_at FROM rotas WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let row = row.ok_or_else(|| AppError::NotFound(format!("Rota {} not found", id)))?;
    rota_from_row(&row)
}

/// List the rotas of a channel, sorted by name.
pub async fn list_by_channel(
    conn: &mut SqliteConnection,
    channel_id: &str,
    team_id: &str,
) -> Result<Vec<Rota>, AppError> {
    let rows = sqlx::query(
        "SELECT id, team_id, channel_id, name, metadata, created_at, updated_at FROM rotas WHERE channel_id = ? AND team_id = ? ORDER BY name",
    )
    .bind(channel_id)
    .bind(team_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.iter().map(rota_from_row).collect()
}

/// User IDs of a rota's members, in the order they were added.
pub async fn list_member_user_ids(
    conn: &mut SqliteConnection,
    rota_id: &str,
) -> Result<Vec<String>, AppError> {
    let rows = sqlx::query("SELECT user_id FROM members WHERE rota_id = ? ORDER BY created_at, rowid")
        .bind(rota_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.iter().map(|row| row.get("user_id")).collect())
}

fn rota_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Rota, AppError> {
    let id: String = row.get("id");
    let metadata: String = row.get("metadata");
    let metadata = serde_json::from_str(&metadata).map_err(|e| {
        AppError::Database(format!("Corrupt metadata for rota {}: {}", id, e))
    })?;

    Ok(Rota {
        id,
        team_id: row.get("team_id"),
        channel_id: row.get("channel_id"),
        name: row.get("name"),
        metadata,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
