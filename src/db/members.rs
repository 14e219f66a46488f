//! Rota membership reconciliation.
//!
//! The desired member list submitted by the user is authoritative: members missing
//! from it are deleted, new ones inserted, and members present on both sides are
//! left alone.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqliteConnection;

use super::rotas;
use crate::errors::AppError;

/// Changes needed to turn the current member list into the desired one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    pub to_remove: Vec<String>,
    pub to_add: Vec<String>,
}

impl MembershipDiff {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }
}

/// Compute the membership diff. Only set membership matters; duplicates in
/// `desired` are collapsed and output follows first appearance.
pub fn plan(current: &[String], desired: &[String]) -> MembershipDiff {
    let current_set: HashSet<&str> = current.iter().map(String::as_str).collect();
    let desired_set: HashSet<&str> = desired.iter().map(String::as_str).collect();

    let to_remove = current
        .iter()
        .filter(|user_id| !desired_set.contains(user_id.as_str()))
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let to_add = desired
        .iter()
        .filter(|user_id| !current_set.contains(user_id.as_str()))
        .filter(|user_id| seen.insert(user_id.as_str()))
        .cloned()
        .collect();

    MembershipDiff { to_remove, to_add }
}

/// Bring the members of `rota_id` in line with `desired`.
///
/// Must run inside a transaction: the first failing statement aborts the call and
/// the caller is expected to roll back, so a half-applied diff is never committed.
pub async fn reconcile(
    conn: &mut SqliteConnection,
    rota_id: &str,
    desired: &[String],
) -> Result<MembershipDiff, AppError> {
    let current = rotas::list_member_user_ids(conn, rota_id)
        .await
        .inspect_err(|e| tracing::debug!(rota_id, error = %e, "unable_to_fetch_existing_members"))?;

    let diff = plan(&current, desired);

    for user_id in &diff.to_remove {
        delete_member(conn, rota_id, user_id).await.inspect_err(|e| {
            tracing::debug!(rota_id, user_id = %user_id, error = %e, "unable_to_delete_member")
        })?;
    }

    for user_id in &diff.to_add {
        insert_member(conn, rota_id, user_id).await.inspect_err(|e| {
            tracing::debug!(rota_id, user_id = %user_id, error = %e, "unable_to_add_member")
        })?;
    }

    if !diff.is_empty() {
        tracing::debug!(
            rota_id,
            removed = diff.to_remove.len(),
            added = diff.to_add.len(),
            "reconciled_members"
        );
    }

    Ok(diff)
}

async fn insert_member(
    conn: &mut SqliteConnection,
    rota_id: &str,
    user_id: &str,
) -> Result<(), AppError> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO members (id, rota_id, user_id, metadata, created_at, updated_at) VALUES (?, ?, ?, '{}', ?, ?)",
    )
    .bind(&id)
    .bind(rota_id)
    .bind(user_id)
    .bind(&now)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn delete_member(
    conn: &mut SqliteConnection,
    rota_id: &str,
    user_id: &str,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM members WHERE rota_id = ? AND user_id = ?")
        .bind(rota_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
