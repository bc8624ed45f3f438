//! Owner-scoped private notes.
//!
//! Every query carries `owner = ? AND is_shared = 0`, so a partition can
//! only ever see or delete its own rows.  Envelopes are immutable: there is
//! no update, an edit is a delete plus a fresh save.

use chrono::Utc;
use cn_crypto::OwnerId;
use sqlx::SqlitePool;
use tracing::debug;

use crate::{error::StoreError, models::NoteRow};

#[derive(Clone)]
pub struct VaultStore {
    pool: SqlitePool,
}

impl VaultStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a private note and return its id.
    pub async fn save(&self, envelope: &str, owner: &OwnerId) -> Result<i64, StoreError> {
        let id = sqlx::query(
            "INSERT INTO notes (content, owner, is_shared, created_at) VALUES (?, ?, 0, ?)",
        )
        .bind(envelope)
        .bind(owner.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!(id, owner = owner.short(), "note saved");
        Ok(id)
    }

    /// All private notes of `owner`, newest first.
    pub async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<NoteRow>, StoreError> {
        let rows = sqlx::query_as::<_, NoteRow>(
            "SELECT id, content, owner, is_shared, public_id, created_at
             FROM notes
             WHERE is_shared = 0 AND owner = ?
             ORDER BY id DESC",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Delete note `id` if it belongs to `owner`.
    ///
    /// A missing id and another owner's id are both silent no-ops; callers
    /// cannot tell them apart.
    pub async fn delete_by_owner_and_id(&self, owner: &OwnerId, id: i64) -> Result<(), StoreError> {
        let affected = sqlx::query("DELETE FROM notes WHERE id = ? AND owner = ? AND is_shared = 0")
            .bind(id)
            .bind(owner.as_str())
            .execute(&self.pool)
            .await?
            .rows_affected();

        debug!(id, owner = owner.short(), affected, "note delete");
        Ok(())
    }
}
