//! Burn-after-read shares.
//!
//! A share is a note row with `is_shared = 1`, no owner and a random
//! `public_id`.  Consumption is ONE statement:
//!
//! ```sql
//! DELETE FROM notes WHERE public_id = ? AND is_shared = 1 RETURNING content
//! ```
//!
//! SQLite applies the delete on the first step, under its write lock, so
//! of N concurrent consumers exactly one gets the row back and the rest see
//! nothing.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use rand::RngCore;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::{error::StoreError, notes::VaultStore};

/// Random bytes per public id (128 bits, 22 base64url chars).
pub const PUBLIC_ID_BYTES: usize = 16;

const MAX_ID_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct ShareBroker {
    pool: SqlitePool,
}

impl ShareBroker {
    pub fn new(vault: &VaultStore) -> Self {
        Self { pool: vault.pool().clone() }
    }

    /// Store `envelope` as a one-time share and return its public id.
    pub async fn publish(&self, envelope: &str) -> Result<String, StoreError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let public_id = generate_public_id();
            let res = sqlx::query(
                "INSERT INTO notes (content, owner, is_shared, public_id, created_at) VALUES (?, NULL, 1, ?, ?)",
            )
            .bind(envelope)
            .bind(&public_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await;

            match res {
                Ok(done) => {
                    debug!(id = done.last_insert_rowid(), "share published");
                    return Ok(public_id);
                }
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::ShareIdExhausted(MAX_ID_ATTEMPTS))
    }

    /// Read and destroy the share in one step.
    ///
    /// `None` covers unknown, already consumed and malformed ids alike.
    pub async fn consume(&self, public_id: &str) -> Result<Option<String>, StoreError> {
        let content = sqlx::query_scalar::<_, String>(
            "DELETE FROM notes WHERE public_id = ? AND is_shared = 1 RETURNING content",
        )
        .bind(public_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .next();

        if content.is_some() {
            info!("share burned");
        }
        Ok(content)
    }
}

fn generate_public_id() -> String {
    let mut bytes = [0u8; PUBLIC_ID_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_ids_are_url_safe_and_long() {
        let id = generate_public_id();
        assert_eq!(id.len(), 22);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(id, generate_public_id());
    }
}
