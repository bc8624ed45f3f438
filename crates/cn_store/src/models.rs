//! Database row models; these map to/from SQL rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NoteRow {
    pub id: i64,
    /// Opaque passphrase envelope (see `cn_crypto::envelope`).
    pub content: String,
    /// Hex owner id; `None` on share records.
    pub owner: Option<String>,
    pub is_shared: bool,
    /// Unguessable lookup key, present only on share records.
    pub public_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
