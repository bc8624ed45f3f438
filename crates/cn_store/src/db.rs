//! Database abstraction over SQLite via sqlx.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use tracing::info;

use crate::{error::StoreError, notes::VaultStore, share::ShareBroker};

/// Concurrent writers wait this long for the SQLite write lock before
/// the operation is reported as a storage failure.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Central store handle.  Cheap to clone (Arc internally).
#[derive(Clone)]
pub struct Store {
    pub pool: SqlitePool,
}

impl Store {
    /// Open (or create) the SQLite database at `db_path`.
    /// Runs all pending migrations automatically.
    ///
    /// WAL journal mode is configured at connection time here, NOT inside a
    /// migration, because SQLite forbids changing `journal_mode` inside a
    /// transaction and sqlx wraps every migration in one.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePool::connect_with(opts).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;

        info!(path = %db_path.display(), "note store opened");
        Ok(Self { pool })
    }

    /// Owner-scoped private notes.
    pub fn vault(&self) -> VaultStore {
        VaultStore::new(self.pool.clone())
    }

    /// One-time shares.
    pub fn shares(&self) -> ShareBroker {
        ShareBroker::new(&self.vault())
    }
}
