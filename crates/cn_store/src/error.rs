use thiserror::Error;

/// Persistence failures.  Anything here is a real server-side fault,
/// never an "unknown id" or "wrong owner" outcome.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Could not allocate a unique share id after {0} attempts")]
    ShareIdExhausted(u32),
}
