//! Core operations called by the request router.
//!
//! The router owns transport concerns (methods, paths, header extraction,
//! CORS).  It passes the raw credential it received, or `""` when none was
//! sent, and maps [`ServiceError::status_code`] onto its response.
//!
//! Authentication is whitelist membership of the credential; the owner
//! partition is the SHA-256 of that credential.  Nothing here ever decrypts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cn_crypto::{CredentialWhitelist, OwnerId};
use cn_store::{NoteRow, ShareBroker, Store, StoreError, VaultStore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Credential missing, blank or not whitelisted.  Deliberately carries
    /// no detail about which.
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("envelope exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl ServiceError {
    /// HTTP status the router should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Unauthorized => 401,
            ServiceError::NotFound => 404,
            ServiceError::PayloadTooLarge { .. } => 413,
            ServiceError::Storage(_) => 500,
        }
    }
}

/// One entry of an owner's listing.  Serialises with the field names the
/// browser client reads (`content`, `created_at`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: i64,
    #[serde(rename = "content")]
    pub envelope: String,
    pub created_at: DateTime<Utc>,
}

impl From<NoteRow> for NoteSummary {
    fn from(row: NoteRow) -> Self {
        Self { id: row.id, envelope: row.content, created_at: row.created_at }
    }
}

#[derive(Clone)]
pub struct NotesService {
    vault: VaultStore,
    shares: ShareBroker,
    whitelist: Arc<CredentialWhitelist>,
    max_envelope_bytes: usize,
}

impl NotesService {
    pub fn new(store: &Store, whitelist: CredentialWhitelist, max_envelope_bytes: usize) -> Self {
        Self {
            vault: store.vault(),
            shares: store.shares(),
            whitelist: Arc::new(whitelist),
            max_envelope_bytes,
        }
    }

    /// Open the configured database and build the service around it.
    pub async fn open(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let store = Store::open(&config.database_path).await?;
        info!(admin_keys = config.whitelist.len(), "notes service ready");
        Ok(Self::new(&store, config.whitelist.clone(), config.max_envelope_bytes))
    }

    fn authenticate(&self, credential: &str) -> Result<OwnerId, ServiceError> {
        match self.whitelist.authenticate(credential) {
            Some(owner) => Ok(owner),
            None => {
                warn!("rejected credential");
                Err(ServiceError::Unauthorized)
            }
        }
    }

    fn check_size(&self, envelope: &str) -> Result<(), ServiceError> {
        if envelope.len() > self.max_envelope_bytes {
            return Err(ServiceError::PayloadTooLarge { limit: self.max_envelope_bytes });
        }
        Ok(())
    }

    pub async fn create_private_note(&self, credential: &str, envelope: &str) -> Result<i64, ServiceError> {
        let owner = self.authenticate(credential)?;
        self.check_size(envelope)?;
        Ok(self.vault.save(envelope, &owner).await?)
    }

    /// Every private note of the caller's partition, newest first.  The
    /// caller filters by passphrase client-side.
    pub async fn list_own_notes(&self, credential: &str) -> Result<Vec<NoteSummary>, ServiceError> {
        let owner = self.authenticate(credential)?;
        let rows = self.vault.list_by_owner(&owner).await?;
        debug!(owner = owner.short(), count = rows.len(), "notes listed");
        Ok(rows.into_iter().map(NoteSummary::from).collect())
    }

    /// Succeeds whether or not `id` existed in the caller's partition.
    pub async fn delete_private_note(&self, credential: &str, id: i64) -> Result<(), ServiceError> {
        let owner = self.authenticate(credential)?;
        self.vault.delete_by_owner_and_id(&owner, id).await?;
        Ok(())
    }

    /// Publishing needs a valid credential, but the share itself is not
    /// tied to the publisher's partition.
    pub async fn create_share(&self, credential: &str, envelope: &str) -> Result<String, ServiceError> {
        self.authenticate(credential)?;
        self.check_size(envelope)?;
        Ok(self.shares.publish(envelope).await?)
    }

    /// Unauthenticated; returns the envelope at most once.
    pub async fn consume_share(&self, public_id: &str) -> Result<String, ServiceError> {
        self.shares.consume(public_id).await?.ok_or(ServiceError::NotFound)
    }
}
