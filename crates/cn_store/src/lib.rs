//! cn_store: SQLite note store for CloudNotes
//!
//! # What the store knows
//! Nothing readable.  Every `content` column holds a passphrase envelope
//! produced client-side by `cn_crypto::envelope`; the store never parses it.
//! Private notes are keyed by an owner id (SHA-256 of the admin credential),
//! shares by a random public id.
//!
//! - `notes`: owner-scoped vault: save / list / delete
//! - `share`: burn-after-read publication and consumption
//!
//! # Migration
//! SQLx migrations in `migrations/` are run on open.

pub mod db;
pub mod error;
pub mod models;
pub mod notes;
pub mod share;

pub use db::Store;
pub use error::StoreError;
pub use models::NoteRow;
pub use notes::VaultStore;
pub use share::ShareBroker;
