//! CloudNotes application layer.
//!
//! - `config`: startup configuration (file + environment)
//! - `service`: the operations a request router calls: authenticate, then
//!   hand opaque envelopes to the store
//! - `client`: what the browser client does locally: seal, unlock the
//!   listing by passphrase, open shares, export

pub mod client;
pub mod config;
pub mod service;

pub use config::ServiceConfig;
pub use service::{NoteSummary, NotesService, ServiceError};
