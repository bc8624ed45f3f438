//! cn_crypto: CloudNotes client-side cryptography and owner identity
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited RustCrypto crates.
//! - Zeroize derived key material on drop.
//! - The server never sees a passphrase: everything in `envelope` runs on
//!   the client, the store only ever receives the encoded envelope string.
//!
//! # Module layout
//! - `envelope`: passphrase envelope (salt + nonce + AES-GCM ciphertext)
//! - `kdf`: PBKDF2-HMAC-SHA256 passphrase key derivation
//! - `aead`: AES-256-GCM encrypt/decrypt helpers
//! - `owner`: owner partition ids and the admin credential whitelist
//! - `error`: unified error type

pub mod aead;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod owner;

pub use envelope::{decrypt, encrypt, Decryption};
pub use error::CryptoError;
pub use owner::{derive_owner_id, match_credential, CredentialWhitelist, OwnerId};
