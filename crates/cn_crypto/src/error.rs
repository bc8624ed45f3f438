use thiserror::Error;

/// Low-level crypto failures.
///
/// `envelope::decrypt` never surfaces these: a bad envelope or a wrong
/// passphrase is reported as [`crate::Decryption::Rejected`].
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("AEAD encryption failed")]
    AeadEncrypt,

    #[error("AEAD decryption failed (authentication tag mismatch)")]
    AeadDecrypt,

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}
