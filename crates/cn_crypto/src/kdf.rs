//! Passphrase key derivation
//!
//! `key_from_passphrase`: PBKDF2-HMAC-SHA256, 100 000 rounds, derives the
//!   32-byte AES-256-GCM key for one envelope. Every envelope carries its own
//!   random salt, so the same passphrase never yields the same key twice.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

/// Iteration count shared with the browser client (WebCrypto `PBKDF2`).
pub const PBKDF2_ROUNDS: u32 = 100_000;
pub const SALT_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

/// 32-byte envelope key derived from a passphrase. Zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct EnvelopeKey(pub [u8; KEY_LEN]);

/// Derive an envelope key from `passphrase` + 16-byte `salt`.
pub fn key_from_passphrase(passphrase: &[u8], salt: &[u8; SALT_LEN]) -> EnvelopeKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(passphrase, salt, PBKDF2_ROUNDS, &mut key);
    EnvelopeKey(key)
}

/// Fresh random 16-byte salt from the OS RNG. Not secret; stored in the envelope.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_passphrase_and_salt_give_same_key() {
        let salt = [7u8; SALT_LEN];
        let a = key_from_passphrase(b"correct horse", &salt);
        let b = key_from_passphrase(b"correct horse", &salt);
        assert_eq!(a.0, b.0);
    }

    #[test]
    fn salt_changes_the_key() {
        let a = key_from_passphrase(b"correct horse", &[1u8; SALT_LEN]);
        let b = key_from_passphrase(b"correct horse", &[2u8; SALT_LEN]);
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
