//! Passphrase envelope: what the store sees.
//!
//! The store is a DUMB CONTAINER: an envelope is an opaque string and is
//! never parsed server-side.  Inside it carries everything needed to
//! re-derive the key and authenticate the ciphertext:
//!
//! ```text
//! base64( {"iv":[12 bytes],"salt":[16 bytes],"data":[ciphertext || tag]} )
//! ```
//!
//! Byte fields are JSON integer arrays and the outer encoding is standard
//! padded base64, matching the browser client byte for byte.  `nonce` is
//! accepted as an alias for `iv` on input.
//!
//! Decryption never raises.  The client lists every note of its owner
//! partition and keeps the ones its passphrase opens, so a wrong
//! passphrase, a legacy envelope and a corrupted one all collapse to the
//! same [`Decryption::Rejected`].

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::aead::{self, NONCE_LEN};
use crate::error::CryptoError;
use crate::kdf::{self, SALT_LEN};

#[derive(Debug, Serialize, Deserialize)]
struct WireEnvelope {
    #[serde(rename = "iv", alias = "nonce")]
    nonce: Vec<u8>,
    /// Missing on pre-salt envelopes, which used a fixed key and cannot be opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    salt: Option<Vec<u8>>,
    data: Vec<u8>,
}

/// Outcome of opening an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decryption {
    Decrypted(String),
    /// Wrong passphrase, tampering, corruption or an unsupported format.
    Rejected,
}

impl Decryption {
    pub fn into_plaintext(self) -> Option<String> {
        match self {
            Decryption::Decrypted(text) => Some(text),
            Decryption::Rejected => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Decryption::Rejected)
    }
}

/// Seal `plaintext` under `passphrase`.
///
/// Salt and nonce are drawn fresh on every call, so sealing the same text
/// twice under the same passphrase gives two unrelated envelopes.
pub fn encrypt(plaintext: &str, passphrase: &str) -> Result<String, CryptoError> {
    let salt = kdf::generate_salt();
    let nonce = aead::generate_nonce();
    let key = kdf::key_from_passphrase(passphrase.as_bytes(), &salt);
    let data = aead::encrypt(&key.0, &nonce, plaintext.as_bytes())?;

    let wire = WireEnvelope {
        nonce: nonce.to_vec(),
        salt: Some(salt.to_vec()),
        data,
    };
    let json = serde_json::to_vec(&wire)?;
    Ok(STANDARD.encode(json))
}

/// Open `envelope` with `passphrase`.
pub fn decrypt(envelope: &str, passphrase: &str) -> Decryption {
    match open(envelope, passphrase) {
        Some(text) => Decryption::Decrypted(text),
        None => Decryption::Rejected,
    }
}

fn open(envelope: &str, passphrase: &str) -> Option<String> {
    let json = STANDARD.decode(envelope.trim()).ok()?;
    let wire: WireEnvelope = serde_json::from_slice(&json).ok()?;

    let salt: [u8; SALT_LEN] = wire.salt?.try_into().ok()?;
    let nonce: [u8; NONCE_LEN] = wire.nonce.try_into().ok()?;

    let key = kdf::key_from_passphrase(passphrase.as_bytes(), &salt);
    let plaintext = aead::decrypt(&key.0, &nonce, &wire.data).ok()?;
    String::from_utf8(plaintext.to_vec()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aead::TAG_LEN;

    fn wire_json(envelope: &str) -> serde_json::Value {
        serde_json::from_slice(&STANDARD.decode(envelope).unwrap()).unwrap()
    }

    #[test]
    fn round_trip() {
        let env = encrypt("buy milk\n第二行", "hunter2").unwrap();
        assert_eq!(
            decrypt(&env, "hunter2"),
            Decryption::Decrypted("buy milk\n第二行".into())
        );
    }

    #[test]
    fn wrong_passphrase_is_rejected() {
        let env = encrypt("secret", "alpha").unwrap();
        assert_eq!(decrypt(&env, "beta"), Decryption::Rejected);
    }

    #[test]
    fn envelopes_are_not_deterministic() {
        let a = encrypt("same", "pw").unwrap();
        let b = encrypt("same", "pw").unwrap();
        assert_ne!(a, b);

        let (ja, jb) = (wire_json(&a), wire_json(&b));
        assert_ne!(ja["salt"], jb["salt"]);
        assert_ne!(ja["iv"], jb["iv"]);
    }

    #[test]
    fn wire_layout_matches_browser_client() {
        let env = encrypt("hello", "pw").unwrap();
        let json = wire_json(&env);
        assert_eq!(json["iv"].as_array().unwrap().len(), NONCE_LEN);
        assert_eq!(json["salt"].as_array().unwrap().len(), SALT_LEN);
        assert_eq!(json["data"].as_array().unwrap().len(), 5 + TAG_LEN);
    }

    #[test]
    fn nonce_alias_is_accepted() {
        let env = encrypt("aliased", "pw").unwrap();
        let mut json = wire_json(&env);
        let iv = json.as_object_mut().unwrap().remove("iv").unwrap();
        json["nonce"] = iv;
        let renamed = STANDARD.encode(serde_json::to_vec(&json).unwrap());
        assert_eq!(decrypt(&renamed, "pw"), Decryption::Decrypted("aliased".into()));
    }

    #[test]
    fn legacy_envelope_without_salt_is_rejected() {
        let legacy = serde_json::json!({ "iv": vec![0u8; 12], "data": vec![1u8; 32] });
        let env = STANDARD.encode(serde_json::to_vec(&legacy).unwrap());
        assert!(decrypt(&env, "").is_rejected());
        assert!(decrypt(&env, "anything").is_rejected());
    }

    #[test]
    fn tampered_data_is_rejected() {
        let env = encrypt("do not touch", "pw").unwrap();
        let mut json = wire_json(&env);
        let first = json["data"][0].as_u64().unwrap();
        json["data"][0] = serde_json::json!((first ^ 0x80) as u8);
        let tampered = STANDARD.encode(serde_json::to_vec(&json).unwrap());
        assert!(decrypt(&tampered, "pw").is_rejected());
    }

    #[test]
    fn garbage_is_rejected_not_raised() {
        for junk in ["", "not base64 at all!", "e30=", "W10=", "eyJpdiI6MX0="] {
            assert!(decrypt(junk, "pw").is_rejected(), "accepted {junk:?}");
        }
    }
}
