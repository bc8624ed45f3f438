//! Owner identity
//!
//! There is no user table.  An admin credential is checked against the
//! configured whitelist and, once accepted, hashed into an owner id that
//! partitions the note store.  Two different credentials land in two
//! disjoint partitions; the credential itself is never stored.

use std::fmt;

use sha2::{Digest, Sha256};

/// Entry separators accepted in whitelist configuration values.  The
/// full-width comma and semicolon tolerate keys typed with a CJK input method.
pub const CREDENTIAL_DELIMITERS: &[char] = &[',', ';', '\n', '\r', '\u{FF0C}', '\u{FF1B}'];

/// Hex SHA-256 of a trimmed credential.  Only obtainable through
/// [`derive_owner_id`] so the store can never be handed a raw credential.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex chars, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({}…)", self.short())
    }
}

/// Derive the owner partition id for `credential`.
pub fn derive_owner_id(credential: &str) -> OwnerId {
    OwnerId(hex::encode(Sha256::digest(credential.trim().as_bytes())))
}

/// Accepted admin credentials, built once at startup.
///
/// Entries are trimmed, non-empty and de-duplicated, in configuration order.
#[derive(Clone, Default)]
pub struct CredentialWhitelist {
    entries: Vec<String>,
}

impl CredentialWhitelist {
    /// Merge raw configuration values into one whitelist.
    pub fn from_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<String> = Vec::new();
        for source in sources {
            for entry in source.as_ref().split(CREDENTIAL_DELIMITERS) {
                let entry = entry.trim();
                if !entry.is_empty() && !entries.iter().any(|e| e == entry) {
                    entries.push(entry.to_string());
                }
            }
        }
        Self { entries }
    }

    /// Whole-token match of the trimmed credential.
    pub fn contains(&self, received: &str) -> bool {
        let received = received.trim();
        !received.is_empty() && self.entries.iter().any(|e| e == received)
    }

    /// Match and derive in one step: `Some(owner)` only for whitelisted credentials.
    pub fn authenticate(&self, received: &str) -> Option<OwnerId> {
        self.contains(received).then(|| derive_owner_id(received))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Never print the entries themselves.
impl fmt::Debug for CredentialWhitelist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialWhitelist")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// One-shot form of [`CredentialWhitelist::contains`] over raw configuration values.
pub fn match_credential(received: &str, configured: &[&str]) -> bool {
    CredentialWhitelist::from_sources(configured).contains(received)
}
