//! Client-side flows.
//!
//! Plaintext and passphrases exist only here.  The service sees envelopes.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use cn_crypto::{CryptoError, Decryption};
use serde::Serialize;
use thiserror::Error;

use crate::service::{NoteSummary, NotesService, ServiceError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A listed note the current passphrase could open.
#[derive(Debug, Clone, Serialize)]
pub struct UnlockedNote {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Original envelope, kept so the note can be shared without re-sealing.
    #[serde(skip)]
    pub envelope: String,
}

/// Seal `text` under `passphrase` and store it in the caller's partition.
pub async fn save_note(
    service: &NotesService,
    credential: &str,
    text: &str,
    passphrase: &str,
) -> Result<i64, ClientError> {
    let envelope = cn_crypto::encrypt(text, passphrase)?;
    Ok(service.create_private_note(credential, &envelope).await?)
}

/// Keep the notes `passphrase` opens, in listing order.
///
/// Several passphrases can share one partition; each sees only its own
/// notes and the others are indistinguishable from noise.
pub fn unlock_notes(notes: Vec<NoteSummary>, passphrase: &str) -> Vec<UnlockedNote> {
    notes
        .into_iter()
        .filter_map(|note| match cn_crypto::decrypt(&note.envelope, passphrase) {
            Decryption::Decrypted(text) => Some(UnlockedNote {
                id: note.id,
                text,
                created_at: note.created_at,
                envelope: note.envelope,
            }),
            Decryption::Rejected => None,
        })
        .collect()
}

/// List the caller's partition and unlock it in one go.
pub async fn load_notes(
    service: &NotesService,
    credential: &str,
    passphrase: &str,
) -> Result<Vec<UnlockedNote>, ClientError> {
    let notes = service.list_own_notes(credential).await?;
    Ok(unlock_notes(notes, passphrase))
}

/// Publish an existing note as a one-time share.  The envelope is reused
/// as-is, so the share opens with the note's own passphrase.
pub async fn share_note(
    service: &NotesService,
    credential: &str,
    note: &UnlockedNote,
) -> Result<String, ClientError> {
    Ok(service.create_share(credential, &note.envelope).await?)
}

/// `?share=<id>` link the share page reads.
pub fn share_link(base_url: &str, public_id: &str) -> String {
    let sep = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{sep}share={public_id}")
}

/// Fetch (and thereby burn) a share, then try to open it.
///
/// The share is gone after this call even when the passphrase is wrong.
pub async fn open_share(
    service: &NotesService,
    public_id: &str,
    passphrase: &str,
) -> Result<Decryption, ClientError> {
    let envelope = service.consume_share(public_id).await?;
    Ok(cn_crypto::decrypt(&envelope, passphrase))
}

/// Write a note's plaintext to `Note_<id>.txt` under `dir`.
pub fn export_note(note: &UnlockedNote, dir: &Path) -> Result<PathBuf, ClientError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("Note_{}.txt", note.id));
    std::fs::write(&path, note.text.as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_link_appends_query() {
        assert_eq!(
            share_link("https://notes.example/", "abc"),
            "https://notes.example/?share=abc"
        );
        assert_eq!(
            share_link("https://notes.example/app?lang=en", "abc"),
            "https://notes.example/app?lang=en&share=abc"
        );
    }

    #[test]
    fn unlock_keeps_only_matching_notes_in_order() {
        let now = Utc::now();
        let summary = |id: i64, text: &str, pw: &str| NoteSummary {
            id,
            envelope: cn_crypto::encrypt(text, pw).unwrap(),
            created_at: now,
        };
        let notes = vec![
            summary(3, "mine-3", "mine"),
            summary(2, "theirs", "other"),
            summary(1, "mine-1", "mine"),
            NoteSummary { id: 0, envelope: "corrupt".into(), created_at: now },
        ];

        let unlocked = unlock_notes(notes, "mine");
        let got: Vec<(i64, &str)> = unlocked.iter().map(|n| (n.id, n.text.as_str())).collect();
        assert_eq!(got, vec![(3, "mine-3"), (1, "mine-1")]);
    }

    #[test]
    fn export_writes_note_file() {
        let dir = tempfile::tempdir().unwrap();
        let note = UnlockedNote {
            id: 42,
            text: "exported text".into(),
            created_at: Utc::now(),
            envelope: String::new(),
        };
        let path = export_note(&note, &dir.path().join("out")).unwrap();
        assert_eq!(path.file_name().unwrap(), "Note_42.txt");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "exported text");
    }
}
