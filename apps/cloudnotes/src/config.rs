use std::path::{Path, PathBuf};

use cn_crypto::CredentialWhitelist;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const APP_QUALIFIER: &str = "net";
pub const APP_ORG: &str = "cloudnotes";
pub const APP_NAME: &str = "cloudnotes";

pub const ENV_DB: &str = "CLOUDNOTES_DB";
pub const ENV_ADMIN_KEY: &str = "CLOUDNOTES_ADMIN_KEY";
pub const ENV_ADMIN_KEYS: &str = "CLOUDNOTES_ADMIN_KEYS";
pub const ENV_MAX_ENVELOPE_BYTES: &str = "CLOUDNOTES_MAX_ENVELOPE_BYTES";

pub const DEFAULT_MAX_ENVELOPE_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine data directory")]
    NoDataDir,

    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for {key}")]
    InvalidValue { key: &'static str },
}

/// On-disk `config.json`.  Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub database_path: Option<PathBuf>,
    /// Whitelist sources; each string may itself hold several delimited keys.
    pub admin_keys: Vec<String>,
    pub max_envelope_bytes: Option<usize>,
}

/// Resolved configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub whitelist: CredentialWhitelist,
    pub max_envelope_bytes: usize,
}

pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME).ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().to_path_buf())
}

impl ServiceConfig {
    /// Load `path` (or `config.json` in the data directory when it exists),
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => read_file(path)?,
            None => {
                let default_path = data_dir()?.join("config.json");
                if default_path.exists() {
                    read_file(&default_path)?
                } else {
                    FileConfig::default()
                }
            }
        };
        Self::from_parts(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with an environment lookup.  Environment wins for
    /// scalar values; whitelist sources from both are combined.
    pub fn from_parts<F>(file: FileConfig, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = match env(ENV_DB).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => match file.database_path {
                Some(path) => path,
                None => data_dir()?.join("notes.db"),
            },
        };

        let max_envelope_bytes = match env(ENV_MAX_ENVELOPE_BYTES) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue { key: ENV_MAX_ENVELOPE_BYTES })?,
            None => file.max_envelope_bytes.unwrap_or(DEFAULT_MAX_ENVELOPE_BYTES),
        };

        let mut sources = file.admin_keys;
        sources.extend(env(ENV_ADMIN_KEY));
        sources.extend(env(ENV_ADMIN_KEYS));
        let whitelist = CredentialWhitelist::from_sources(&sources);
        if whitelist.is_empty() {
            warn!("no admin keys configured; every authenticated call will be rejected");
        }

        Ok(Self { database_path, whitelist, max_envelope_bytes })
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_slice(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn whitelist_merges_file_and_both_env_sources() {
        let file = FileConfig {
            database_path: Some(PathBuf::from("/tmp/file.db")),
            admin_keys: vec!["from-file".into()],
            max_envelope_bytes: None,
        };
        let cfg = ServiceConfig::from_parts(
            file,
            env_of(&[(ENV_ADMIN_KEY, " single "), (ENV_ADMIN_KEYS, "a, b\u{FF0C}c")]),
        )
        .unwrap();
        for key in ["from-file", "single", "a", "b", "c"] {
            assert!(cfg.whitelist.contains(key), "{key}");
        }
        assert_eq!(cfg.whitelist.len(), 5);
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/file.db"));
        assert_eq!(cfg.max_envelope_bytes, DEFAULT_MAX_ENVELOPE_BYTES);
    }

    #[test]
    fn env_overrides_file_scalars() {
        let file = FileConfig {
            database_path: Some(PathBuf::from("/tmp/file.db")),
            admin_keys: vec![],
            max_envelope_bytes: Some(10),
        };
        let cfg = ServiceConfig::from_parts(
            file,
            env_of(&[(ENV_DB, "/tmp/env.db"), (ENV_MAX_ENVELOPE_BYTES, "2048")]),
        )
        .unwrap();
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/env.db"));
        assert_eq!(cfg.max_envelope_bytes, 2048);
        assert!(cfg.whitelist.is_empty());
    }

    #[test]
    fn bad_size_is_rejected() {
        for raw in ["zero", "0", "-5"] {
            let err = ServiceConfig::from_parts(
                FileConfig { database_path: Some("/tmp/x.db".into()), ..Default::default() },
                env_of(&[(ENV_MAX_ENVELOPE_BYTES, raw)]),
            )
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
        }
    }

    #[test]
    fn file_parses_with_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, br#"{ "admin_keys": ["k1;k2"] }"#).unwrap();
        let file = read_file(&path).unwrap();
        assert_eq!(file.admin_keys, vec!["k1;k2".to_string()]);
        assert!(file.database_path.is_none());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = ServiceConfig::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
