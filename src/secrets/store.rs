//! Secret discovery by walking a secret-store directory.

use super::SecretMap;
use crate::config::EnvVars;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum SecretErrorKind {
    #[error("error reading file/dir")]
    Walk(#[source] walkdir::Error),
    #[error("error reading secret file")]
    Read(#[source] io::Error),
    #[error("secret file is not valid UTF-8")]
    NotUtf8(#[source] std::string::FromUtf8Error),
}

/// A secret-store walk that stopped early.
///
/// Secrets collected before the failure are kept and available through
/// [`SecretLoadError::partial`].
#[derive(Debug, thiserror::Error)]
#[error("Failed loading secrets at {}", path.display())]
pub struct SecretLoadError {
    pub path: PathBuf,
    #[source]
    pub kind: SecretErrorKind,
    partial: SecretMap,
}

impl SecretLoadError {
    pub fn partial(&self) -> &SecretMap {
        &self.partial
    }

    pub fn into_partial(self) -> SecretMap {
        self.partial
    }
}

/// Secret-store directory named by the variable `key`. Unset means no store.
pub fn secrets_dir_from(vars: &EnvVars, key: &str) -> PathBuf {
    PathBuf::from(vars.get(key).unwrap_or_default())
}

/// Key for a secret file name, or `None` if the name lacks `prefix`.
///
/// `prefix` is the full file-name prefix, i.e. `UPPER(env_prefix) + "_"`.
pub fn secret_key(file_name: &str, prefix: &str) -> Option<String> {
    file_name.strip_prefix(prefix).map(|rest| rest.replace('_', "."))
}

/// Walk `dir` recursively and collect every secret file for `env_prefix`.
///
/// An empty `dir` means secrets are not configured and yields an empty map.
/// The first unreadable entry aborts the whole walk.
pub fn load_secrets(dir: &Path, env_prefix: &str) -> Result<SecretMap, SecretLoadError> {
    let prefix = format!("{}_", env_prefix.to_uppercase());
    let mut secrets = SecretMap::new();

    if dir.as_os_str().is_empty() {
        return Ok(secrets);
    }

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
                return Err(SecretLoadError {
                    path,
                    kind: SecretErrorKind::Walk(e),
                    partial: secrets,
                });
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            tracing::warn!("Skipping secret file with non UTF-8 name: {}", entry.path().display());
            continue;
        };
        let Some(key) = secret_key(file_name, &prefix) else {
            continue;
        };

        let path = entry.path();
        let value = match fs::read(path) {
            Ok(bytes) => String::from_utf8(bytes).map_err(SecretErrorKind::NotUtf8),
            Err(e) => Err(SecretErrorKind::Read(e)),
        };
        match value {
            Ok(value) => {
                tracing::debug!(key = %key, path = %path.display(), "Loaded secret");
                secrets.insert(key, value);
            }
            Err(kind) => {
                return Err(SecretLoadError { path: path.to_path_buf(), kind, partial: secrets });
            }
        }
    }

    Ok(secrets)
}
