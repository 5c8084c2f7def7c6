use std::{collections::HashMap, env, fs, io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("environment variable `{0}` is not set")]
    MissingEnv(String),
    #[error("failed to read secrets file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse secrets file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("secret `{key}` not found in {path}")]
    MissingKey { key: String, path: PathBuf },
}

/// Source of the remote account's password.
pub trait CredentialProvider: Send + Sync {
    fn password(&self) -> Result<String, CredentialError>;
}

pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredentials {
    fn password(&self) -> Result<String, CredentialError> {
        env::var(&self.var).map_err(|_| CredentialError::MissingEnv(self.var.clone()))
    }
}

/// A flat TOML table of `key = "value"` pairs, read on every lookup so the
/// file can be edited while the server runs.
pub struct SecretsFile {
    path: PathBuf,
    key: String,
}

impl SecretsFile {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }
}

impl CredentialProvider for SecretsFile {
    fn password(&self) -> Result<String, CredentialError> {
        let text = fs::read_to_string(&self.path).map_err(|source| CredentialError::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut secrets: HashMap<String, String> =
            toml::from_str(&text).map_err(|source| CredentialError::Parse {
                path: self.path.clone(),
                source,
            })?;

        secrets
            .remove(&self.key)
            .ok_or_else(|| CredentialError::MissingKey {
                key: self.key.clone(),
                path: self.path.clone(),
            })
    }
}

pub struct StaticCredentials(pub String);

impl CredentialProvider for StaticCredentials {
    fn password(&self) -> Result<String, CredentialError> {
        Ok(self.0.clone())
    }
}
