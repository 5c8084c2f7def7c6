use std::{
    future::Future,
    io,
    path::PathBuf,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::{
    fs,
    sync::{Mutex, RwLock},
    task, time,
};
use tracing::{info, warn};

use crate::{
    credentials::{CredentialError, CredentialProvider},
    event::Event,
    export,
    ftp::{FtpError, FtpStream},
};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to encode CSV: {0}")]
    Encode(#[from] csv::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no FTP user configured")]
    NoUser,
    #[error(transparent)]
    Credentials(#[from] CredentialError),
    #[error(transparent)]
    Ftp(#[from] FtpError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub csv_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub remote_dir: String,
    pub remote_name: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Never,
    Uploaded {
        at: DateTime<Utc>,
    },
    Failed {
        at: DateTime<Utc>,
        message: String,
    },
}

/// Saves the table locally and pushes the same bytes to the FTP server.
pub struct Syncer {
    config: Config,
    credentials: Box<dyn CredentialProvider>,
    running: Mutex<()>,
    status: RwLock<SyncStatus>,
}

impl Syncer {
    pub fn new(config: Config, credentials: Box<dyn CredentialProvider>) -> Self {
        Self {
            config,
            credentials,
            running: Mutex::new(()),
            status: RwLock::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }

    /// Runs one sync pass and records its outcome. Passes never overlap.
    pub async fn run(&self, events: &[Event]) -> SyncStatus {
        let _running = self.running.lock().await;

        let status = match self.sync(events).await {
            Ok(()) => {
                info!(
                    events = events.len(),
                    host = %self.config.host,
                    "uploaded {}", self.config.remote_name
                );
                SyncStatus::Uploaded { at: Utc::now() }
            }
            Err(err) => {
                warn!(error = %err, host = %self.config.host, "upload failed");
                SyncStatus::Failed {
                    at: Utc::now(),
                    message: err.to_string(),
                }
            }
        };

        *self.status.write().await = status.clone();
        status
    }

    async fn sync(&self, events: &[Event]) -> Result<(), SyncError> {
        let bytes = export::to_csv_file_bytes(events)?;

        // The local copy is kept whatever happens to the upload.
        fs::write(&self.config.csv_path, &bytes)
            .await
            .map_err(|source| SyncError::Write {
                path: self.config.csv_path.clone(),
                source,
            })?;

        let user = self.config.user.as_deref().ok_or(SyncError::NoUser)?;
        let password = self.credentials.password()?;

        let mut ftp =
            FtpStream::connect(&self.config.host, self.config.port, self.config.timeout).await?;
        ftp.login(user, &password).await?;
        ftp.cwd(&self.config.remote_dir).await?;
        ftp.binary().await?;
        ftp.put(&self.config.remote_name, &bytes).await?;
        ftp.quit().await?;

        Ok(())
    }
}

/// Runs only the last of a burst of triggers, once `delay` has passed
/// without a newer one.
pub struct Debounce {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::default(),
        }
    }

    pub fn trigger<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.generation);
        let delay = self.delay;

        task::spawn(async move {
            time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) == generation {
                action().await;
            }
        });
    }
}
