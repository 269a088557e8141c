//! Registered users, persisted as one JSON object keyed by chat id.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to access user store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("user store {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode user store: {0}")]
    Encode(#[source] serde_json::Error),
}

type Users = BTreeMap<String, UserRecord>;

#[derive(Debug)]
pub struct UserRegistry {
    path: PathBuf,
    // serializes read-modify-write cycles across await points
    lock: Mutex<()>,
}

impl UserRegistry {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        UserRegistry {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the record stored under `id`.
    ///
    /// A store that cannot be read or decoded is moved aside to
    /// `<file>.corrupt-<timestamp>` and the upsert starts from an empty map.
    pub async fn upsert(&self, id: &str, record: UserRecord) -> Result<(), RegistryError> {
        let _guard = self.lock.lock().await;

        let mut users = match self.load().await {
            Ok(users) => users,
            Err(e) => {
                error!("[registry] {}", e);
                let moved_to = self.quarantine().await?;
                warn!(
                    "[registry] unreadable store moved to {}, starting empty",
                    moved_to.display()
                );
                Users::new()
            }
        };

        users.insert(id.to_string(), record);
        self.save(&users).await?;
        info!("[registry] upserted user {} ({} total)", id, users.len());
        Ok(())
    }

    /// All records, ordered by id. A missing store is empty; a corrupt one is an error.
    pub async fn list_all(&self) -> Result<Vec<(String, UserRecord)>, RegistryError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().collect())
    }

    async fn load(&self) -> Result<Users, RegistryError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Users::new()),
            Err(source) => {
                return Err(RegistryError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Users::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| RegistryError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, users: &Users) -> Result<(), RegistryError> {
        let json = serde_json::to_vec_pretty(users).map_err(RegistryError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| self.io_err(e))?;
        }
        let tmp = self.sibling("tmp");
        fs::write(&tmp, json).await.map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).await.map_err(|e| self.io_err(e))
    }

    async fn quarantine(&self) -> Result<PathBuf, RegistryError> {
        let target = self.sibling(&format!(
            "corrupt-{}",
            Local::now().format("%Y%m%d%H%M%S%3f")
        ));
        fs::rename(&self.path, &target)
            .await
            .map_err(|e| self.io_err(e))?;
        Ok(target)
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn io_err(&self, source: std::io::Error) -> RegistryError {
        RegistryError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
