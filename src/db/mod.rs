//! File-backed persistence for user records.
//!
//! The whole user set lives in one TOML document keyed by username. Reads
//! parse the file fresh each time; writes replace it via a sibling temp file
//! and a rename, so a crash mid-write leaves the previous content in place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::entities::users;

pub mod repositories;

pub use repositories::user::UserRepository;

/// Username -> record. Ordered so that serialization is deterministic.
pub type UserMap = BTreeMap<String, users::Model>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on user store {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("user store at {} is corrupt: {message}", .path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("failed to serialize user store: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Store {
    /// Opens the store and checks that the backing file is readable.
    ///
    /// A missing or empty file is a valid, empty store. A file that exists but
    /// does not parse is [`StoreError::Corrupt`], never an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(path);
        let users = store.load().await?;
        info!(
            path = %store.path().display(),
            users = users.len(),
            "User store opened"
        );
        Ok(store)
    }

    /// Creates a handle without touching the filesystem.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                write_lock: Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub async fn load(&self) -> Result<UserMap, StoreError> {
        let path = self.path();
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(UserMap::new()),
            Err(e) => return Err(StoreError::io(path, e)),
        };

        if content.trim().is_empty() {
            return Ok(UserMap::new());
        }

        toml::from_str(&content).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Replaces the file content with `users`.
    ///
    /// Callers that also read the current state should go through
    /// [`Store::update`] instead, which serializes writers.
    pub async fn save(&self, users: &UserMap) -> Result<(), StoreError> {
        let path = self.path();
        let content = toml::to_string_pretty(users)?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let tmp_path = temp_path_for(path);
        if let Err(e) = write_synced(&tmp_path, content.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StoreError::io(&tmp_path, e));
        }

        if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(StoreError::io(path, e));
        }

        debug!(path = %path.display(), users = users.len(), "User store saved");
        Ok(())
    }

    /// Load, mutate, save under the process-wide write lock.
    ///
    /// The file is written only when `f` returns `Ok`, so a rejected operation
    /// leaves the store untouched.
    pub async fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut UserMap) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.inner.write_lock.lock().await;
        let mut users = self.load().await?;
        let value = f(&mut users)?;
        self.save(&users).await?;
        Ok(value)
    }
}

async fn write_synced(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(content).await?;
    file.sync_all().await
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
