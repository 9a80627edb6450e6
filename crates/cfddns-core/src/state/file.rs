// # File State Store
//
// One-line file implementation of StateStore.
//
// ## File Format
//
// The file holds the last-seen IP as plain text, e.g. `203.0.113.5`.
// An empty file means "unknown". Surrounding whitespace is ignored on read,
// so the file may be hand-edited.
//
// ## Crash Safety
//
// Writes go to a sibling `.tmp` file which is then renamed over the state
// file, so a crash mid-write never leaves a truncated address behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::Error;
use crate::traits::state_store::StateStore;

/// File-based state store
///
/// # Example
///
/// ```rust,no_run
/// use cfddns_core::state::FileStateStore;
/// use cfddns_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileStateStore::new("/tmp/ip").await?;
///
///     store.store("203.0.113.5").await?;
///     assert_eq!(store.load().await?, Some("203.0.113.5".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileStateStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStateStore {
    /// Open the state file, creating it (empty) if it doesn't exist
    ///
    /// Parent directories are created as needed. An existing file is left
    /// untouched.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        if !path.exists() {
            tracing::debug!("Creating IP file '{}'", path.display());
            fs::File::create(&path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create state file {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<Option<String>, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            // Deleted behind our back: same as a fresh install
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("State file {} is missing", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::state_store(format!(
                    "Failed to read state file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let ip = content.trim();
        Ok((!ip.is_empty()).then(|| ip.to_string()))
    }

    async fn store(&self, ip: &str) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(ip.as_bytes()).await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                Error::state_store(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("State written to file: {}", self.path.display());
        Ok(())
    }

    async fn flush(&self) -> Result<(), Error> {
        // Every store() is already durable; just make sure no write is mid-flight
        let _guard = self.write_lock.lock().await;
        Ok(())
    }
}
