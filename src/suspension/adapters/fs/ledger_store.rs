//! File-backed ledger store.
//!
//! Each key maps to `<key>.json` inside a single directory opened through a
//! capability handle. Writes go to a temporary sibling first and are then
//! renamed into place, so a crash never leaves a half-written ledger behind.

use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::ErrorKind;
use std::sync::Arc;

use crate::suspension::ports::{LedgerStore, LedgerStoreError, LedgerStoreResult};

/// Ledger store persisting values as files in one directory.
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    dir: Arc<Dir>,
}

impl FileLedgerStore {
    /// Opens `path`, creating it and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::Persistence`] when the directory cannot
    /// be created or opened.
    pub fn open(path: &Utf8Path) -> LedgerStoreResult<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())
            .map_err(LedgerStoreError::persistence)?;
        let dir =
            Dir::open_ambient_dir(path, ambient_authority()).map_err(LedgerStoreError::persistence)?;
        Ok(Self::from_dir(dir))
    }

    /// Wraps an already-open directory handle.
    #[must_use]
    pub fn from_dir(dir: Dir) -> Self {
        Self { dir: Arc::new(dir) }
    }

    fn file_name(key: &str) -> LedgerStoreResult<String> {
        let is_valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !is_valid {
            return Err(LedgerStoreError::InvalidKey(key.to_owned()));
        }
        Ok(format!("{key}.json"))
    }
}

async fn run_blocking<F, T>(f: F) -> LedgerStoreResult<T>
where
    F: FnOnce() -> LedgerStoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(LedgerStoreError::persistence)?
}

#[async_trait]
impl LedgerStore for FileLedgerStore {
    async fn load(&self, key: &str) -> LedgerStoreResult<Option<String>> {
        let file_name = Self::file_name(key)?;
        let dir = Arc::clone(&self.dir);
        run_blocking(move || match dir.read_to_string(&file_name) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(LedgerStoreError::persistence(err)),
        })
        .await
    }

    async fn save(&self, key: &str, value: &str) -> LedgerStoreResult<()> {
        let file_name = Self::file_name(key)?;
        let temp_name = format!("{file_name}.tmp");
        let contents = value.to_owned();
        let dir = Arc::clone(&self.dir);
        run_blocking(move || {
            dir.write(&temp_name, contents)
                .map_err(LedgerStoreError::persistence)?;
            dir.rename(&temp_name, &dir, &file_name)
                .map_err(LedgerStoreError::persistence)
        })
        .await
    }
}
