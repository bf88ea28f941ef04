#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Durable string→string stores backing the crawl and geocoder caches.
//!
//! The pipeline only needs `get`/`put`/`clear` over raw strings; the storage
//! engine behind that contract is swappable via [`KeyValueStore`].
//! [`FileStore`] is the production engine — one file per key under a
//! directory, file names derived by hashing the key so arbitrary strings
//! (URLs, street addresses) are always safe to store. [`MemoryStore`] backs
//! tests in dependent crates.
//!
//! Entries live until [`KeyValueStore::clear`] wipes the store; there is no
//! eviction and no TTL.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Errors from cache store operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O operation on the backing store failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistent mapping from string key to string value.
///
/// Keys are stored exactly as given — untrimmed, unnormalized. The caller
/// owns all interpretation of values; the store performs no computation.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value for `key`, or `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Removes every entry from the store.
    async fn clear(&self) -> Result<(), CacheError>;
}

/// File-per-key store rooted at a directory.
///
/// File names are `hex(SHA-256(key))`, so slashes, colons, and whitespace in
/// keys never reach the filesystem. Values are written atomically (`.tmp` +
/// rename) — an interrupted write never leaves a half-written entry behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Returns the backing file path for `key`.
    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(hex::encode(Sha256::digest(key.as_bytes())))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match tokio::fs::read_to_string(self.entry_path(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }
}

/// In-memory store for tests and dry runs. Not persistent.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: tokio::sync::Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Returns `true` when the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.lock().await.clear();
        Ok(())
    }
}
