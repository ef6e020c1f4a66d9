//! Runtime configuration provider.
//!
//! Caches the configuration record (`config.json` in the data directory) and
//! re-reads it only when the record's modification time or size changes. There is
//! no background watcher: every call to [`ConfigProvider::get_configuration`] stats
//! the record, so staleness is bounded by how often requests arrive.
//!
//! Change detection is best-effort. On filesystems with coarse timestamps, a rewrite
//! that keeps the same size within a single mtime tick is not noticed until the
//! next change.
//!
//! A failed reload never evicts the cached snapshot, and the loaded stamp is left
//! alone, so every later call retries until the record reads and parses cleanly.
//! Each failed attempt returns its error to that caller.
//!
//! Every call takes the cache lock and stats the record on the calling thread,
//! so request handling is serialized on one stat per request.

use std::fmt::Debug;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Immutable snapshot of the runtime configuration.
///
/// Only the canonical host is interpreted here; other keys present in the record
/// belong to other parts of the deployment and are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Configuration {
    /// `host` or `host:port`; empty means no canonical host is enforced
    #[serde(rename = "CanonicalHost", default)]
    pub canonical_host: String,
}

/// Modification time and size of the record, used to detect changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStamp {
    pub modified: SystemTime,
    pub len: u64,
}

/// Backing store for the configuration record.
pub trait ConfigStore: Debug + Send + Sync {
    /// Returns `Ok(None)` when the record does not exist.
    fn stat(&self) -> io::Result<Option<StoreStamp>>;

    fn read(&self) -> io::Result<Vec<u8>>;
}

/// Configuration record stored as a JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigStore for FileStore {
    fn stat(&self) -> io::Result<Option<StoreStamp>> {
        match std::fs::metadata(&self.path) {
            Ok(metadata) => Ok(Some(StoreStamp {
                modified: metadata.modified()?,
                len: metadata.len(),
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to read configuration record: {0}")]
    Read(#[source] io::Error),
    #[error("Failed to parse configuration record: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
struct CacheState {
    configuration: Arc<Configuration>,
    /// Stamp of the record that produced `configuration`
    loaded: Option<StoreStamp>,
}

/// Loads and caches the runtime configuration.
///
/// A single instance is shared (behind an `Arc`) by every request handler.
/// The cache lock is held across stat, read and parse, so concurrent callers
/// never observe a half-applied reload.
#[derive(Debug)]
pub struct ConfigProvider<S = FileStore> {
    store: S,
    cache: Mutex<CacheState>,
}

impl ConfigProvider<FileStore> {
    /// Provider backed by the JSON file at `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FileStore::new(path))
    }
}

impl<S: ConfigStore> ConfigProvider<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: Mutex::new(CacheState::default()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Return the current configuration, reloading the record if it changed.
    pub fn get_configuration(&self) -> Result<Arc<Configuration>, ConfigurationError> {
        let mut cache = self.lock();

        let stamp = match self.store.stat().map_err(ConfigurationError::Read)? {
            Some(stamp) => stamp,
            None => {
                // A missing record is the normal unconfigured state
                if cache.loaded.take().is_some() {
                    tracing::info!(
                        store = ?self.store,
                        "Configuration record removed, canonical host no longer enforced"
                    );
                    cache.configuration = Arc::new(Configuration::default());
                }
                return Ok(Arc::clone(&cache.configuration));
            }
        };

        if cache.loaded == Some(stamp) {
            return Ok(Arc::clone(&cache.configuration));
        }

        let configuration = self.load()?;
        tracing::info!(
            canonical_host = %configuration.canonical_host,
            "Loaded configuration record"
        );
        cache.configuration = Arc::new(configuration);
        cache.loaded = Some(stamp);
        Ok(Arc::clone(&cache.configuration))
    }

    /// Last successfully loaded configuration, without touching the store.
    pub fn current(&self) -> Arc<Configuration> {
        Arc::clone(&self.lock().configuration)
    }

    /// Canonical host to enforce right now.
    ///
    /// Reload failures are logged and the cached value is served instead.
    pub fn canonical_host(&self) -> String {
        match self.get_configuration() {
            Ok(configuration) => configuration.canonical_host.clone(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    store = ?self.store,
                    "Failed to reload configuration, keeping cached value"
                );
                self.current().canonical_host.clone()
            }
        }
    }

    fn load(&self) -> Result<Configuration, ConfigurationError> {
        let contents = self.store.read().map_err(ConfigurationError::Read)?;
        Ok(serde_json::from_slice(&contents)?)
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // The state is only ever replaced whole, so a poisoned lock is still consistent
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
