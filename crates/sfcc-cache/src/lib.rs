//! Persisted, workspace-scoped key/value cache.
//!
//! File discovery and override counting are the expensive parts of a refresh,
//! so their results are memoized here across tool restarts. Entries are JSON
//! files under `~/.sfcc-overrides/cache/<workspace-hash>/<scope>/`, one file
//! per key, named by the key's digest so relative-path keys need no
//! sanitization.
//!
//! Readers must tolerate "key absent" at any time: a flush can land between a
//! `contains` check and a `get`, and corrupt entries degrade to a miss.

mod error;
mod util;

pub use error::{CacheError, Result};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Configuration for selecting the on-disk cache root.
#[derive(Clone, Debug, Default)]
pub struct CacheConfig {
    /// Override the global cache directory (the workspace hash is still
    /// appended).
    pub cache_root_override: Option<PathBuf>,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            cache_root_override: std::env::var_os("SFCC_OVERRIDES_CACHE_DIR").map(PathBuf::from),
        }
    }
}

/// Per-workspace cache root: `<base>/<hash-of-workspace-root>/`.
#[derive(Clone, Debug)]
pub struct CacheDir {
    workspace_root: PathBuf,
    root: PathBuf,
}

impl CacheDir {
    pub fn new(workspace_root: impl AsRef<Path>, config: CacheConfig) -> Result<Self> {
        let workspace_root = fs::canonicalize(workspace_root)?;

        let base = match config.cache_root_override {
            Some(root) => root,
            None => default_cache_root()?,
        };

        let mut hasher = Sha256::new();
        hasher.update(workspace_root.as_os_str().as_encoded_bytes());
        let hash = hex::encode(&hasher.finalize()[..16]);

        let root = base.join(hash);
        fs::create_dir_all(&root)?;

        Ok(Self {
            workspace_root,
            root,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open (creating if needed) a named scope within this cache.
    pub fn scope(&self, name: &str) -> Result<Scope> {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir)?;
        Ok(Scope {
            name: name.to_string(),
            dir,
        })
    }
}

/// One named scope of the cache (`files`, `overrides`, ...).
#[derive(Clone, Debug)]
pub struct Scope {
    name: String,
    dir: PathBuf,
}

impl Scope {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetch and deserialize an entry. Any failure is a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        let bytes = util::read_entry(&path)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::debug!(
                    target = "sfcc.cache",
                    scope = %self.name,
                    key,
                    error = %err,
                    "discarding undecodable cache entry"
                );
                util::remove_entry_best_effort(&path, "get.undecodable");
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entry_path(key).is_file()
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        util::atomic_write(&self.entry_path(key), &bytes)
    }

    /// Wholesale invalidation: drop every entry in this scope.
    pub fn flush(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        fs::create_dir_all(&self.dir)?;
        tracing::debug!(target = "sfcc.cache", scope = %self.name, "flushed cache scope");
        Ok(())
    }

    /// Number of entries currently on disk (for status reporting).
    pub fn len(&self) -> usize {
        fs::read_dir(&self.dir)
            .map(|entries| entries.filter_map(|e| e.ok()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest = hex::encode(&hasher.finalize()[..16]);
        self.dir.join(format!("{digest}.json"))
    }
}

fn default_cache_root() -> Result<PathBuf> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .ok_or(CacheError::MissingHomeDir)?;

    Ok(home.join(".sfcc-overrides").join("cache"))
}
