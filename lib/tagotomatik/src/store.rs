//! Durable key-value state: scan roots, exclusions and the albums cache.
//!
//! Values are JSON documents. Every mutation is written through immediately,
//! there is no batching.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};
use shared::library::Album;
use tracing::{debug, warn};

use crate::error::{LibraryError, Result};
use crate::scope;

pub const SCANNED_ROOTS_KEY: &str = "scanned-roots";
pub const EXCLUDED_PATHS_KEY: &str = "excluded-paths";
pub const ALBUMS_CACHE_KEY: &str = "albums-cache";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a state directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.file_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let target = self.file_for(key);
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &target)?;
        debug!("Wrote {} ({} bytes)", target.display(), value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.file_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Missing, unreadable or corrupt values all fall back to the default.
fn read_json<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!("Failed to read persisted {}: {}", key, e);
            return T::default();
        }
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Ignoring corrupt persisted {}: {}", key, e);
        T::default()
    })
}

fn write_json<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    let result = serde_json::to_string(value)
        .map_err(LibraryError::from)
        .and_then(|json| store.set(key, &json));
    if let Err(e) = result {
        warn!("Failed to persist {}: {}", key, e);
    }
}

/// User-confirmed scan roots and user-excluded album paths.
pub struct PathStore {
    store: Arc<dyn KeyValueStore>,
    scan_roots: BTreeSet<String>,
    excluded: BTreeSet<String>,
}

impl PathStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let scan_roots: Vec<String> = read_json(store.as_ref(), SCANNED_ROOTS_KEY);
        let excluded: Vec<String> = read_json(store.as_ref(), EXCLUDED_PATHS_KEY);
        Self {
            store,
            scan_roots: scan_roots.iter().map(|r| scope::normalize(r)).collect(),
            excluded: excluded.into_iter().collect(),
        }
    }

    pub fn scan_roots(&self) -> Vec<String> {
        self.scan_roots.iter().cloned().collect()
    }

    pub fn excluded(&self) -> Vec<String> {
        self.excluded.iter().cloned().collect()
    }

    pub fn is_scan_root(&self, path: &str) -> bool {
        self.scan_roots.contains(&scope::normalize(path))
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.contains(path)
    }

    /// Roots are kept normalized, so `/Music` and `/Music/` are one root.
    pub fn add_scan_root(&mut self, path: &str) -> bool {
        self.scan_roots.insert(scope::normalize(path))
    }

    pub fn remove_scan_root(&mut self, path: &str) -> bool {
        self.scan_roots.remove(&scope::normalize(path))
    }

    pub fn exclude(&mut self, path: &str) -> bool {
        self.excluded.insert(path.to_string())
    }

    pub fn include(&mut self, path: &str) -> bool {
        self.excluded.remove(path)
    }

    /// Writes both sets. Failures are logged, the in-memory sets stay authoritative.
    pub fn save(&self) {
        write_json(self.store.as_ref(), SCANNED_ROOTS_KEY, &self.scan_roots);
        write_json(self.store.as_ref(), EXCLUDED_PATHS_KEY, &self.excluded);
    }
}

/// Warm-start copy of the album collection. Never the source of truth.
#[derive(Clone)]
pub struct AlbumsCache {
    store: Arc<dyn KeyValueStore>,
}

impl AlbumsCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Vec<Album> {
        read_json(self.store.as_ref(), ALBUMS_CACHE_KEY)
    }

    /// An empty collection is usually transient, so it never overwrites the cache.
    pub fn save(&self, albums: &[Album]) {
        if albums.is_empty() {
            return;
        }
        write_json(self.store.as_ref(), ALBUMS_CACHE_KEY, albums);
    }
}
