#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::exception::CaseException;
use shared::library::{Album, AlbumStatus, ScanResult, Track};
use shared::notification::{Severity, Toast};
use tagotomatik::store::{KeyValueStore, MemoryStore};
use tagotomatik::{ExceptionBackend, LibraryBackend, LibraryError, Result, Services, ServicesBuilder};
use tokio::sync::{broadcast, Notify};

type PreviewFn = Box<dyn Fn(Album) -> Album + Send + Sync>;

/// A pausable call: the backend signals `entered` and then waits on `release`.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// Scripted backend. Scan results are keyed by the exact path passed in;
/// a path with no script fails like a directory that went away.
pub struct FakeBackend {
    scans: Mutex<HashMap<String, ScanResult>>,
    preview: Mutex<PreviewFn>,
    preview_gate: Mutex<Option<Gate>>,
    fail_preview: AtomicBool,
    fail_commit: AtomicBool,
    fail_persist: AtomicBool,
    pub scan_calls: AtomicUsize,
    pub committed: Mutex<Vec<Album>>,
    pub persisted: Mutex<Vec<Album>>,
    exceptions: Mutex<Vec<CaseException>>,
    next_exception_id: AtomicI64,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            scans: Mutex::new(HashMap::new()),
            preview: Mutex::new(Box::new(capitalize_titles)),
            preview_gate: Mutex::new(None),
            fail_preview: AtomicBool::new(false),
            fail_commit: AtomicBool::new(false),
            fail_persist: AtomicBool::new(false),
            scan_calls: AtomicUsize::new(0),
            committed: Mutex::new(Vec::new()),
            persisted: Mutex::new(Vec::new()),
            exceptions: Mutex::new(Vec::new()),
            next_exception_id: AtomicI64::new(1),
        }
    }
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_scan(&self, path: &str, albums: Vec<Album>) {
        self.set_scan_with_errors(path, albums, Vec::new());
    }

    pub fn set_scan_with_errors(&self, path: &str, albums: Vec<Album>, errors: Vec<&str>) {
        let result = ScanResult {
            albums,
            errors: errors.into_iter().map(String::from).collect(),
        };
        self.scans.lock().unwrap().insert(path.to_string(), result);
    }

    pub fn fail_scan(&self, path: &str) {
        self.scans.lock().unwrap().remove(path);
    }

    pub fn set_preview(&self, f: impl Fn(Album) -> Album + Send + Sync + 'static) {
        *self.preview.lock().unwrap() = Box::new(f);
    }

    pub fn gate_preview(&self) -> Gate {
        let gate = Gate::default();
        *self.preview_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn fail_preview(&self, fail: bool) {
        self.fail_preview.store(fail, Ordering::SeqCst);
    }

    pub fn fail_commit(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    pub fn fail_persist(&self, fail: bool) {
        self.fail_persist.store(fail, Ordering::SeqCst);
    }

    pub fn seed_exception(&self, original: &str, corrected: &str, category: &str) -> i64 {
        let id = self.next_exception_id.fetch_add(1, Ordering::SeqCst);
        self.exceptions.lock().unwrap().push(CaseException {
            id: Some(id),
            original: original.into(),
            corrected: corrected.into(),
            category: category.into(),
        });
        id
    }
}

fn api_error(message: &str) -> LibraryError {
    LibraryError::Api {
        status: 500,
        message: message.to_string(),
    }
}

/// Default preview: "the beatles" becomes "The Beatles" on every track title.
pub fn capitalize_titles(mut album: Album) -> Album {
    for track in &mut album.tracks {
        track.title = track
            .title
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ");
    }
    album.status = AlbumStatus::Clean;
    album
}

#[async_trait]
impl LibraryBackend for FakeBackend {
    fn id(&self) -> &'static str {
        "fake"
    }

    fn name(&self) -> &'static str {
        "Scripted backend"
    }

    async fn scan(&self, path: &str) -> Result<ScanResult> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        self.scans
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| api_error(&format!("{path} does not exist")))
    }

    async fn preview_correction(&self, album: Album) -> Result<Album> {
        let gate = self.preview_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        if self.fail_preview.load(Ordering::SeqCst) {
            return Err(api_error("preview exploded"));
        }
        let preview = self.preview.lock().unwrap();
        Ok((*preview)(album))
    }

    async fn commit_correction(&self, album: Album) -> Result<Album> {
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(api_error("disk is read-only"));
        }
        self.committed.lock().unwrap().push(album.clone());
        Ok(album)
    }

    async fn persist_album(&self, mut album: Album) -> Result<Album> {
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(api_error("disk is read-only"));
        }
        self.persisted.lock().unwrap().push(album.clone());
        for track in &mut album.tracks {
            track.is_modified = false;
        }
        Ok(album)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[async_trait]
impl ExceptionBackend for FakeBackend {
    async fn list_exceptions(&self) -> Result<Vec<CaseException>> {
        Ok(self.exceptions.lock().unwrap().clone())
    }

    /// Same `original` and `category` updates the existing rule.
    async fn add_exception(&self, mut exception: CaseException) -> Result<CaseException> {
        if exception.original.is_empty() {
            return Err(api_error("original must not be empty"));
        }
        let mut rules = self.exceptions.lock().unwrap();
        if let Some(existing) = rules
            .iter_mut()
            .find(|r| r.original == exception.original && r.category == exception.category)
        {
            existing.corrected = exception.corrected;
            return Ok(existing.clone());
        }
        exception.id = Some(self.next_exception_id.fetch_add(1, Ordering::SeqCst));
        rules.push(exception.clone());
        Ok(exception)
    }

    async fn delete_exception(&self, id: i64) -> Result<()> {
        self.exceptions.lock().unwrap().retain(|r| r.id != Some(id));
        Ok(())
    }
}

pub fn services(backend: &Arc<FakeBackend>) -> Services {
    services_with_store(backend, Arc::new(MemoryStore::new()))
}

pub fn services_with_store(backend: &Arc<FakeBackend>, store: Arc<dyn KeyValueStore>) -> Services {
    ServicesBuilder::new()
        .library_backend_arc(backend.clone())
        .exception_backend_arc(backend.clone())
        .store_arc(store)
        .build()
        .unwrap()
}

pub fn track(album_path: &str, n: u32, title: &str) -> Track {
    let filename = format!("{n:02}.flac");
    let mut track = Track::new(format!("{album_path}/{filename}"), filename);
    track.title = title.to_string();
    track.artist = "the beatles".to_string();
    track.album = "abbey road".to_string();
    track.track_number = Some(n);
    track
}

pub fn album(id: &str, path: &str) -> Album {
    let mut album = Album::new(id, path, "abbey road");
    album.artist = "the beatles".to_string();
    album.status = AlbumStatus::Dirty;
    album.tracks = vec![track(path, 1, "come together"), track(path, 2, "something")];
    album
}

pub fn ids(albums: &[Album]) -> Vec<String> {
    let mut ids: Vec<String> = albums.iter().map(|a| a.id.clone()).collect();
    ids.sort();
    ids
}

/// Everything published so far, oldest first.
pub fn drain(rx: &mut broadcast::Receiver<Toast>) -> Vec<(Severity, String)> {
    let mut out = Vec::new();
    while let Ok(toast) = rx.try_recv() {
        out.push((toast.severity, toast.message));
    }
    out
}
