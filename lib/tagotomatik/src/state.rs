//! The album collection and the indicators shared by every workflow.
//!
//! Locks here are only ever held for a synchronous read or write. Nothing
//! awaits a backend call while holding one, so callers always work on owned
//! clones across suspension points.

use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};

use shared::library::Album;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::notify::Notifier;
use crate::store::AlbumsCache;

pub struct LibraryState {
    albums: RwLock<Vec<Album>>,
    busy: AtomicUsize,
    last_error: RwLock<Option<String>>,
    notifier: Notifier,
    cache: AlbumsCache,
}

/// Keeps the busy indicator raised until dropped.
pub struct BusyGuard<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

impl LibraryState {
    pub fn new(notifier: Notifier, cache: AlbumsCache) -> Self {
        Self {
            albums: RwLock::new(Vec::new()),
            busy: AtomicUsize::new(0),
            last_error: RwLock::new(None),
            notifier,
            cache,
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn cache(&self) -> &AlbumsCache {
        &self.cache
    }

    pub async fn albums(&self) -> Vec<Album> {
        self.albums.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.albums.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.albums.read().await.is_empty()
    }

    /// Owned copy of one album, safe to hand to a suspending call.
    pub async fn album(&self, id: &str) -> Option<Album> {
        self.albums.read().await.iter().find(|a| a.id == id).cloned()
    }

    /// Replaces the album with id `id` in place. Returns `false` when the
    /// album left the collection in the meantime; the value is then dropped.
    pub async fn replace_album(&self, id: &str, album: Album) -> bool {
        self.update_album(id, move |slot| *slot = album).await.is_some()
    }

    pub async fn update_album<R>(&self, id: &str, f: impl FnOnce(&mut Album) -> R) -> Option<R> {
        let mut albums = self.albums.write().await;
        let Some(slot) = albums.iter_mut().find(|a| a.id == id) else {
            debug!("Album {} no longer in the collection", id);
            return None;
        };
        let result = f(slot);
        self.cache.save(&albums);
        Some(result)
    }

    /// Runs `f` against the whole collection and refreshes the albums cache.
    pub async fn modify_albums<R>(&self, f: impl FnOnce(&mut Vec<Album>) -> R) -> R {
        let mut albums = self.albums.write().await;
        let result = f(&mut albums);
        self.cache.save(&albums);
        result
    }

    pub fn busy(&self) -> BusyGuard<'_> {
        self.busy.fetch_add(1, Ordering::AcqRel);
        BusyGuard {
            counter: &self.busy,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire) > 0
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    pub async fn clear_error(&self) {
        *self.last_error.write().await = None;
    }

    /// Records a recovered failure and tells the user about it.
    pub async fn fail(&self, context: &str, error: impl Display) {
        let message = error.to_string();
        warn!("{}: {}", context, message);
        self.notifier.error(format!("{context}: {message}"));
        *self.last_error.write().await = Some(message);
    }
}
