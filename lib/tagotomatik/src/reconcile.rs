//! Folding scan results into the album collection.
//!
//! A scan of a directory is authoritative for everything inside that
//! directory: albums found there are added, albums previously known there but
//! missing from the result are dropped. User exclusions filter the result,
//! and an explicit user scan of an excluded album lifts its exclusion.

use std::collections::HashSet;
use std::sync::Arc;

use itertools::Itertools;
use shared::library::Album;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::LibraryError;
use crate::scope;
use crate::state::LibraryState;
use crate::store::PathStore;
use crate::traits::LibraryBackend;

/// What a single scan did to the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub added: usize,
    pub removed: usize,
    pub restored: usize,
    pub hidden: usize,
    pub already_present: usize,
    pub read_errors: usize,
}

pub struct LibraryReconciler {
    state: Arc<LibraryState>,
    backend: Arc<dyn LibraryBackend>,
    paths: Mutex<PathStore>,
}

impl LibraryReconciler {
    pub fn new(
        state: Arc<LibraryState>,
        backend: Arc<dyn LibraryBackend>,
        paths: PathStore,
    ) -> Self {
        Self {
            state,
            backend,
            paths: Mutex::new(paths),
        }
    }

    pub async fn scan_roots(&self) -> Vec<String> {
        self.paths.lock().await.scan_roots()
    }

    pub async fn excluded_paths(&self) -> Vec<String> {
        self.paths.lock().await.excluded()
    }

    /// Seeds an empty collection from the albums cache. Excluded albums are
    /// left out. Returns the collection size.
    pub async fn warm_start(&self) -> usize {
        let cached = self.state.cache().load();
        let cached: Vec<Album> = {
            let paths = self.paths.lock().await;
            cached
                .into_iter()
                .filter(|a| !paths.is_excluded(&a.path))
                .unique_by(|a| a.id.clone())
                .collect()
        };
        let len = self
            .state
            .modify_albums(move |albums| {
                if albums.is_empty() {
                    *albums = cached;
                }
                albums.len()
            })
            .await;
        debug!("Warm start with {} cached albums", len);
        len
    }

    /// Re-scans every confirmed root. A root that fails is forgotten and the
    /// remaining roots are still scanned.
    pub async fn load_library(&self) -> usize {
        let roots = self.scan_roots().await;
        info!("Loading library from {} scan roots", roots.len());
        for root in &roots {
            self.scan_directory(root, true).await;
        }
        self.state.len().await
    }

    /// Scans `path` and merges the result. `auto_load` marks a startup re-scan
    /// of a known root: it is silent and treats a failed scan as a vanished
    /// root. Returns `None` when the scan call failed.
    pub async fn scan_directory(&self, path: &str, auto_load: bool) -> Option<ScanOutcome> {
        if path.trim().is_empty() {
            return None;
        }

        if !auto_load {
            let mut paths = self.paths.lock().await;
            if paths.add_scan_root(path) {
                paths.save();
            }
        }

        info!(
            "Scanning {} ({})",
            path,
            if auto_load { "auto-load" } else { "user" }
        );
        let _busy = self.state.busy();
        let result = match self.backend.scan(path).await {
            Ok(result) => result,
            Err(e) => {
                if auto_load {
                    self.forget_root(path, &e).await;
                } else {
                    self.state.fail("Scan failed", e).await;
                }
                return None;
            }
        };

        let mut outcome = ScanOutcome {
            read_errors: result.errors.len(),
            ..Default::default()
        };
        for error in &result.errors {
            debug!("Read error during scan of {}: {}", path, error);
        }
        if !auto_load && outcome.read_errors > 0 {
            self.state.notifier().warning(format!(
                "{} file(s) could not be read.",
                outcome.read_errors
            ));
        }

        let found: Vec<Album> = result
            .albums
            .into_iter()
            .unique_by(|a| a.id.clone())
            .collect();
        let found_count = found.len();

        let valid: Vec<Album> = {
            let mut paths = self.paths.lock().await;
            if !auto_load {
                for album in &found {
                    if paths.include(&album.path) {
                        info!("Exclusion lifted for {}", album.path);
                        outcome.restored += 1;
                    }
                }
                if outcome.restored > 0 {
                    paths.save();
                }
            }
            found
                .into_iter()
                .filter(|a| !paths.is_excluded(&a.path))
                .collect()
        };
        outcome.hidden = found_count - valid.len();

        let valid_ids: HashSet<String> = valid.iter().map(|a| a.id.clone()).collect();
        let (removed, added, already_present) = self
            .state
            .modify_albums(|albums| {
                let before = albums.len();
                albums.retain(|a| {
                    let stale = scope::is_within(&a.path, path) && !valid_ids.contains(&a.id);
                    if stale {
                        debug!("Dropping stale album {} ({})", a.id, a.path);
                    }
                    !stale
                });
                let removed = before - albums.len();

                let mut added = 0;
                let mut already_present = 0;
                for album in valid {
                    if albums.iter().any(|a| a.id == album.id) {
                        already_present += 1;
                    } else {
                        albums.push(album);
                        added += 1;
                    }
                }
                (removed, added, already_present)
            })
            .await;
        outcome.removed = removed;
        outcome.added = added;
        outcome.already_present = already_present;

        info!(
            "Scan of {} done: {} added, {} removed, {} restored, {} hidden, {} read errors",
            path, outcome.added, outcome.removed, outcome.restored, outcome.hidden, outcome.read_errors
        );

        if !auto_load {
            self.report(&outcome);
        }
        Some(outcome)
    }

    /// One message per user scan, most significant first.
    fn report(&self, outcome: &ScanOutcome) {
        let notifier = self.state.notifier();
        if outcome.added > 0 {
            notifier.success(format!("{} new album(s) added.", outcome.added));
        } else if outcome.restored > 0 {
            notifier.success(format!("{} excluded album(s) restored.", outcome.restored));
        } else if outcome.hidden > 0 {
            notifier.info(format!(
                "{} album(s) found but hidden by your exclusions.",
                outcome.hidden
            ));
        } else if outcome.already_present > 0 {
            notifier.info("All albums found are already in the library.");
        } else if outcome.read_errors == 0 {
            notifier.info("No albums found in this folder.");
        }
    }

    async fn forget_root(&self, root: &str, error: &LibraryError) {
        warn!("Scan root {} is no longer available: {}", root, error);
        {
            let mut paths = self.paths.lock().await;
            paths.remove_scan_root(root);
            paths.save();
        }
        let purged = self
            .state
            .modify_albums(|albums| {
                let before = albums.len();
                albums.retain(|a| !scope::is_within(&a.path, root));
                before - albums.len()
            })
            .await;
        info!("Purged {} albums under {}", purged, root);
    }

    /// Hides the album for good: its path is excluded from future scans and,
    /// if it was itself a scan root, no longer scanned.
    pub async fn remove_album(&self, id: &str) -> bool {
        let Some(album) = self.state.album(id).await else {
            return false;
        };

        {
            let mut paths = self.paths.lock().await;
            paths.exclude(&album.path);
            paths.remove_scan_root(&album.path);
            paths.save();
        }

        self.state
            .modify_albums(|albums| albums.retain(|a| a.id != id))
            .await;
        info!("Removed album {} ({})", id, album.path);
        true
    }

    /// Re-reads a single album from its own directory. Exclusions and scope
    /// cleanup do not apply.
    pub async fn refresh_album(&self, id: &str) {
        let Some(album) = self.state.album(id).await else {
            return;
        };

        let _busy = self.state.busy();
        let result = match self.backend.scan(&album.path).await {
            Ok(result) => result,
            Err(e) => {
                self.state.fail("Refresh failed", e).await;
                return;
            }
        };

        let own_path = scope::normalize(&album.path);
        let mut found = result.albums;
        let fresh = found
            .iter()
            .position(|a| a.id == id)
            .or_else(|| {
                found
                    .iter()
                    .position(|a| scope::normalize(&a.path) == own_path)
            })
            .map(|i| found.swap_remove(i));

        // A path match may carry a new id; it must not collide with another album.
        let id_taken = match &fresh {
            Some(f) if f.id != id => self.state.album(&f.id).await.is_some(),
            _ => false,
        };

        match fresh {
            Some(fresh) if id_taken => {
                warn!(
                    "Refresh of {} returned id {} which already belongs to another album",
                    album.path, fresh.id
                );
                self.state
                    .notifier()
                    .warning("Album could not be refreshed: its id is already in the library.");
            }
            Some(fresh) => {
                if self.state.replace_album(id, fresh).await {
                    self.state.notifier().success("Album refreshed.");
                }
            }
            None => {
                warn!("Refresh of {} returned no matching album", album.path);
                self.state
                    .notifier()
                    .warning("Album could not be found on disk.");
            }
        }
    }
}
