//! Preview, apply and cancel of automatic metadata corrections.
//!
//! Each album with an unconfirmed preview has exactly one rollback snapshot:
//! the state it had before the first pending change. Applying discards the
//! snapshot, cancelling restores it. Two operations racing on the same album
//! are not serialized; whichever backend response resolves last wins.

use std::collections::HashMap;
use std::sync::Arc;

use shared::library::Album;
use tokio::sync::Mutex;
use tracing::info;

use crate::fields::{FieldOverrides, TrackField};
use crate::state::LibraryState;
use crate::traits::LibraryBackend;

pub struct CorrectionWorkflow {
    state: Arc<LibraryState>,
    backend: Arc<dyn LibraryBackend>,
    snapshots: Mutex<HashMap<String, Album>>,
}

impl CorrectionWorkflow {
    pub fn new(state: Arc<LibraryState>, backend: Arc<dyn LibraryBackend>) -> Self {
        Self {
            state,
            backend,
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    pub async fn has_pending_correction(&self, id: &str) -> bool {
        self.snapshots.lock().await.contains_key(id)
    }

    pub async fn pending_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.snapshots.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// A later preview never replaces the true original.
    async fn snapshot_if_absent(&self, album: &Album) {
        self.snapshots
            .lock()
            .await
            .entry(album.id.clone())
            .or_insert_with(|| album.clone());
    }

    pub async fn preview_correction(&self, id: &str) {
        let Some(album) = self.state.album(id).await else {
            return;
        };
        self.snapshot_if_absent(&album).await;

        let _busy = self.state.busy();
        match self.backend.preview_correction(album).await {
            Ok(corrected) => {
                if self.state.replace_album(id, corrected).await {
                    self.state.notifier().success("Auto-correction preview ready.");
                }
            }
            Err(e) => self.state.fail("Auto-correction failed", e).await,
        }
    }

    pub async fn apply_correction(&self, id: &str) {
        let Some(album) = self.state.album(id).await else {
            return;
        };

        let _busy = self.state.busy();
        match self.backend.commit_correction(album).await {
            Ok(committed) => {
                self.state.replace_album(id, committed).await;
                self.snapshots.lock().await.remove(id);
                info!("Corrections committed for album {}", id);
                self.state.notifier().success("Corrections applied.");
            }
            Err(e) => self.state.fail("Failed to apply corrections", e).await,
        }
    }

    /// Restores the pre-preview state. Without a snapshot this does nothing.
    pub async fn cancel_correction(&self, id: &str) {
        let Some(original) = self.snapshots.lock().await.remove(id) else {
            return;
        };
        if self.state.replace_album(id, original).await {
            self.state.notifier().info("Auto-correction cancelled.");
        }
    }

    /// Writes the current album as-is. A pending preview stays pending, so a
    /// later cancel still rolls back to the pre-preview state in memory.
    pub async fn save_direct(&self, id: &str) {
        let Some(album) = self.state.album(id).await else {
            return;
        };

        let _busy = self.state.busy();
        match self.backend.persist_album(album).await {
            Ok(saved) => {
                if self.state.replace_album(id, saved).await {
                    self.state.notifier().success("Album saved.");
                }
            }
            Err(e) => self.state.fail("Failed to save album", e).await,
        }
    }

    /// Local, undoable edit of album-wide fields. Returns the number of tracks
    /// that changed.
    pub async fn apply_field_overrides(&self, id: &str, overrides: &FieldOverrides) -> usize {
        let Some(album) = self.state.album(id).await else {
            return 0;
        };
        self.snapshot_if_absent(&album).await;

        self.state
            .update_album(id, |album| overrides.apply_to(album))
            .await
            .unwrap_or(0)
    }

    /// Sets one field on every track of the album. Undoable like
    /// [`apply_field_overrides`](Self::apply_field_overrides).
    pub async fn update_tracks_field(&self, id: &str, field: TrackField, value: &str) -> usize {
        let Some(album) = self.state.album(id).await else {
            return 0;
        };
        self.snapshot_if_absent(&album).await;

        self.state
            .update_album(id, |album| {
                album
                    .tracks
                    .iter_mut()
                    .map(|track| field.apply(track, value))
                    .filter(|changed| *changed)
                    .count()
            })
            .await
            .unwrap_or(0)
    }
}
