use async_trait::async_trait;
use shared::{
    exception::CaseException,
    library::{Album, ScanResult},
};

use crate::error::Result;

/// The process that reads audio files and writes tags. Every album handed to
/// it is an owned copy, never a reference into the live collection.
#[async_trait]
pub trait LibraryBackend: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;

    /// Discover albums under `path`. Safe to call repeatedly on the same path.
    async fn scan(&self, path: &str) -> Result<ScanResult>;

    /// Compute suggested corrections without touching the disk.
    async fn preview_correction(&self, album: Album) -> Result<Album>;

    /// Write corrections to the files. Idempotent for the same input.
    async fn commit_correction(&self, album: Album) -> Result<Album>;

    /// Write direct field edits to the files.
    async fn persist_album(&self, album: Album) -> Result<Album>;

    async fn health_check(&self) -> bool;
}

#[async_trait]
pub trait ExceptionBackend: Send + Sync {
    async fn list_exceptions(&self) -> Result<Vec<CaseException>>;
    async fn add_exception(&self, exception: CaseException) -> Result<CaseException>;
    async fn delete_exception(&self, id: i64) -> Result<()>;
}
