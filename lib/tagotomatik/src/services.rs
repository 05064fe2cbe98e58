use std::sync::Arc;

use shared::notification::Toast;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::correction::CorrectionWorkflow;
use crate::error::{LibraryError, Result};
use crate::exceptions::ExceptionRules;
use crate::notify::Notifier;
use crate::reconcile::LibraryReconciler;
use crate::state::LibraryState;
use crate::store::{AlbumsCache, KeyValueStore, MemoryStore, PathStore};
use crate::traits::{ExceptionBackend, LibraryBackend};

/// Everything a front end needs, wired around one shared [`LibraryState`].
pub struct Services {
    state: Arc<LibraryState>,
    library: LibraryReconciler,
    corrections: CorrectionWorkflow,
    exceptions: ExceptionRules,
    backend: Arc<dyn LibraryBackend>,
}

impl Services {
    pub fn state(&self) -> &Arc<LibraryState> {
        &self.state
    }

    pub fn library(&self) -> &LibraryReconciler {
        &self.library
    }

    pub fn corrections(&self) -> &CorrectionWorkflow {
        &self.corrections
    }

    pub fn exceptions(&self) -> &ExceptionRules {
        &self.exceptions
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.state.notifier().subscribe()
    }

    /// `(id, name)` of the scanning backend.
    pub fn backend_info(&self) -> (&str, &str) {
        (self.backend.id(), self.backend.name())
    }
}

pub struct ServicesBuilder {
    library: Option<Arc<dyn LibraryBackend>>,
    exceptions: Option<Arc<dyn ExceptionBackend>>,
    store: Option<Arc<dyn KeyValueStore>>,
    notifier: Option<Notifier>,
}

impl ServicesBuilder {
    pub fn new() -> Self {
        Self {
            library: None,
            exceptions: None,
            store: None,
            notifier: None,
        }
    }

    /// Uses one backend for both scanning and exception rules.
    pub fn backend<B>(self, backend: B) -> Self
    where
        B: LibraryBackend + ExceptionBackend + 'static,
    {
        let backend = Arc::new(backend);
        self.library_backend_arc(backend.clone())
            .exception_backend_arc(backend)
    }

    pub fn library_backend(self, backend: impl LibraryBackend + 'static) -> Self {
        self.library_backend_arc(Arc::new(backend))
    }

    pub fn library_backend_arc(mut self, backend: Arc<dyn LibraryBackend>) -> Self {
        self.library = Some(backend);
        self
    }

    pub fn exception_backend(self, backend: impl ExceptionBackend + 'static) -> Self {
        self.exception_backend_arc(Arc::new(backend))
    }

    pub fn exception_backend_arc(mut self, backend: Arc<dyn ExceptionBackend>) -> Self {
        self.exceptions = Some(backend);
        self
    }

    pub fn store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn store_arc(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Takes the toast durations from `config`.
    pub fn config(self, config: &AppConfig) -> Self {
        self.notifier(Notifier::new(config.toast_ms, config.error_toast_ms))
    }

    /// Without a store, state lives in memory and is lost on exit.
    pub fn build(self) -> Result<Services> {
        let library = self.library.ok_or(LibraryError::NotConfigured)?;
        let exceptions = self.exceptions.ok_or(LibraryError::NotConfigured)?;
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn KeyValueStore>);
        let notifier = self.notifier.unwrap_or_default();

        let state = Arc::new(LibraryState::new(
            notifier,
            AlbumsCache::new(store.clone()),
        ));
        let paths = PathStore::load(store);

        Ok(Services {
            library: LibraryReconciler::new(state.clone(), library.clone(), paths),
            corrections: CorrectionWorkflow::new(state.clone(), library.clone()),
            exceptions: ExceptionRules::new(state.clone(), exceptions),
            state,
            backend: library,
        })
    }
}

impl Default for ServicesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
