use std::sync::Arc;

use shared::exception::{CaseException, ExceptionSuggestion};
use tokio::sync::RwLock;

use crate::state::LibraryState;
use crate::traits::ExceptionBackend;

/// Local mirror of the backend's case-correction rules.
pub struct ExceptionRules {
    state: Arc<LibraryState>,
    backend: Arc<dyn ExceptionBackend>,
    rules: RwLock<Vec<CaseException>>,
}

impl ExceptionRules {
    pub fn new(state: Arc<LibraryState>, backend: Arc<dyn ExceptionBackend>) -> Self {
        Self {
            state,
            backend,
            rules: RwLock::new(Vec::new()),
        }
    }

    pub async fn rules(&self) -> Vec<CaseException> {
        self.rules.read().await.clone()
    }

    pub async fn load(&self) {
        let _busy = self.state.busy();
        match self.backend.list_exceptions().await {
            Ok(rules) => *self.rules.write().await = rules,
            Err(e) => self.state.fail("Failed to load exceptions", e).await,
        }
    }

    /// The backend may answer with an existing rule (same id) that it updated
    /// instead of creating a new one.
    pub async fn add(&self, original: &str, corrected: &str, category: &str) {
        let rule = CaseException {
            id: None,
            original: original.to_string(),
            corrected: corrected.to_string(),
            category: category.to_string(),
        };
        self.store(rule).await;
    }

    pub async fn accept(&self, suggestion: ExceptionSuggestion) {
        self.store(suggestion.into()).await;
    }

    async fn store(&self, rule: CaseException) {
        let _busy = self.state.busy();
        match self.backend.add_exception(rule).await {
            Ok(saved) => {
                let mut rules = self.rules.write().await;
                match rules.iter_mut().find(|r| r.id.is_some() && r.id == saved.id) {
                    Some(existing) => {
                        *existing = saved;
                        self.state.notifier().success("Exception updated.");
                    }
                    None => {
                        rules.push(saved);
                        self.state.notifier().success("Exception added.");
                    }
                }
            }
            Err(e) => self.state.fail("Failed to add exception", e).await,
        }
    }

    pub async fn remove(&self, id: i64) {
        let _busy = self.state.busy();
        match self.backend.delete_exception(id).await {
            Ok(()) => {
                self.rules.write().await.retain(|r| r.id != Some(id));
                self.state.notifier().success("Exception deleted.");
            }
            Err(e) => self.state.fail("Failed to delete exception", e).await,
        }
    }
}
