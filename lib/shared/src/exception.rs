use serde::{Deserialize, Serialize};

/// A case or spelling correction rule applied by the backend when it
/// computes correction previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseException {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub original: String,
    pub corrected: String,
    /// "artist", "album", "global" or the name of the edited field
    pub category: String,
}

/// A rule proposed from a user edit, not yet stored anywhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionSuggestion {
    pub original: String,
    pub corrected: String,
    pub category: String,
}

impl From<ExceptionSuggestion> for CaseException {
    fn from(s: ExceptionSuggestion) -> Self {
        Self {
            id: None,
            original: s.original,
            corrected: s.corrected,
            category: s.category,
        }
    }
}
