// ============================================================
// Layer 3 - Typed Errors
// ============================================================
// Component-level failures. The application and CLI layers wrap
// these in anyhow with context; callers that care (tests, the
// interactive loop) can still match on the variant.

use crate::domain::document::DocId;

#[derive(thiserror::Error, Debug)]
pub enum QaError {
    /// A selected id has no row in the document store.
    #[error("document {0} not found in store")]
    DocumentNotFound(DocId),

    #[error("document store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Index or vectorizer file missing, unreadable or inconsistent.
    #[error("invalid artifact '{path}': {reason}")]
    Artifact { path: String, reason: String },

    /// Model output did not match the batch, or the batch did not fit the model.
    #[error("span model error: {0}")]
    Model(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl QaError {
    pub fn artifact(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Artifact { path: path.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, QaError>;
