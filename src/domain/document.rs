// ============================================================
// Layer 3 - Document Domain Types
// ============================================================
// A document is one textbook section. Its id is the row index
// of the section in the prebuilt term matrix, which is also the
// primary key of the `documents` table in the SQLite store.

use serde::{Deserialize, Serialize};

/// Row index of a section in the term matrix / key in the store.
pub type DocId = usize;

/// A textbook section as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Row index in the term matrix
    pub id: DocId,

    /// Full section text, shown to the user as the answer's source
    pub text: String,
}

impl Document {
    pub fn new(id: DocId, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }
}

/// A document with its cosine similarity to the current query.
/// Produced fresh for every query and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub id:    DocId,
    pub score: f64,
}

impl ScoredDocument {
    pub fn new(id: DocId, score: f64) -> Self {
        Self { id, score }
    }
}

/// A selected section together with the score that got it selected.
/// Returned by the `retrieve` operation for inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedSection {
    pub id:    DocId,
    pub score: f64,
    pub text:  String,
}
