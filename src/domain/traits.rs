// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The pipeline talks to its external collaborators only through
// these traits:
//   - SqliteDocumentStore / MemoryDocumentStore → DocumentStore
//   - BurnSpanModel (transformer checkpoint)    → SpanModel
//   - AskUseCase                                → QuestionAnswerer
//
// Tests swap in in-memory stores and fixed-logit models without
// touching the pipeline code.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::answer::Answer;
use crate::domain::batch::{EncodedBatch, SpanLogits};
use crate::domain::document::DocId;
use crate::domain::error::Result;

// ─── DocumentStore ────────────────────────────────────────────────────────────
/// Key-value lookup of section text by document id.
pub trait DocumentStore {
    /// Return the text of `id`, or `QaError::DocumentNotFound`.
    fn fetch(&self, id: DocId) -> Result<String>;
}

// ─── SpanModel ────────────────────────────────────────────────────────────────
/// The extractive model: token ids in, start/end logits out.
///
/// Input shape is [batch, width]; both output matrices must have
/// the same shape.
pub trait SpanModel {
    fn span_logits(&self, batch: &EncodedBatch) -> Result<SpanLogits>;
}

// ─── QuestionAnswerer ─────────────────────────────────────────────────────────
/// Anything that turns a question into an answer plus its source section.
/// This is the whole surface a presentation layer needs.
pub trait QuestionAnswerer {
    fn answer(&self, question: &str) -> anyhow::Result<Answer>;
}
