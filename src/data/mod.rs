// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between a question string and a tensor batch.
//
//   question
//       │
//       ▼
//   TfidfVectorizer   → sparse term-weight vector
//       │
//       ▼
//   TermVectorIndex   → cosine score against every section
//       │
//       ▼
//   ContextSelector   → top-k sections up to the coverage cut
//       │
//       ▼
//   DocumentStore     → section text by id (SQLite)
//       │
//       ▼
//   SequenceEncoder   → [CLS] passage [SEP] question [SEP], padded
//       │
//       ▼
//   TokenBatcher      → Int tensor for the span model
//
// Each module does one step and is tested on its own.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Fitted TF-IDF vectorizer loaded from JSON
pub mod vectorizer;

/// Sparse vectors and the CSR term matrix
pub mod sparse;

/// Cosine scoring of a question against all sections
pub mod index;

/// Top-k / coverage selection of sections
pub mod selector;

/// Section text lookup (SQLite and in-memory)
pub mod store;

/// (passage, question) encoding and padding
pub mod encoder;

/// Turns an EncodedBatch into a Burn tensor
pub mod batcher;
