// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust structs, enums and traits that define the core
// concepts of the question-answering pipeline.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O, SQL queries or tokenizer calls
//   - Only plain data and the traits other layers implement
//
// The pipeline reads as a chain of these types:
//
//   question ─► ScoredDocument ─► Document ─► EncodedBatch
//            ─► SpanLogits ─► SpanPrediction ─► Answer
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Documents, their ids and similarity scores
pub mod document;

// Encoded token batches and the model's raw span logits
pub mod batch;

// Span predictions and the final answer
pub mod answer;

// Typed errors shared by the data and ml layers
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
