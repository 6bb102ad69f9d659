// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All Burn-specific code lives here (plus the tensor batcher in
// Layer 4). Nothing above this layer touches a tensor.
//
//   model.rs      - Transformer encoder with a span head
//                   • Token + positional embeddings
//                   • Multi-head self-attention with pad mask
//                   • Feed-forward blocks, layer norm, residuals
//                   • Linear head → start / end logits
//
//   inferencer.rs - Loads a checkpoint and runs the forward pass,
//                   returning plain per-row logits
//
//   extractor.rs  - Picks the best answer span across sections
//                   and decodes it back to text
//
// Reference: Burn Book §3 (Building Blocks)
//            Vaswani et al. (2017) Attention Is All You Need
//            Devlin et al. (2019) BERT

/// Transformer encoder span model architecture
pub mod model;

/// Burn-backed SpanModel implementation
pub mod inferencer;

/// Span selection, ranking and decoding
pub mod extractor;
