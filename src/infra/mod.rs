// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Reading the model directory from disk:
//
//   checkpoint.rs      - model_config.json + model.mpk.gz via
//                        Burn's CompactRecorder
//
//   tokenizer_store.rs - tokenizer.json and the special token ids
//                        the encoder needs
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint loading
pub mod checkpoint;

/// Tokenizer loading and special tokens
pub mod tokenizer_store;
