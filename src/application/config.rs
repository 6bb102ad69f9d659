// ============================================================
// Layer 2 - Ask Configuration
// ============================================================
// Every knob of the question-answering pipeline in one typed,
// immutable struct. Built from CLI flags (Layer 1) and handed to
// AskUseCase, which never mutates it.
//
// Serialisable so a run's exact settings can be printed with
// `--json` or kept alongside results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::encoder::{DEFAULT_MAX_SEQ_LEN, DEFAULT_RESERVED_SLOTS};
use crate::data::selector::{DEFAULT_COVERAGE, DEFAULT_TOP_K};
use crate::domain::error::QaError;
use crate::ml::extractor::DEFAULT_PAD_MARKER;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskConfig {
    // ── Artifacts ──────────────────────────────────────────────────────────
    /// SQLite file with the `documents(id, text)` table
    pub db_path:         PathBuf,
    /// CSR term matrix (JSON)
    pub matrix_path:     PathBuf,
    /// Fitted TF-IDF vectorizer (JSON)
    pub vectorizer_path: PathBuf,
    /// Directory with tokenizer.json, model_config.json, model.mpk.gz
    pub model_dir:       PathBuf,

    // ── Retrieval ──────────────────────────────────────────────────────────
    /// Maximum number of sections passed to the span model
    pub top_k:    usize,
    /// Normalised score mass after which selection stops
    pub coverage: f64,

    // ── Encoding ───────────────────────────────────────────────────────────
    pub max_seq_len:    usize,
    pub reserved_slots: usize,
    pub pad_id:         u32,
    pub pad_first:      bool,
    pub cls_token:      String,
    pub sep_token:      String,
    /// Decoded spans containing this string are rejected
    pub pad_marker:     String,
}

impl Default for AskConfig {
    fn default() -> Self {
        Self {
            db_path:         PathBuf::from("data/intro_to_nutrition/health.db"),
            matrix_path:     PathBuf::from("data/intro_to_nutrition/health_matrix.json"),
            vectorizer_path: PathBuf::from("data/intro_to_nutrition/health_vectorizer.json"),
            model_dir:       PathBuf::from("models/base"),
            top_k:           DEFAULT_TOP_K,
            coverage:        DEFAULT_COVERAGE,
            max_seq_len:     DEFAULT_MAX_SEQ_LEN,
            reserved_slots:  DEFAULT_RESERVED_SLOTS,
            pad_id:          0,
            pad_first:       false,
            cls_token:       "[CLS]".to_string(),
            sep_token:       "[SEP]".to_string(),
            pad_marker:      DEFAULT_PAD_MARKER.to_string(),
        }
    }
}

impl AskConfig {
    /// Reject settings that could never produce a valid model input.
    pub fn validate(&self) -> Result<(), QaError> {
        if self.max_seq_len <= self.reserved_slots {
            return Err(QaError::InvalidConfig(format!(
                "max_seq_len ({}) must be larger than reserved_slots ({})",
                self.max_seq_len, self.reserved_slots
            )));
        }
        if self.reserved_slots < 3 {
            return Err(QaError::InvalidConfig(
                "reserved_slots must cover [CLS] and two [SEP] tokens".to_string(),
            ));
        }
        if !self.coverage.is_finite() {
            return Err(QaError::InvalidConfig("coverage must be a finite number".to_string()));
        }
        if self.pad_marker.is_empty() {
            return Err(QaError::InvalidConfig("pad_marker must not be empty".to_string()));
        }
        Ok(())
    }
}
