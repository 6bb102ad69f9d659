// ============================================================
// Layer 5 - Span Extractor
// ============================================================
// Turns the model's per-token logits into one answer string.
//
// Steps:
//   1. No passages → fixed "could not find a section" answer,
//      the model is never called
//   2. Forward pass → start/end logits per row
//   3. Per row: argmax of start logits and of end logits
//   4. Rank rows by (max start + max end), highest first
//   5. Walk the ranking, taking the first row whose span
//        - does not start after it ends
//        - does not decode into padding
//   6. Nothing valid → "unanswerable" with the top-ranked passage
//
// A zero-width span (start == end) is read as a single token.

use tokenizers::Tokenizer;

use crate::domain::answer::{Answer, SpanPrediction};
use crate::domain::batch::{EncodedBatch, SpanLogits};
use crate::domain::error::{QaError, Result};
use crate::domain::traits::SpanModel;

/// Surface form of the pad token in decoded text.
pub const DEFAULT_PAD_MARKER: &str = "<pad>";

pub struct SpanExtractor<M: SpanModel> {
    model:      M,
    pad_marker: String,
}

impl<M: SpanModel> SpanExtractor<M> {
    pub fn new(model: M, pad_marker: impl Into<String>) -> Self {
        Self { model, pad_marker: pad_marker.into() }
    }

    /// Answer from the best valid span across all passages.
    pub fn predict(&self, tokenizer: &Tokenizer, batch: &EncodedBatch, passages: &[String]) -> Result<Answer> {
        if passages.is_empty() {
            return Ok(Answer::no_matching_section());
        }
        if batch.batch_size() != passages.len() {
            return Err(QaError::Model(format!(
                "batch has {} rows for {} passages",
                batch.batch_size(),
                passages.len()
            )));
        }

        let logits = self.model.span_logits(batch)?;
        check_shape(&logits, batch)?;

        let ranked = rank_predictions(best_spans(&logits));

        for pred in &ranked {
            if pred.is_inverted() {
                tracing::debug!("Row {} skipped: start {} > end {}", pred.row, pred.start_index, pred.end_index);
                continue;
            }

            let text = self.decode_span(tokenizer, &batch.rows[pred.row], pred)?;
            if text.contains(&self.pad_marker) {
                tracing::debug!("Row {} skipped: span runs into padding", pred.row);
                continue;
            }

            tracing::debug!(
                "Answer from row {} span [{}, {}) conf={:.4}",
                pred.row,
                pred.start_index,
                pred.token_range().end,
                pred.combined_confidence()
            );
            return Ok(Answer::found(
                text,
                passages[pred.row].clone(),
                pred.row,
                pred.combined_confidence(),
            ));
        }

        // ranked is non-empty here: one prediction per passage
        let top_row = ranked.first().map_or(0, |p| p.row);
        tracing::warn!("No valid span in {} candidates, falling back to unanswerable", ranked.len());
        Ok(Answer::unanswerable(passages[top_row].clone()))
    }

    /// Decode token ids `[start, end)` of one row, end clamped to the row.
    fn decode_span(&self, tokenizer: &Tokenizer, row: &[u32], pred: &SpanPrediction) -> Result<String> {
        let range = pred.token_range();
        let end   = range.end.min(row.len());
        let start = range.start.min(end);

        tokenizer
            .decode(&row[start..end], false)
            .map_err(|e| QaError::Tokenizer(e.to_string()))
    }
}

fn check_shape(logits: &SpanLogits, batch: &EncodedBatch) -> Result<()> {
    let rows_ok  = logits.rows() == batch.batch_size() && logits.end.len() == batch.batch_size();
    let width_ok = logits.start.iter().chain(&logits.end).all(|r| r.len() == batch.width);
    if rows_ok && width_ok {
        Ok(())
    } else {
        Err(QaError::Model(format!(
            "logits do not match batch shape [{}, {}]",
            batch.batch_size(),
            batch.width
        )))
    }
}

/// Index and value of the largest element; the first one wins ties.
fn argmax(values: &[f32]) -> (usize, f32) {
    values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best })
}

/// Best start and end position of every row.
pub fn best_spans(logits: &SpanLogits) -> Vec<SpanPrediction> {
    logits
        .start
        .iter()
        .zip(&logits.end)
        .enumerate()
        .map(|(row, (start, end))| {
            let (start_index, start_confidence) = argmax(start);
            let (end_index, end_confidence)     = argmax(end);
            SpanPrediction { row, start_index, end_index, start_confidence, end_confidence }
        })
        .collect()
}

/// Highest combined confidence first. Stable, so ties keep row order.
pub fn rank_predictions(mut preds: Vec<SpanPrediction>) -> Vec<SpanPrediction> {
    preds.sort_by(|a, b| b.combined_confidence().total_cmp(&a.combined_confidence()));
    preds
}
