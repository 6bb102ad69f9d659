// ============================================================
// Layer 4 - Sequence Encoder
// ============================================================
// Turns (passage, question) pairs into one padded id matrix the
// span model can read in a single forward pass.
//
// Row layout (passage first, question second):
//
//   [CLS] passage tokens [SEP] question tokens [SEP]
//
// Budget: every row must fit the model's 512 positions. The
// question is never cut, so the passage gets what is left:
//
//   passage budget = 512 - len(question) - 9
//
// 9 reserves three groups of three slots for special tokens,
// more than the three a row actually uses.
//
// Padding: rows are padded with the pad id up to the longest row
// in the batch, at the end by default or at the front with
// `pad_first`.

use tokenizers::Tokenizer;

use crate::domain::batch::EncodedBatch;
use crate::domain::error::{QaError, Result};
use crate::infra::tokenizer_store::SpecialTokens;

pub const DEFAULT_MAX_SEQ_LEN: usize = 512;
pub const DEFAULT_RESERVED_SLOTS: usize = 9;

pub struct SequenceEncoder {
    special:        SpecialTokens,
    max_seq_len:    usize,
    reserved_slots: usize,
    pad_first:      bool,
}

impl SequenceEncoder {
    pub fn new(special: SpecialTokens, max_seq_len: usize, reserved_slots: usize, pad_first: bool) -> Self {
        Self { special, max_seq_len, reserved_slots, pad_first }
    }

    /// Number of passage tokens a row may keep for a question of `question_len` tokens.
    pub fn passage_budget(&self, question_len: usize) -> usize {
        self.max_seq_len
            .saturating_sub(question_len)
            .saturating_sub(self.reserved_slots)
    }

    /// Encode every passage against the same question and pad to a batch.
    pub fn encode(&self, tokenizer: &Tokenizer, passages: &[String], question: &str) -> Result<EncodedBatch> {
        let mut question_ids = token_ids(tokenizer, question)?;

        // A question longer than the whole budget would leave no room at all;
        // keep its head so the row still fits.
        let question_cap = self.max_seq_len.saturating_sub(self.reserved_slots);
        if question_ids.len() > question_cap {
            tracing::warn!(
                "Question has {} tokens, truncating to {}",
                question_ids.len(),
                question_cap
            );
            question_ids.truncate(question_cap);
        }

        let rows = passages
            .iter()
            .map(|p| {
                let passage_ids = token_ids(tokenizer, p)?;
                Ok(self.build_row(&passage_ids, &question_ids))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(pad_collate(rows, self.special.pad, self.pad_first))
    }

    /// `[CLS] passage[:budget] [SEP] question [SEP]`
    pub fn build_row(&self, passage_ids: &[u32], question_ids: &[u32]) -> Vec<u32> {
        let keep = self.passage_budget(question_ids.len()).min(passage_ids.len());

        let mut row = Vec::with_capacity(keep + question_ids.len() + 3);
        row.push(self.special.cls);
        row.extend_from_slice(&passage_ids[..keep]);
        row.push(self.special.sep);
        row.extend_from_slice(question_ids);
        row.push(self.special.sep);
        row
    }
}

/// Tokenize without adding the tokenizer's own special tokens.
fn token_ids(tokenizer: &Tokenizer, text: &str) -> Result<Vec<u32>> {
    let enc = tokenizer
        .encode(text, false)
        .map_err(|e| QaError::Tokenizer(e.to_string()))?;
    Ok(enc.get_ids().to_vec())
}

/// Pad variable-length rows to the longest one.
///
/// Example with pad_id = 0:
///   [[5, 6, 7], [8]]  →  [[5, 6, 7], [8, 0, 0]]   (pad_first = false)
///                     →  [[5, 6, 7], [0, 0, 8]]   (pad_first = true)
pub fn pad_collate(rows: Vec<Vec<u32>>, pad_id: u32, pad_first: bool) -> EncodedBatch {
    let width   = rows.iter().map(Vec::len).max().unwrap_or(0);
    let lengths = rows.iter().map(Vec::len).collect();

    let rows = rows
        .into_iter()
        .map(|row| {
            let fill = width - row.len();
            if pad_first {
                let mut padded = vec![pad_id; fill];
                padded.extend(row);
                padded
            } else {
                let mut padded = row;
                padded.resize(width, pad_id);
                padded
            }
        })
        .collect();

    EncodedBatch { rows, lengths, width, pad_first }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::tokenizer_store::fixture::{self, CLS, PAD, SEP};

    const WORDS: &[&str] = &["what", "is", "protein", "?", "proteins", "are", "amino", "acids", "."];

    fn special() -> SpecialTokens {
        SpecialTokens { cls: CLS, sep: SEP, pad: PAD }
    }

    fn id(word: &str) -> u32 {
        4 + WORDS.iter().position(|w| *w == word).unwrap() as u32
    }

    #[test]
    fn test_row_layout() {
        let tok = fixture::tokenizer(WORDS);
        let enc = SequenceEncoder::new(special(), 512, 9, false);
        let batch = enc.encode(&tok, &["Proteins are amino acids.".to_string()], "what is protein?").unwrap();

        let expected = vec![
            CLS, id("proteins"), id("are"), id("amino"), id("acids"), id("."), SEP,
            id("what"), id("is"), id("protein"), id("?"), SEP,
        ];
        assert_eq!(batch.rows[0], expected);
        assert_eq!(batch.lengths, vec![12]);
        assert_eq!(batch.width, 12);
    }

    #[test]
    fn test_rows_share_width_and_keep_true_lengths() {
        let tok = fixture::tokenizer(WORDS);
        let enc = SequenceEncoder::new(special(), 512, 9, false);
        let passages = vec![
            "proteins are amino acids".to_string(),
            "proteins".to_string(),
            "".to_string(),
        ];
        let batch = enc.encode(&tok, &passages, "protein").unwrap();

        assert_eq!(batch.lengths, vec![8, 5, 4]);
        assert!(batch.rows.iter().all(|r| r.len() == batch.width));
        assert_eq!(batch.width, 8);
        for (row, &len) in batch.rows.iter().zip(&batch.lengths) {
            // non-pad prefix is exactly the encoded row
            assert_eq!(row[len - 1], SEP);
            assert!(row[len..].iter().all(|&t| t == PAD));
        }
    }

    #[test]
    fn test_tokenizer_saved_with_padding_adds_no_pads_inside_rows() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tokenizer.json"),
            fixture::tokenizer_json_with_batch_settings(WORDS, 8),
        ).unwrap();
        let tok = crate::infra::tokenizer_store::TokenizerStore::new(dir.path()).load().unwrap();

        let enc = SequenceEncoder::new(special(), 512, 9, false);
        let batch = enc.encode(&tok, &["amino acids".to_string()], "protein").unwrap();

        assert_eq!(batch.rows[0], vec![CLS, id("amino"), id("acids"), SEP, id("protein"), SEP]);
        assert_eq!(batch.lengths, vec![6]);
        assert!(batch.rows[0][..batch.lengths[0]].iter().all(|&t| t != PAD));
    }

    #[test]
    fn test_long_passage_truncated_to_budget() {
        let enc = SequenceEncoder::new(special(), 512, 9, false);
        let passage: Vec<u32> = (0..1000).map(|i| 100 + i).collect();
        let question = vec![7u32; 20];

        let row = enc.build_row(&passage, &question);
        let budget = 512 - 20 - 9;
        assert_eq!(enc.passage_budget(20), budget);
        // [CLS] + budget + [SEP] + question + [SEP]
        assert_eq!(row.len(), budget + 20 + 3);
        assert_eq!(&row[1..=budget], &passage[..budget]);
        assert_eq!(row[budget + 1], SEP);
    }

    #[test]
    fn test_overlong_question_still_fits() {
        let tok = fixture::tokenizer(WORDS);
        let enc = SequenceEncoder::new(special(), 16, 9, false);
        let question = "protein ".repeat(30);
        let batch = enc.encode(&tok, &["proteins are".to_string()], &question).unwrap();
        assert!(batch.width <= 16);
    }

    #[test]
    fn test_pad_collate_end() {
        let batch = pad_collate(vec![vec![5, 6, 7], vec![8]], 0, false);
        assert_eq!(batch.rows, vec![vec![5, 6, 7], vec![8, 0, 0]]);
        assert_eq!(batch.lengths, vec![3, 1]);
    }

    #[test]
    fn test_pad_collate_front() {
        let batch = pad_collate(vec![vec![5, 6, 7], vec![8]], 9, true);
        assert_eq!(batch.rows, vec![vec![5, 6, 7], vec![9, 9, 8]]);
        assert!(batch.pad_first);
    }

    #[test]
    fn test_pad_collate_empty() {
        let batch = pad_collate(Vec::new(), 0, false);
        assert!(batch.is_empty());
        assert_eq!(batch.width, 0);
    }
}
