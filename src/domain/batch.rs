// ============================================================
// Layer 3 - Encoded Batch and Span Logits
// ============================================================
// The contract between the SequenceEncoder, the span model and
// the SpanExtractor, expressed without any tensor library.
//
//   EncodedBatch  [batch, width]  token ids, padded
//   SpanLogits    [batch, width]  start logits + end logits
//
// Keeping these as plain vectors means the extractor can be
// tested with a hand-written fake model (no GPU needed).

use serde::{Deserialize, Serialize};

/// A rectangular matrix of token ids, one row per passage.
///
/// Each row is `[CLS] passage [SEP] question [SEP]` followed (or
/// preceded, with `pad_first`) by pad ids up to `width`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedBatch {
    /// Padded rows, all exactly `width` long
    pub rows: Vec<Vec<u32>>,

    /// True (unpadded) token count of each row
    pub lengths: Vec<usize>,

    /// Common row length: the longest true length in the batch
    pub width: usize,

    /// Whether padding was prepended instead of appended
    pub pad_first: bool,
}

impl EncodedBatch {
    /// Number of rows (passages) in the batch
    pub fn batch_size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-major flattening, the layout tensor constructors expect
    pub fn flat_ids(&self) -> Vec<u32> {
        self.rows.iter().flatten().copied().collect()
    }
}

/// Raw output of the span-prediction model for one batch.
/// `start[i][t]` is the logit that token `t` of row `i` starts the answer.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanLogits {
    pub start: Vec<Vec<f32>>,
    pub end:   Vec<Vec<f32>>,
}

impl SpanLogits {
    /// Split two row-major buffers of shape [rows, width] into per-row vectors.
    pub fn from_flat(start: &[f32], end: &[f32], rows: usize, width: usize) -> Self {
        let split = |flat: &[f32]| -> Vec<Vec<f32>> {
            if width == 0 {
                return vec![Vec::new(); rows];
            }
            flat.chunks(width).map(|c| c.to_vec()).collect()
        };
        Self { start: split(start), end: split(end) }
    }

    pub fn rows(&self) -> usize {
        self.start.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_ids_are_row_major() {
        let batch = EncodedBatch {
            rows:      vec![vec![2, 5, 3], vec![2, 3, 0]],
            lengths:   vec![3, 2],
            width:     3,
            pad_first: false,
        };
        assert_eq!(batch.flat_ids(), vec![2, 5, 3, 2, 3, 0]);
        assert_eq!(batch.batch_size(), 2);
    }

    #[test]
    fn test_logits_from_flat_splits_rows() {
        let logits = SpanLogits::from_flat(
            &[0.1, 0.2, 0.3, 0.4],
            &[1.0, 2.0, 3.0, 4.0],
            2,
            2,
        );
        assert_eq!(logits.rows(), 2);
        assert_eq!(logits.start[1], vec![0.3, 0.4]);
        assert_eq!(logits.end[0], vec![1.0, 2.0]);
    }
}
