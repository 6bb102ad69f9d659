// ============================================================
// Layer 4 - Token Batcher
// ============================================================
// Moves an EncodedBatch onto a Burn device as an Int tensor.
//
// How batching works here:
//   Input:  EncodedBatch with N rows, each already padded to W
//   Output: Tensor<B, 2, Int> of shape [N, W]
//
//   We flatten all rows into one long Vec, then reshape:
//   [r1_t1, r1_t2, ..., r1_tW, r2_t1, ..., rN_tW] → [N, W]
//
// Padding is done by the SequenceEncoder, so every row already
// has the same length and the reshape is always valid.
//
// Reference: Burn Book §4 (Batcher)

use burn::prelude::*;

use crate::domain::batch::EncodedBatch;

/// Holds the target device so tensors are created on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct TokenBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TokenBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// [batch, width] token ids on `self.device`.
    pub fn batch(&self, encoded: &EncodedBatch) -> Tensor<B, 2, Int> {
        // Burn Int tensors are built from i32
        let flat: Vec<i32> = encoded
            .flat_ids()
            .into_iter()
            .map(|id| id as i32)
            .collect();

        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([encoded.batch_size(), encoded.width])
    }
}
