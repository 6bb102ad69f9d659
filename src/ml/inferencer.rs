// ============================================================
// Layer 5 - Inferencer
// ============================================================
// Runs the transformer checkpoint over an EncodedBatch and hands
// the raw start/end logits back as plain vectors. Everything
// after the forward pass (argmax, ranking, decoding) is done by
// the SpanExtractor, which never sees a tensor.
use burn::prelude::*;

use crate::data::batcher::TokenBatcher;
use crate::domain::batch::{EncodedBatch, SpanLogits};
use crate::domain::error::{QaError, Result};
use crate::domain::traits::SpanModel;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::TransformerSpanModel;

/// Backend used by the CLI for inference
pub type InferBackend = burn::backend::Wgpu;

pub struct BurnSpanModel<B: Backend> {
    model:   TransformerSpanModel<B>,
    batcher: TokenBatcher<B>,
}

impl<B: Backend> BurnSpanModel<B> {
    pub fn new(model: TransformerSpanModel<B>, device: B::Device) -> Self {
        Self { model, batcher: TokenBatcher::new(device) }
    }

    /// Rebuild the architecture from `model_config.json` and load its weights.
    pub fn from_checkpoint(ckpt: &CheckpointManager, device: B::Device) -> anyhow::Result<Self> {
        let cfg   = ckpt.load_config()?;
        let model = cfg.init::<B>(&device);
        let model = ckpt.load_model(model, &device)?;
        tracing::info!(
            "Span model loaded: {} layers, d_model={}, max_seq_len={}",
            cfg.num_layers, cfg.d_model, cfg.max_seq_len
        );
        Ok(Self::new(model, device))
    }

    pub fn max_seq_len(&self) -> usize {
        self.model.max_seq_len
    }
}

impl<B: Backend> SpanModel for BurnSpanModel<B> {
    fn span_logits(&self, batch: &EncodedBatch) -> Result<SpanLogits> {
        if batch.is_empty() || batch.width == 0 {
            return Err(QaError::Model("cannot run the model on an empty batch".to_string()));
        }
        if batch.width > self.model.max_seq_len {
            return Err(QaError::Model(format!(
                "batch width {} exceeds the model's {} positions",
                batch.width, self.model.max_seq_len
            )));
        }

        let input  = self.batcher.batch(batch);
        let output = self.model.forward(input);

        let start: Vec<f32> = output.start_logits.into_data().iter::<f32>().collect();
        let end:   Vec<f32> = output.end_logits.into_data().iter::<f32>().collect();

        tracing::debug!("Forward pass over {} × {} tokens", batch.batch_size(), batch.width);
        Ok(SpanLogits::from_flat(&start, &end, batch.batch_size(), batch.width))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::encoder::pad_collate;
    use crate::ml::model::SpanModelConfig;
    use burn::backend::NdArray;

    fn tiny_model() -> BurnSpanModel<NdArray> {
        let device = Default::default();
        let cfg = SpanModelConfig::new(32)
            .with_max_seq_len(8)
            .with_d_model(8)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(16);
        BurnSpanModel::new(cfg.init(&device), device)
    }

    #[test]
    fn test_logits_match_batch_shape() {
        let batch  = pad_collate(vec![vec![2, 9, 3, 4, 3], vec![2, 3, 4, 3]], 0, false);
        let logits = tiny_model().span_logits(&batch).unwrap();

        assert_eq!(logits.rows(), 2);
        assert!(logits.start.iter().all(|r| r.len() == 5));
        assert!(logits.end.iter().all(|r| r.len() == 5));
    }

    #[test]
    fn test_rejects_batch_wider_than_positions() {
        let batch = pad_collate(vec![vec![5; 9]], 0, false);
        assert!(matches!(tiny_model().span_logits(&batch), Err(QaError::Model(_))));
    }

    #[test]
    fn test_rejects_empty_batch() {
        let batch = pad_collate(Vec::new(), 0, false);
        assert!(tiny_model().span_logits(&batch).is_err());
    }
}
