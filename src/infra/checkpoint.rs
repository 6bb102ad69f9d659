// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Restores the span model from a model directory using Burn's
// CompactRecorder.
//
// Model directory layout:
//   models/base/
//     model_config.json   ← architecture (SpanModelConfig)
//     model.mpk.gz        ← weights (MessagePack + gzip)
//     tokenizer.json      ← read by TokenizerStore
//
// Why keep the config separately?
//   The record only holds parameters. To load it we first rebuild
//   the exact same architecture (d_model, num_layers, ...), then
//   pour the weights into it. Loading fails if they don't match.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use std::path::PathBuf;

use crate::ml::model::{SpanModelConfig, TransformerSpanModel};

const CONFIG_FILE:  &str = "model_config.json";
const WEIGHTS_STEM: &str = "model";

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Read the architecture description written next to the weights.
    pub fn load_config(&self) -> Result<SpanModelConfig> {
        let path = self.dir.join(CONFIG_FILE);
        SpanModelConfig::load(&path).map_err(|e| {
            anyhow::anyhow!("Cannot read model config from '{}': {}", path.display(), e)
        })
    }

    /// Load `model.mpk.gz` into a freshly initialised model of the right shape.
    pub fn load_model<B: Backend>(
        &self,
        model:  TransformerSpanModel<B>,
        device: &B::Device,
    ) -> Result<TransformerSpanModel<B>> {
        let path = self.dir.join(WEIGHTS_STEM);
        tracing::info!("Loading span model weights from '{}'", self.dir.display());

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load weights '{}.mpk.gz'", path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Write a model directory in the layout `load_config` / `load_model` read.
    #[cfg(test)]
    pub fn save<B: Backend>(&self, cfg: &SpanModelConfig, model: &TransformerSpanModel<B>) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let cfg_path = self.dir.join(CONFIG_FILE);
        cfg.save(&cfg_path)
            .with_context(|| format!("Cannot write config to '{}'", cfg_path.display()))?;

        let path = self.dir.join(WEIGHTS_STEM);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save weights to '{}'", path.display()))?;

        tracing::debug!("Saved span model to '{}'", self.dir.display());
        Ok(())
    }
}
