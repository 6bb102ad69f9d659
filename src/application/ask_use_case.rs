// ============================================================
// Layer 2 - Ask Use Case
// ============================================================
// Retrieval + extraction, end to end:
//   1. Score every section against the question     (TermVectorIndex)
//   2. Keep the top sections up to the coverage cut (ContextSelector)
//   3. Fetch their text                             (DocumentStore)
//   4. Encode (section, question) pairs as a batch  (SequenceEncoder)
//   5. Run the span model, pick the best span       (SpanExtractor)
//
// All artifacts are loaded once in `from_config` and then held
// read-only; each question builds its own batch.

use anyhow::{Context, Result};
use tokenizers::Tokenizer;

use crate::application::config::AskConfig;
use crate::data::{
    encoder::SequenceEncoder,
    index::TermVectorIndex,
    selector::ContextSelector,
    store::SqliteDocumentStore,
};
use crate::domain::answer::Answer;
use crate::domain::document::{DocId, Document, RetrievedSection};
use crate::domain::traits::{DocumentStore, QuestionAnswerer, SpanModel};
use crate::infra::{
    checkpoint::CheckpointManager,
    tokenizer_store::{resolve_special_tokens, TokenizerStore},
};
use crate::ml::extractor::SpanExtractor;
use crate::ml::inferencer::{BurnSpanModel, InferBackend};

pub struct AskUseCase<S: DocumentStore, M: SpanModel> {
    index:     TermVectorIndex,
    selector:  ContextSelector,
    store:     S,
    tokenizer: Tokenizer,
    encoder:   SequenceEncoder,
    extractor: SpanExtractor<M>,
}

/// The production wiring: SQLite store + transformer checkpoint on WGPU.
pub type DefaultAskUseCase = AskUseCase<SqliteDocumentStore, BurnSpanModel<InferBackend>>;

impl DefaultAskUseCase {
    /// Load every artifact named in `config`. Called once at startup.
    pub fn from_config(config: &AskConfig) -> Result<Self> {
        config.validate()?;

        let index = TermVectorIndex::load(&config.matrix_path, &config.vectorizer_path)
            .context("Cannot load the term index")?;
        let store = SqliteDocumentStore::open(&config.db_path)
            .with_context(|| format!("Cannot open document store '{}'", config.db_path.display()))?;
        let sections = store.count().context("Cannot count the stored sections")?;
        if sections != index.num_documents() {
            tracing::warn!(
                "Document store has {} sections but the term matrix has {} rows",
                sections,
                index.num_documents()
            );
        }
        let tokenizer = TokenizerStore::new(&config.model_dir).load()?;

        let ckpt  = CheckpointManager::new(&config.model_dir);
        let model = BurnSpanModel::<InferBackend>::from_checkpoint(&ckpt, Default::default())?;
        if model.max_seq_len() < config.max_seq_len {
            tracing::warn!(
                "Model has {} positions but max_seq_len is {}; long sections will be rejected",
                model.max_seq_len(),
                config.max_seq_len
            );
        }

        Self::new(index, store, tokenizer, model, config)
    }
}

impl<S: DocumentStore, M: SpanModel> AskUseCase<S, M> {
    /// Assemble a pipeline from already-loaded parts.
    pub fn new(
        index:     TermVectorIndex,
        store:     S,
        tokenizer: Tokenizer,
        model:     M,
        config:    &AskConfig,
    ) -> Result<Self> {
        config.validate()?;

        let special = resolve_special_tokens(&tokenizer, &config.cls_token, &config.sep_token, config.pad_id)?;
        let encoder = SequenceEncoder::new(
            special,
            config.max_seq_len,
            config.reserved_slots,
            config.pad_first,
        );

        Ok(Self {
            index,
            selector:  ContextSelector::new(config.top_k, config.coverage),
            store,
            tokenizer,
            encoder,
            extractor: SpanExtractor::new(model, config.pad_marker.clone()),
        })
    }

    /// Steps 1-3 only: the sections that would be read for `question`.
    pub fn retrieve(&self, question: &str) -> Result<Vec<RetrievedSection>> {
        let scores   = self.index.score(question);
        let selected = self.selector.select_scored(&scores);

        selected
            .into_iter()
            .map(|doc| {
                let text = self.store
                    .fetch(doc.id)
                    .with_context(|| format!("Cannot fetch section {}", doc.id))?;
                Ok(RetrievedSection { id: doc.id, score: doc.score, text })
            })
            .collect()
    }

    /// Full pipeline: best answer span and the section it came from.
    pub fn answer(&self, question: &str) -> Result<Answer> {
        let ids = self.selector.select(&self.index.score(question));
        if ids.is_empty() {
            tracing::info!("No section matched '{}'", question);
            return Ok(Answer::no_matching_section());
        }
        tracing::debug!("Reading sections {:?}", ids);

        let passages: Vec<String> = self.fetch_documents(&ids)?
            .into_iter()
            .map(|d| d.text)
            .collect();
        let batch = self.encoder
            .encode(&self.tokenizer, &passages, question)
            .context("Cannot encode sections")?;

        let answer = self.extractor
            .predict(&self.tokenizer, &batch, &passages)
            .context("Span extraction failed")?;

        tracing::info!("Answer: '{}'", answer.text);
        Ok(answer)
    }

    fn fetch_documents(&self, ids: &[DocId]) -> Result<Vec<Document>> {
        ids.iter()
            .map(|&id| {
                let text = self.store
                    .fetch(id)
                    .with_context(|| format!("Cannot fetch section {}", id))?;
                Ok(Document::new(id, text))
            })
            .collect()
    }
}

impl<S: DocumentStore, M: SpanModel> QuestionAnswerer for AskUseCase<S, M> {
    fn answer(&self, question: &str) -> Result<Answer> {
        AskUseCase::answer(self, question)
    }
}
