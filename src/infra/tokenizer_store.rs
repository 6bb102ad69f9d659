// ============================================================
// Layer 6 - Tokenizer Store
// ============================================================
// Loads the subword tokenizer the span model was trained with
// (HuggingFace `tokenizer.json`) and resolves the ids of the
// special tokens the encoder needs.
//
// A `tokenizer.json` saved after enabling padding or truncation
// would apply them to every encode call and put pad ids inside
// the passage and question segments. Both are cleared on load;
// the encoder does its own budgeting and padding.
//
// The tokenizer is loaded once at startup. A tokenizer missing
// [CLS] or [SEP] cannot build model inputs, so that is reported
// at load time instead of on the first question.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

/// Ids of the tokens that frame every encoded row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    pub cls: u32,
    pub sep: u32,
    pub pad: u32,
}

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("tokenizer.json")
    }

    /// Load `tokenizer.json` from the model directory
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.path();
        let mut tokenizer = Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))?;

        if tokenizer.get_padding().is_some() || tokenizer.get_truncation().is_some() {
            tracing::debug!("Clearing padding/truncation saved in '{}'", path.display());
        }
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(None)
            .map_err(|e| anyhow::anyhow!("Cannot disable truncation: {}", e))?;
        tracing::info!(
            "Loaded tokenizer from '{}' (vocab size {})",
            path.display(),
            tokenizer.get_vocab_size(true)
        );
        Ok(tokenizer)
    }
}

/// Look up the framing tokens by their surface form.
pub fn resolve_special_tokens(
    tokenizer: &Tokenizer,
    cls_token: &str,
    sep_token: &str,
    pad_id:    u32,
) -> Result<SpecialTokens> {
    let lookup = |token: &str| {
        tokenizer
            .token_to_id(token)
            .with_context(|| format!("Tokenizer has no '{token}' token"))
    };
    Ok(SpecialTokens {
        cls: lookup(cls_token)?,
        sep: lookup(sep_token)?,
        pad: pad_id,
    })
}

// ─── Test Fixture ─────────────────────────────────────────────────────────────
// A whitespace word-level tokenizer in HuggingFace JSON format.
// Ids: <pad>=0 [UNK]=1 [CLS]=2 [SEP]=3, then `words` from 4 in order.
// With no decoder configured, decode() joins tokens with spaces.
#[cfg(test)]
pub mod fixture {
    use tokenizers::Tokenizer;

    pub const PAD: u32 = 0;
    pub const CLS: u32 = 2;
    pub const SEP: u32 = 3;

    pub fn tokenizer_json(words: &[&str]) -> String {
        let mut vocab = serde_json::json!({
            "<pad>": 0,
            "[UNK]": 1,
            "[CLS]": 2,
            "[SEP]": 3,
        });
        for (i, word) in words.iter().enumerate() {
            vocab[*word] = serde_json::json!(4 + i);
        }

        serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0, "content": "<pad>", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1, "content": "[UNK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 2, "content": "[CLS]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 3, "content": "[SEP]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        })
        .to_string()
    }

    /// Same vocabulary, saved with fixed-width padding and truncation enabled.
    pub fn tokenizer_json_with_batch_settings(words: &[&str], width: usize) -> String {
        let mut json: serde_json::Value = serde_json::from_str(&tokenizer_json(words)).unwrap();
        json["padding"] = serde_json::json!({
            "strategy": { "Fixed": width },
            "direction": "Right",
            "pad_to_multiple_of": null,
            "pad_id": PAD,
            "pad_type_id": 0,
            "pad_token": "<pad>"
        });
        json["truncation"] = serde_json::json!({
            "direction": "Right",
            "max_length": width / 2,
            "strategy": "LongestFirst",
            "stride": 0
        });
        json.to_string()
    }

    pub fn tokenizer(words: &[&str]) -> Tokenizer {
        tokenizer_json(words).parse().unwrap()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_resolve() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tokenizer.json"),
            fixture::tokenizer_json(&["protein", "amino"]),
        ).unwrap();

        let tok = TokenizerStore::new(dir.path()).load().unwrap();
        let special = resolve_special_tokens(&tok, "[CLS]", "[SEP]", 0).unwrap();
        assert_eq!(special, SpecialTokens { cls: fixture::CLS, sep: fixture::SEP, pad: fixture::PAD });
    }

    #[test]
    fn test_saved_padding_and_truncation_are_cleared() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tokenizer.json"),
            fixture::tokenizer_json_with_batch_settings(&["proteins", "are", "chains", "of", "amino", "acids"], 8),
        ).unwrap();

        let tok = TokenizerStore::new(dir.path()).load().unwrap();
        assert!(tok.get_padding().is_none());
        assert!(tok.get_truncation().is_none());

        let ids = tok.encode("proteins are chains of amino acids", false).unwrap();
        assert_eq!(ids.get_ids(), &[4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_missing_special_token() {
        let tok = fixture::tokenizer(&["protein"]);
        assert!(resolve_special_tokens(&tok, "<s>", "[SEP]", 0).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TokenizerStore::new(dir.path()).load().is_err());
    }
}
