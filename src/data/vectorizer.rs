// ============================================================
// Layer 4 - TF-IDF Vectorizer
// ============================================================
// Maps raw text into the same vector space as the prebuilt term
// matrix. The vocabulary and idf weights were fitted offline
// together with the matrix; here we only *apply* them.
//
// Transform steps (applied in order):
//   1. Lowercase (optional)
//   2. Extract tokens with the fitted token regex
//   3. Drop stop words (optional)
//   4. Expand to word n-grams over ngram_range
//   5. Count terms that are in the vocabulary
//   6. tf (raw or 1 + ln tf) × idf[column]
//   7. Normalise the row (l2 by default)
//
// Terms outside the vocabulary are silently ignored, so a query
// made only of unknown words becomes the zero vector.
//
// Reference: Manning, Raghavan & Schütze (2008) IR Book §6.2-6.3

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::{fs, path::Path};

use crate::data::sparse::SparseVector;
use crate::domain::error::{QaError, Result};

/// Same default as the fitted vectorizer: words of 2+ word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

fn default_true() -> bool { true }
fn default_pattern() -> String { DEFAULT_TOKEN_PATTERN.to_string() }
fn default_ngram() -> [usize; 2] { [1, 1] }
fn default_norm() -> Option<Norm> { Some(Norm::L2) }

/// The fitted vectorizer as written to disk (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    /// term → column of the term matrix
    pub vocabulary: HashMap<String, usize>,

    /// One idf weight per column
    pub idf: Vec<f32>,

    #[serde(default = "default_true")]
    pub lowercase: bool,

    #[serde(default = "default_pattern")]
    pub token_pattern: String,

    #[serde(default)]
    pub stop_words: Vec<String>,

    #[serde(default = "default_ngram")]
    pub ngram_range: [usize; 2],

    #[serde(default)]
    pub sublinear_tf: bool,

    #[serde(default = "default_true")]
    pub use_idf: bool,

    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

/// A loaded, ready-to-use vectorizer (regex compiled, stop words hashed).
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary:   HashMap<String, usize>,
    idf:          Vec<f32>,
    lowercase:    bool,
    token_re:     Regex,
    stop_words:   HashSet<String>,
    ngram_range:  (usize, usize),
    sublinear_tf: bool,
    use_idf:      bool,
    norm:         Option<Norm>,
}

impl TfidfVectorizer {
    /// Read and validate a vectorizer JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let json = fs::read_to_string(path)
            .map_err(|e| QaError::artifact(&shown, e.to_string()))?;
        let artifact: VectorizerArtifact = serde_json::from_str(&json)
            .map_err(|e| QaError::artifact(&shown, e.to_string()))?;
        Self::from_artifact(artifact, &shown)
    }

    pub fn from_artifact(a: VectorizerArtifact, path: &str) -> Result<Self> {
        let token_re = Regex::new(&a.token_pattern)
            .map_err(|e| QaError::artifact(path, format!("bad token_pattern: {e}")))?;

        let [min_n, max_n] = a.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(QaError::artifact(path, format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        if let Some((term, col)) = a.vocabulary.iter().find(|(_, &c)| c >= a.idf.len()) {
            return Err(QaError::artifact(path, format!(
                "term '{term}' maps to column {col} but idf has {} entries", a.idf.len()
            )));
        }

        let stop_words = a.stop_words
            .into_iter()
            .map(|w| if a.lowercase { w.to_lowercase() } else { w })
            .collect();

        Ok(Self {
            vocabulary:   a.vocabulary,
            idf:          a.idf,
            lowercase:    a.lowercase,
            token_re,
            stop_words,
            ngram_range:  (min_n, max_n),
            sublinear_tf: a.sublinear_tf,
            use_idf:      a.use_idf,
            norm:         a.norm,
        })
    }

    /// Number of columns (must equal the term matrix's column count)
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// Steps 1-4: text → list of terms (unigrams and n-grams).
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase { text.to_lowercase() } else { text.to_string() };

        let tokens: Vec<&str> = self.token_re
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n == 1 {
                terms.extend(tokens.iter().map(|t| t.to_string()));
            } else {
                terms.extend(tokens.windows(n).map(|w| w.join(" ")));
            }
        }
        terms
    }

    /// Steps 5-7: text → normalised sparse tf-idf vector.
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&col) = self.vocabulary.get(&term) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }

        let mut pairs: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(col, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                let w  = if self.use_idf { tf * self.idf[col] } else { tf };
                (col, w)
            })
            .collect();

        let total = match self.norm {
            Some(Norm::L2) => pairs.iter().map(|(_, w)| w * w).sum::<f32>().sqrt(),
            Some(Norm::L1) => pairs.iter().map(|(_, w)| w.abs()).sum::<f32>(),
            None           => 1.0,
        };
        if total > 0.0 {
            for (_, w) in pairs.iter_mut() {
                *w /= total;
            }
        }

        SparseVector::from_pairs(pairs)
    }
}
