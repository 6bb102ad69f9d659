// ============================================================
// Layer 4 - Term Vector Index
// ============================================================
// Scores every textbook section against a query by cosine
// similarity in TF-IDF space.
//
//   cos(d, q) = (d · q) / (|d| |q|)
//
// Only sections that share at least one term with the query get
// a nonzero dot product, and only those are returned. Sections
// with zero overlap are omitted rather than scored as zero.
//
// Both artifacts are loaded once at startup and never mutated.

use std::fs;
use std::path::Path;

use crate::data::sparse::{CsrMatrix, SparseVector};
use crate::data::vectorizer::TfidfVectorizer;
use crate::domain::document::ScoredDocument;
use crate::domain::error::{QaError, Result};

pub struct TermVectorIndex {
    matrix:     CsrMatrix,
    row_norms:  Vec<f64>,
    vectorizer: TfidfVectorizer,
}

impl TermVectorIndex {
    /// Build from an already-loaded matrix and vectorizer.
    /// Fails if their column counts disagree.
    pub fn new(matrix: CsrMatrix, vectorizer: TfidfVectorizer) -> Result<Self> {
        if matrix.cols() != vectorizer.dimension() {
            return Err(QaError::artifact("term index", format!(
                "matrix has {} columns but vectorizer has {}",
                matrix.cols(),
                vectorizer.dimension()
            )));
        }
        let row_norms = matrix.row_norms();
        Ok(Self { matrix, row_norms, vectorizer })
    }

    /// Load the CSR matrix JSON and the vectorizer JSON from disk.
    pub fn load(matrix_path: impl AsRef<Path>, vectorizer_path: impl AsRef<Path>) -> Result<Self> {
        let matrix_path = matrix_path.as_ref();
        let shown = matrix_path.display().to_string();

        let json = fs::read_to_string(matrix_path)
            .map_err(|e| QaError::artifact(&shown, e.to_string()))?;
        let matrix: CsrMatrix = serde_json::from_str(&json)
            .map_err(|e| QaError::artifact(&shown, e.to_string()))?;
        let matrix = matrix.validate(&shown)?;

        let vectorizer = TfidfVectorizer::load(vectorizer_path)?;

        tracing::info!(
            "Loaded term index: {} documents × {} terms ({} nonzeros)",
            matrix.rows(),
            matrix.cols(),
            matrix.data.len()
        );
        Self::new(matrix, vectorizer)
    }

    pub fn num_documents(&self) -> usize {
        self.matrix.rows()
    }

    /// Project a query into the index's vector space.
    pub fn vectorize(&self, query: &str) -> SparseVector {
        self.vectorizer.transform(query)
    }

    /// Cosine similarity of the query against every document,
    /// nonzero entries only, in row order.
    pub fn score(&self, query: &str) -> Vec<ScoredDocument> {
        let q = self.vectorize(query);
        let q_norm = q.norm();
        if q.is_empty() || q_norm == 0.0 {
            tracing::debug!("Query '{}' has no terms in the vocabulary", query);
            return Vec::new();
        }
        tracing::debug!("Query vector has {} nonzero terms", q.nnz());

        let scores: Vec<ScoredDocument> = (0..self.matrix.rows())
            .filter_map(|i| {
                let d_norm = self.row_norms[i];
                if d_norm == 0.0 {
                    return None;
                }
                let sim = self.matrix.row_dot(i, &q) / (d_norm * q_norm);
                (sim != 0.0).then(|| ScoredDocument::new(i, sim))
            })
            .collect();

        tracing::debug!("Query matched {} of {} documents", scores.len(), self.matrix.rows());
        scores
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::vectorizer::{Norm, VectorizerArtifact, DEFAULT_TOKEN_PATTERN};
    use std::io::Write;

    /// Three tiny "sections":
    ///   0: protein amino
    ///   1: fiber
    ///   2: protein
    fn index() -> TermVectorIndex {
        let vocabulary = [("protein", 0), ("amino", 1), ("fiber", 2)]
            .into_iter()
            .map(|(t, c)| (t.to_string(), c))
            .collect();
        let vectorizer = TfidfVectorizer::from_artifact(VectorizerArtifact {
            vocabulary,
            idf:           vec![1.0, 1.0, 1.0],
            lowercase:     true,
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            stop_words:    Vec::new(),
            ngram_range:   [1, 1],
            sublinear_tf:  false,
            use_idf:       true,
            norm:          Some(Norm::L2),
        }, "v.json").unwrap();

        let matrix = CsrMatrix {
            shape:   [3, 3],
            indptr:  vec![0, 2, 3, 4],
            indices: vec![0, 1, 2, 0],
            data:    vec![1.0, 1.0, 1.0, 1.0],
        }.validate("m.json").unwrap();

        TermVectorIndex::new(matrix, vectorizer).unwrap()
    }

    #[test]
    fn test_zero_overlap_documents_are_omitted() {
        let scores = index().score("what is protein?");
        let ids: Vec<usize> = scores.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_cosine_values() {
        let scores = index().score("protein");
        // doc 2 is exactly "protein" → 1.0; doc 0 → 1/√2
        assert!((scores[1].score - 1.0).abs() < 1e-6);
        assert!((scores[0].score - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn test_empty_or_unknown_query_scores_nothing() {
        let idx = index();
        assert!(idx.score("").is_empty());
        assert!(idx.score("vitamins minerals").is_empty());
    }

    #[test]
    fn test_load_from_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let m_path = dir.path().join("matrix.json");
        let v_path = dir.path().join("vectorizer.json");

        let mut f = std::fs::File::create(&m_path).unwrap();
        write!(f, r#"{{"shape":[2,2],"indptr":[0,1,2],"indices":[0,1],"data":[0.5,0.8]}}"#).unwrap();
        std::fs::write(&v_path, r#"{"vocabulary":{"fat":0,"fiber":1},"idf":[1.0,1.0]}"#).unwrap();

        let idx = TermVectorIndex::load(&m_path, &v_path).unwrap();
        assert_eq!(idx.num_documents(), 2);
        let scores = idx.score("Fiber");
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].id, 1);
    }

    #[test]
    fn test_column_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let m_path = dir.path().join("matrix.json");
        let v_path = dir.path().join("vectorizer.json");
        std::fs::write(&m_path, r#"{"shape":[1,3],"indptr":[0,1],"indices":[2],"data":[1.0]}"#).unwrap();
        std::fs::write(&v_path, r#"{"vocabulary":{"fat":0},"idf":[1.0]}"#).unwrap();

        assert!(matches!(
            TermVectorIndex::load(&m_path, &v_path),
            Err(QaError::Artifact { .. })
        ));
    }
}
