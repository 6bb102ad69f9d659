// ============================================================
// Layer 4 - Sparse Term Matrix
// ============================================================
// The prebuilt document × vocabulary TF-IDF matrix, stored in
// Compressed Sparse Row (CSR) form:
//
//   indptr  [rows + 1]  row i owns entries indptr[i]..indptr[i+1]
//   indices [nnz]       column of each entry
//   data    [nnz]       weight of each entry
//
// A textbook of a few thousand sections against a vocabulary of
// tens of thousands of terms is >99% zeros, so we never densify.
//
// Reference: Saad (2003), Iterative Methods for Sparse Linear
//            Systems §3.4 (CSR storage)

use serde::{Deserialize, Serialize};

use crate::domain::error::{QaError, Result};

/// A sparse row vector: sorted column indices and their values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values:  Vec<f32>,
}

impl SparseVector {
    /// Build from (column, value) pairs. Pairs are sorted by column and
    /// explicit zeros dropped.
    pub fn from_pairs(mut pairs: Vec<(usize, f32)>) -> Self {
        pairs.sort_by_key(|(col, _)| *col);
        let (indices, values) = pairs.into_iter().filter(|(_, v)| *v != 0.0).unzip();
        Self { indices, values }
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|&v| f64::from(v) * f64::from(v)).sum::<f64>().sqrt()
    }
}

/// On-disk CSR layout (JSON). Same field names as scipy's csr_matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsrMatrix {
    /// [rows, cols]
    pub shape:   [usize; 2],
    pub indptr:  Vec<usize>,
    pub indices: Vec<usize>,
    pub data:    Vec<f32>,
}

impl CsrMatrix {
    pub fn rows(&self) -> usize {
        self.shape[0]
    }

    pub fn cols(&self) -> usize {
        self.shape[1]
    }

    /// Column indices and values of row `i`.
    pub fn row(&self, i: usize) -> (&[usize], &[f32]) {
        let range = self.indptr[i]..self.indptr[i + 1];
        (&self.indices[range.clone()], &self.data[range])
    }

    /// Euclidean norm of every row, computed once at load time.
    pub fn row_norms(&self) -> Vec<f64> {
        (0..self.rows())
            .map(|i| {
                self.row(i).1.iter().map(|&v| f64::from(v) * f64::from(v)).sum::<f64>().sqrt()
            })
            .collect()
    }

    /// Dot product of row `i` with a sparse vector.
    ///
    /// Both sides are walked in column order. Rows written by scipy
    /// are not guaranteed sorted, so `validate` sorts them on load.
    pub fn row_dot(&self, i: usize, v: &SparseVector) -> f64 {
        let (cols, vals) = self.row(i);
        let (mut a, mut b) = (0usize, 0usize);
        let mut dot = 0.0f64;
        while a < cols.len() && b < v.indices.len() {
            match cols[a].cmp(&v.indices[b]) {
                std::cmp::Ordering::Less    => a += 1,
                std::cmp::Ordering::Greater => b += 1,
                std::cmp::Ordering::Equal   => {
                    dot += f64::from(vals[a]) * f64::from(v.values[b]);
                    a += 1;
                    b += 1;
                }
            }
        }
        dot
    }

    /// Check structural consistency and sort each row by column.
    /// `path` is only used for error messages.
    pub fn validate(mut self, path: &str) -> Result<Self> {
        let [rows, cols] = self.shape;
        if self.indptr.len() != rows + 1 {
            return Err(QaError::artifact(path, format!(
                "indptr has {} entries, expected {}", self.indptr.len(), rows + 1
            )));
        }
        if self.indices.len() != self.data.len() {
            return Err(QaError::artifact(path, "indices and data lengths differ"));
        }
        if self.indptr.first() != Some(&0) || self.indptr.last() != Some(&self.data.len()) {
            return Err(QaError::artifact(path, "indptr must start at 0 and end at nnz"));
        }
        if self.indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(QaError::artifact(path, "indptr is not monotone"));
        }
        if let Some(bad) = self.indices.iter().find(|&&c| c >= cols) {
            return Err(QaError::artifact(path, format!(
                "column index {bad} out of range for {cols} columns"
            )));
        }
        if self.data.iter().any(|v| !v.is_finite()) {
            return Err(QaError::artifact(path, "matrix contains non-finite weights"));
        }

        for i in 0..rows {
            let range = self.indptr[i]..self.indptr[i + 1];
            let mut entries: Vec<(usize, f32)> = self.indices[range.clone()]
                .iter()
                .copied()
                .zip(self.data[range.clone()].iter().copied())
                .collect();
            entries.sort_by_key(|(c, _)| *c);
            for (offset, (c, v)) in entries.into_iter().enumerate() {
                self.indices[range.start + offset] = c;
                self.data[range.start + offset] = v;
            }
        }
        Ok(self)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> CsrMatrix {
        // [[1, 0, 2],
        //  [0, 0, 0],
        //  [0, 3, 0]]
        CsrMatrix {
            shape:   [3, 3],
            indptr:  vec![0, 2, 2, 3],
            indices: vec![2, 0, 1],
            data:    vec![2.0, 1.0, 3.0],
        }
    }

    #[test]
    fn test_validate_sorts_rows() {
        let m = small().validate("m.json").unwrap();
        assert_eq!(m.row(0), (&[0usize, 2][..], &[1.0f32, 2.0][..]));
        assert!(m.row(1).0.is_empty());
    }

    #[test]
    fn test_row_dot_and_norms() {
        let m = small().validate("m.json").unwrap();
        let v = SparseVector::from_pairs(vec![(2, 1.0), (1, 1.0)]);
        assert_eq!(m.row_dot(0, &v), 2.0);
        assert_eq!(m.row_dot(1, &v), 0.0);
        assert_eq!(m.row_dot(2, &v), 3.0);
        let norms = m.row_norms();
        assert!((norms[0] - 5.0f64.sqrt()).abs() < 1e-12);
        assert_eq!(norms[1], 0.0);
    }

    #[test]
    fn test_validate_rejects_bad_indptr() {
        let mut m = small();
        m.indptr = vec![0, 2, 3];
        assert!(matches!(m.validate("m.json"), Err(QaError::Artifact { .. })));
    }

    #[test]
    fn test_validate_rejects_column_out_of_range() {
        let mut m = small();
        m.indices[2] = 7;
        assert!(m.validate("m.json").is_err());
    }

    #[test]
    fn test_sparse_vector_drops_zeros() {
        let v = SparseVector::from_pairs(vec![(3, 0.0), (1, 2.0)]);
        assert_eq!(v.indices, vec![1]);
        assert_eq!(v.nnz(), 1);
    }
}
