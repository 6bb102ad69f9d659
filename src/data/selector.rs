// ============================================================
// Layer 4 - Context Selector
// ============================================================
// Turns similarity scores into the short list of sections the
// span model will read.
//
// Policy (coverage cutoff):
//   1. Sort by score, highest first (stable)
//   2. Keep the top k
//   3. Normalise those k scores to sum to 1
//   4. Walk in rank order; before adding a section, stop if the
//      mass of the sections *already added* exceeds p
//
// Because the check happens before adding, the section that
// pushes the total over p is still included:
//
//   scores 0.9, 0.4, 0.05   k=5 p=0.6
//   normalised 0.667, 0.296, 0.037
//   total 0.000 ≤ 0.6 → add #1 (total 0.667)
//   total 0.667 > 0.6 → stop         selected = [#1]

use crate::domain::document::{DocId, ScoredDocument};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_COVERAGE: f64 = 0.6;

/// Selection parameters: at most `top_k` sections, cut at `coverage` mass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextSelector {
    pub top_k:    usize,
    pub coverage: f64,
}

impl Default for ContextSelector {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K, coverage: DEFAULT_COVERAGE }
    }
}

impl ContextSelector {
    pub fn new(top_k: usize, coverage: f64) -> Self {
        Self { top_k, coverage }
    }

    /// Ranked, cut-off list of ids. See the module comment for the policy.
    pub fn select(&self, scores: &[ScoredDocument]) -> Vec<DocId> {
        self.select_scored(scores).into_iter().map(|s| s.id).collect()
    }

    /// Same as `select` but keeps each section's raw similarity score.
    pub fn select_scored(&self, scores: &[ScoredDocument]) -> Vec<ScoredDocument> {
        let top = rank(scores, self.top_k);
        if top.is_empty() {
            return Vec::new();
        }

        let sum: f64 = top.iter().map(|s| s.score).sum();
        // An all-zero top-k has no mass to normalise; every share counts as 0
        // and the whole top-k passes the cutoff.
        let share = |s: &ScoredDocument| if sum != 0.0 { s.score / sum } else { 0.0 };

        let mut selected = Vec::with_capacity(top.len());
        let mut total = 0.0f64;
        for doc in &top {
            if total > self.coverage {
                break;
            }
            selected.push(*doc);
            total += share(doc);
        }

        tracing::debug!(
            "Selected {} of {} top-ranked sections (coverage {:.3})",
            selected.len(),
            top.len(),
            total
        );
        selected
    }
}

/// Sort descending by score and keep the first `k`.
/// `sort_by` is stable, so equal scores keep their row order.
fn rank(scores: &[ScoredDocument], k: usize) -> Vec<ScoredDocument> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(k);
    ranked
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn scored(pairs: &[(DocId, f64)]) -> Vec<ScoredDocument> {
        pairs.iter().map(|&(id, s)| ScoredDocument::new(id, s)).collect()
    }

    #[test]
    fn test_protein_scenario_selects_only_top_doc() {
        // {doc3: 0.9, doc7: 0.4, doc1: 0.05} in arbitrary order
        let scores = scored(&[(1, 0.05), (3, 0.9), (7, 0.4)]);
        let selector = ContextSelector::new(5, 0.6);
        assert_eq!(selector.select(&scores), vec![3]);
    }

    #[test]
    fn test_item_crossing_the_threshold_is_included() {
        // normalised 0.25 each: totals before adding are 0, .25, .5, .75
        let scores = scored(&[(0, 1.0), (1, 1.0), (2, 1.0), (3, 1.0)]);
        let selector = ContextSelector::new(5, 0.6);
        assert_eq!(selector.select(&scores), vec![0, 1, 2]);
    }

    #[test]
    fn test_ties_keep_row_order() {
        let scores = scored(&[(4, 0.5), (2, 0.5), (9, 0.5)]);
        let selector = ContextSelector::new(5, 1.0);
        assert_eq!(selector.select(&scores), vec![4, 2, 9]);
    }

    #[test]
    fn test_never_more_than_k() {
        let scores: Vec<_> = (0..20).map(|i| ScoredDocument::new(i, 0.1)).collect();
        for k in 0..8 {
            let selector = ContextSelector::new(k, 1.0);
            assert!(selector.select(&scores).len() <= k);
        }
    }

    #[test]
    fn test_larger_coverage_never_shortens_selection() {
        let scores = scored(&[(0, 0.7), (1, 0.5), (2, 0.3), (3, 0.2), (4, 0.1), (5, 0.05)]);
        let mut prev = 0;
        for step in 0..=20 {
            let p = step as f64 * 0.05;
            let n = ContextSelector::new(5, p).select(&scores).len();
            assert!(n >= prev, "p={p} gave {n} < {prev}");
            prev = n;
        }
    }

    #[test]
    fn test_empty_scores_select_nothing() {
        assert!(ContextSelector::default().select(&[]).is_empty());
    }

    #[test]
    fn test_only_top_doc_when_coverage_is_zero() {
        let scores = scored(&[(0, 0.3), (1, 0.2)]);
        assert_eq!(ContextSelector::new(5, 0.0).select(&scores), vec![0]);
    }

    #[test]
    fn test_coverage_total_uses_double_precision() {
        // 0.2 + 0.2 + 0.2 is 0.6000000000000001 in f64, already past p=0.6,
        // so the fourth section is not added. In f32 the total rounds to 0.6.
        let scores = scored(&[(0, 0.2), (1, 0.2), (2, 0.2), (3, 0.2), (4, 0.2)]);
        assert_eq!(ContextSelector::new(5, 0.6).select(&scores), vec![0, 1, 2]);
    }

    #[test]
    fn test_select_scored_keeps_raw_scores() {
        let scores = scored(&[(3, 0.9), (7, 0.4)]);
        let picked = ContextSelector::new(5, 0.6).select_scored(&scores);
        assert_eq!(picked, vec![ScoredDocument::new(3, 0.9)]);
    }
}
