// ============================================================
// Layer 3 - Span Predictions and Answers
// ============================================================
// Extractive Q&A: the model points at a start token and an end
// token inside a passage, and the answer is the text between.
//
// Example:
//   Question: "what is protein?"
//   Passage:  "Proteins are macromolecules made of amino acids ..."
//   Span:     tokens 3..6 → "macromolecules made of amino acids"
//
// Reference: Devlin et al. (2019) - BERT paper, §4.2 (SQuAD)

use serde::{Deserialize, Serialize};

/// Answer text used when retrieval finds no matching section.
pub const NO_SECTION_ANSWER: &str = "could not find a section which matched query";

/// Section text paired with `NO_SECTION_ANSWER`.
pub const NO_SECTION_SOURCE: &str = "N/A";

/// Answer text used when every candidate span was rejected.
pub const UNANSWERABLE: &str = "unanswerable";

/// Best span of one batch row, read off the argmax of its logits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpanPrediction {
    /// Row of the batch (= index into the passage list)
    pub row: usize,

    pub start_index: usize,
    pub end_index:   usize,

    /// Max start logit
    pub start_confidence: f32,

    /// Max end logit
    pub end_confidence: f32,
}

impl SpanPrediction {
    /// Ranking key: start and end confidences summed.
    pub fn combined_confidence(&self) -> f32 {
        self.start_confidence + self.end_confidence
    }

    /// A span whose start lies after its end can never be an answer.
    pub fn is_inverted(&self) -> bool {
        self.start_index > self.end_index
    }

    /// Half-open token range `[start, end)`.
    /// A zero-width prediction (start == end) covers exactly one token.
    pub fn token_range(&self) -> std::ops::Range<usize> {
        if self.start_index == self.end_index {
            self.start_index..self.end_index + 1
        } else {
            self.start_index..self.end_index
        }
    }
}

/// How the answer was reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerKind {
    /// A span decoded cleanly from `row` with the given combined confidence
    Found { row: usize, confidence: f32 },

    /// Every candidate span was inverted or ran into padding
    Unanswerable,

    /// Retrieval selected no section at all
    NoMatchingSection,
}

/// Final result of one query: the answer and the section it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text:    String,
    pub section: String,
    #[serde(flatten)]
    pub kind:    AnswerKind,
}

impl Answer {
    pub fn found(text: impl Into<String>, section: impl Into<String>, row: usize, confidence: f32) -> Self {
        Self {
            text:    text.into(),
            section: section.into(),
            kind:    AnswerKind::Found { row, confidence },
        }
    }

    /// The "unanswerable" fallback, paired with the top-ranked section.
    pub fn unanswerable(section: impl Into<String>) -> Self {
        Self {
            text:    UNANSWERABLE.to_string(),
            section: section.into(),
            kind:    AnswerKind::Unanswerable,
        }
    }

    /// The fixed pair returned when no section matched the query.
    pub fn no_matching_section() -> Self {
        Self {
            text:    NO_SECTION_ANSWER.to_string(),
            section: NO_SECTION_SOURCE.to_string(),
            kind:    AnswerKind::NoMatchingSection,
        }
    }

    /// The (answer, section) pair presentation layers display.
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.text, &self.section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> SpanPrediction {
        SpanPrediction {
            row: 0,
            start_index: start,
            end_index: end,
            start_confidence: 0.5,
            end_confidence: 0.25,
        }
    }

    #[test]
    fn test_zero_width_span_covers_one_token() {
        assert_eq!(span(4, 4).token_range(), 4..5);
        assert_eq!(span(4, 7).token_range(), 4..7);
    }

    #[test]
    fn test_inverted_span() {
        assert!(span(5, 2).is_inverted());
        assert!(!span(2, 2).is_inverted());
    }

    #[test]
    fn test_combined_confidence() {
        assert!((span(0, 1).combined_confidence() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_no_matching_section_pair() {
        let a = Answer::no_matching_section();
        assert_eq!(a.as_pair(), (NO_SECTION_ANSWER, NO_SECTION_SOURCE));
    }

    #[test]
    fn test_answer_json_shape() {
        let a = Answer::found("amino acids", "Proteins are ...", 1, 1.5);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["kind"], "found");
        assert_eq!(json["row"], 1);
        assert_eq!(json["text"], "amino acids");
    }
}
