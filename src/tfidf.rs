//! TF-IDF term scoring.
//!
//! The reference [`TermScorer`]: no model, no network, just counting. Terms
//! that appear often in a document but rarely across the corpus score high;
//! function words are removed up front so they cannot dominate.
//!
//! ## The Math
//!
//! For corpus size `n` and a term appearing in `df` documents:
//!
//! ```text
//! idf(term)      = ln((1 + n) / (1 + df)) + 1        (smoothed)
//! weight(d,term) = count(d, term) * idf(term)
//! row(d)         = weights of d, L2-normalized
//! score(term)    = sum of row(d)[term] over all documents
//! ```
//!
//! Smoothing keeps the idf finite and positive for terms present in every
//! document; per-document normalization stops long documents from owning
//! the ranking. Ties break lexicographically so equal-scored terms come
//! out in a stable order.

use std::collections::{HashMap, HashSet};

use crate::error::CapabilityError;
use crate::tokenizer::{StopWords, Tokenizer};
use crate::{RankedTerm, TermScorer};

/// TF-IDF implementation of [`TermScorer`].
///
/// Terms are lowercased linguistic words of at least
/// [`MIN_TERM_LEN`](Self::MIN_TERM_LEN) characters, minus stop words. Both
/// NLP resources are owned, passed in at construction:
///
/// ```rust
/// use quarry::{StopWords, TermScorer, TfIdfScorer, Tokenizer};
///
/// let scorer = TfIdfScorer::new(Tokenizer::new(), StopWords::english());
/// let ranked = scorer.rank(&[
///     "the gravity assist maneuver",
///     "gravity wells and escape velocity",
///     "the catering budget",
/// ])?;
///
/// // "gravity" appears in two documents; "the" is a stop word and gone.
/// assert_eq!(ranked[0].term, "gravity");
/// assert!(ranked.iter().all(|t| t.term != "the"));
/// # Ok::<(), quarry::CapabilityError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TfIdfScorer {
    tokenizer: Tokenizer,
    stop_words: StopWords,
}

impl TfIdfScorer {
    /// Minimum term length in characters. Single-letter tokens are noise
    /// in every corpus this crate sees.
    pub const MIN_TERM_LEN: usize = 2;

    /// Create a scorer from owned NLP resources.
    #[must_use]
    pub fn new(tokenizer: Tokenizer, stop_words: StopWords) -> Self {
        Self {
            tokenizer,
            stop_words,
        }
    }

    /// The terms of one document: lowercased words, length-filtered, stop
    /// words removed.
    fn terms(&self, text: &str) -> Vec<String> {
        self.tokenizer
            .words(text)
            .filter(|w| w.chars().count() >= Self::MIN_TERM_LEN)
            .filter(|w| !self.stop_words.contains(w))
            .map(str::to_lowercase)
            .collect()
    }
}

impl TermScorer for TfIdfScorer {
    fn rank(&self, corpus: &[&str]) -> std::result::Result<Vec<RankedTerm>, CapabilityError> {
        let docs: Vec<Vec<String>> = corpus.iter().map(|text| self.terms(text)).collect();

        let mut df: HashMap<&str, usize> = HashMap::new();
        for doc in &docs {
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_default() += 1;
            }
        }
        if df.is_empty() {
            return Ok(Vec::new());
        }

        let n = docs.len() as f32;
        let idf: HashMap<&str, f32> = df
            .into_iter()
            .map(|(term, count)| (term, ((1.0 + n) / (1.0 + count as f32)).ln() + 1.0))
            .collect();

        let mut aggregate: HashMap<&str, f32> = HashMap::new();
        for doc in &docs {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for term in doc {
                *counts.entry(term).or_default() += 1;
            }
            let row: Vec<(&str, f32)> = counts
                .into_iter()
                .map(|(term, count)| (term, count as f32 * idf[term]))
                .collect();
            let norm = row.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt();
            if norm > 0.0 {
                for (term, weight) in row {
                    *aggregate.entry(term).or_default() += weight / norm;
                }
            }
        }

        let mut ranked: Vec<RankedTerm> = aggregate
            .into_iter()
            .map(|(term, score)| RankedTerm {
                term: term.to_owned(),
                score,
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> TfIdfScorer {
        TfIdfScorer::new(Tokenizer::new(), StopWords::english())
    }

    fn rank(corpus: &[&str]) -> Vec<RankedTerm> {
        scorer().rank(corpus).unwrap()
    }

    #[test]
    fn test_stop_words_never_rank() {
        let ranked = rank(&["the cat and the hat", "the bat and the mat"]);
        for term in &ranked {
            assert!(
                !["the", "and"].contains(&term.term.as_str()),
                "stop word ranked: {}",
                term.term
            );
        }
    }

    #[test]
    fn test_single_letter_terms_dropped() {
        let ranked = rank(&["a b c particle physics", "x y z particle decay"]);
        assert!(ranked.iter().all(|t| t.term.chars().count() >= 2));
        assert!(ranked.iter().any(|t| t.term == "particle"));
    }

    #[test]
    fn test_terms_are_lowercased() {
        let ranked = rank(&["Gravity Wells", "GRAVITY assists"]);
        assert!(ranked.iter().any(|t| t.term == "gravity"));
        assert!(ranked.iter().all(|t| t.term == t.term.to_lowercase()));
    }

    #[test]
    fn test_frequent_distinctive_term_ranks_first() {
        let ranked = rank(&[
            "reactor cooling systems overview",
            "reactor safety protocols",
            "reactor maintenance schedule",
            "cafeteria opening hours",
        ]);
        assert_eq!(ranked[0].term, "reactor");
    }

    #[test]
    fn test_scores_descend_with_lexicographic_ties() {
        let ranked = rank(&["zebra apple", "zebra apple"]);
        // Same counts, same df: equal scores, alphabetical order.
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].term, "apple");
        assert_eq!(ranked[1].term, "zebra");
        assert!((ranked[0].score - ranked[1].score).abs() < 1e-6);
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_repetition_within_document_is_normalized_away() {
        // "spam" fills one short document; "signal" spreads over three.
        let ranked = rank(&[
            "spam spam spam spam",
            "signal processing basics",
            "signal filtering methods",
            "signal amplification notes",
        ]);
        let score_of = |needle: &str| {
            ranked
                .iter()
                .find(|t| t.term == needle)
                .map(|t| t.score)
                .unwrap()
        };
        assert!(score_of("signal") > score_of("spam"));
    }

    #[test]
    fn test_empty_corpus_ranks_nothing() {
        assert!(rank(&[]).is_empty());
        assert!(rank(&["", "   "]).is_empty());
        assert!(rank(&["the a an of"]).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let corpus = [
            "orbital mechanics and launch windows",
            "launch vehicle integration",
            "mechanics of materials",
        ];
        assert_eq!(rank(&corpus), rank(&corpus));
    }

    #[test]
    fn test_custom_stop_words_apply() {
        let scorer = TfIdfScorer::new(
            Tokenizer::new(),
            StopWords::english().with_words(["reactor"]),
        );
        let ranked = scorer
            .rank(&["reactor cooling", "reactor safety"])
            .unwrap();
        assert!(ranked.iter().all(|t| t.term != "reactor"));
        assert!(ranked.iter().any(|t| t.term == "cooling"));
    }
}
