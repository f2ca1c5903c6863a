//! Deterministic capability doubles for tests.
//!
//! Retrieval behavior is hard to assert against a real embedding model:
//! scores drift between model versions and machines. These doubles are
//! exact. [`HashEmbedder`] derives vectors from a SHA-256 of the input, so
//! identical text always embeds identically; [`StaticScorer`] returns a
//! fixed ranked-term list. Both count their invocations so tests can
//! assert that capabilities were (or were not) called.
//!
//! The module is public so downstream crates can use the same doubles in
//! their own tests; this crate's integration tests run on them too.

use std::sync::atomic::{AtomicUsize, Ordering};

use sha2::{Digest, Sha256};

use crate::error::CapabilityError;
use crate::{Embedder, RankedTerm, TermScorer};

/// Deterministic [`Embedder`] seeded by a SHA-256 of the input text.
///
/// Vector components land in `[-1, 1]`; by default the vector is then
/// L2-normalized so dot products behave like cosine similarity, matching
/// how production embedders are expected to be configured. Identical text
/// gives identical vectors within and across runs.
///
/// ```rust
/// use quarry::testing::HashEmbedder;
/// use quarry::Embedder;
///
/// let embedder = HashEmbedder::new(64);
/// let a = embedder.embed("alpha")?;
/// let b = embedder.embed("alpha")?;
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// assert_eq!(embedder.calls(), 2);
/// # Ok::<(), quarry::CapabilityError>(())
/// ```
pub struct HashEmbedder {
    dimensions: usize,
    normalize: bool,
    calls: AtomicUsize,
}

impl HashEmbedder {
    /// Create an embedder producing normalized vectors of `dimensions`
    /// components.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            normalize: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Skip L2 normalization, leaving raw components in `[-1, 1]`. Useful
    /// for exercising the documented raw-dot-product semantics.
    #[must_use]
    pub fn unnormalized(mut self) -> Self {
        self.normalize = false;
        self
    }

    /// The output dimensionality.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of `embed_batch` invocations so far (the single-text
    /// [`Embedder::embed`] routes through the batch call).
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        let mut vector: Vec<f32> = (0..self.dimensions)
            .map(|i| {
                let byte = f32::from(digest[i % digest.len()]);
                byte / 127.5 - 1.0
            })
            .collect();
        if self.normalize {
            let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for x in &mut vector {
                    *x /= norm;
                }
            }
        }
        vector
    }
}

impl Embedder for HashEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> std::result::Result<Vec<Vec<f32>>, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

impl std::fmt::Debug for HashEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashEmbedder")
            .field("dimensions", &self.dimensions)
            .field("normalize", &self.normalize)
            .finish_non_exhaustive()
    }
}

/// [`TermScorer`] that returns a fixed ranked list, whatever the corpus.
///
/// Terms given by name get evenly descending scores; use
/// [`with_scores`](Self::with_scores) when a test needs exact values.
///
/// ```rust
/// use quarry::testing::StaticScorer;
/// use quarry::TermScorer;
///
/// let scorer = StaticScorer::new(["fusion", "plasma"]);
/// let ranked = scorer.rank(&["any", "corpus"])?;
/// assert_eq!(ranked[0].term, "fusion");
/// assert!(ranked[0].score > ranked[1].score);
/// # Ok::<(), quarry::CapabilityError>(())
/// ```
pub struct StaticScorer {
    terms: Vec<RankedTerm>,
    calls: AtomicUsize,
}

impl StaticScorer {
    /// Fixed ranking from term names; scores descend from the list length
    /// down to one.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = terms.into_iter().map(Into::into).collect();
        let count = names.len();
        Self::with_scores(
            names
                .into_iter()
                .enumerate()
                .map(|(i, term)| (term, (count - i) as f32)),
        )
    }

    /// Fixed ranking from explicit `(term, score)` pairs, kept in the
    /// given order.
    pub fn with_scores<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        Self {
            terms: pairs
                .into_iter()
                .map(|(term, score)| RankedTerm {
                    term: term.into(),
                    score,
                })
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `rank` invocations so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TermScorer for StaticScorer {
    fn rank(&self, _corpus: &[&str]) -> std::result::Result<Vec<RankedTerm>, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.terms.clone())
    }
}

impl std::fmt::Debug for StaticScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticScorer")
            .field("terms", &self.terms.len())
            .finish_non_exhaustive()
    }
}
