//! Key-chunk retrieval.
//!
//! Most chunks of a document are filler. The [`Retriever`] finds the ones
//! worth keeping: it mines the corpus for its highest-importance terms (the
//! "key topics"), then greedily claims the chunks most similar to each
//! topic, best topics first.
//!
//! ## The Greedy Claim
//!
//! ```text
//! topics (ranked):   "protein"   "folding"   "dataset"
//!                        |           |           |
//!                        v           v           v
//! chunks:       [c0] [c1] [c2] [c3] [c4] [c5] [c6] [c7]
//!
//! round 1: "protein" takes its top K unvisited chunks, say c2, c5
//! round 2: "folding" picks from what is left, say c0, c6
//! round 3: "dataset" picks from the rest, ...
//! ```
//!
//! A chunk is claimed at most once: higher-importance topics get first
//! pick, and two near-synonymous topics cannot select the same chunk
//! twice. The output is therefore duplicate-free by construction, ordered
//! by topic rank and, within a topic, by descending similarity.
//!
//! ## Capabilities
//!
//! The retriever owns no model. Embedding and term scoring arrive as
//! [`Embedder`] and [`TermScorer`] implementations; the crate ships a
//! TF-IDF reference scorer ([`TfIdfScorer`](crate::TfIdfScorer)) and
//! deterministic test doubles ([`testing`](crate::testing)). Similarity is
//! the raw dot product — embedders return L2-normalized vectors when
//! cosine semantics are wanted.

use std::sync::Arc;

use tracing::debug;

use crate::chunk::Chunk;
use crate::error::{Error, Result};
use crate::{Embedder, RankedTerm, TermScorer};

/// One key topic and the chunks it claimed.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTopic {
    /// The topic term.
    pub term: String,
    /// Aggregate importance score from the term scorer.
    pub score: f32,
    /// Indices into [`Retrieval::chunks`] claimed by this topic, in
    /// descending-similarity order. Empty when every chunk was already
    /// visited by a higher-ranked topic.
    pub selected: Vec<usize>,
}

impl KeyTopic {
    /// This topic as a plain ranked term, without the selection.
    #[must_use]
    pub fn as_ranked(&self) -> RankedTerm {
        RankedTerm {
            term: self.term.clone(),
            score: self.score,
        }
    }
}

/// The outcome of one retrieval pass over one chunk list.
///
/// Owns the input chunks as an index arena. The selection, the per-topic
/// records, and the visitation array all refer to positions in that arena,
/// so nothing here aliases and the input order stays inspectable next to
/// the selection order.
#[derive(Debug, Clone, Default)]
pub struct Retrieval {
    chunks: Vec<Chunk>,
    selection: Vec<usize>,
    topics: Vec<KeyTopic>,
    visited: Vec<bool>,
}

impl Retrieval {
    /// All input chunks, in their original order.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The selected key chunks, in selection order (topic rank, then
    /// similarity rank within the topic).
    pub fn key_chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.selection.iter().map(|&i| &self.chunks[i])
    }

    /// Consume the retrieval, keeping only the key chunks in selection
    /// order.
    #[must_use]
    pub fn into_key_chunks(mut self) -> Vec<Chunk> {
        let mut slots: Vec<Option<Chunk>> = self.chunks.drain(..).map(Some).collect();
        // Selected indices are distinct, so each take succeeds once.
        self.selection
            .iter()
            .filter_map(|&i| slots[i].take())
            .collect()
    }

    /// Chunks no topic claimed. The original operator workflow printed
    /// these for review; exposing them keeps "what got dropped and why"
    /// answerable without re-running anything.
    pub fn leftovers(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.visited
            .iter()
            .zip(&self.chunks)
            .filter(|&(visited, _)| !visited)
            .map(|(_, chunk)| chunk)
    }

    /// The ranked key topics with their per-topic selections.
    #[must_use]
    pub fn topics(&self) -> &[KeyTopic] {
        &self.topics
    }

    /// Selected arena indices in selection order.
    #[must_use]
    pub fn selected_indices(&self) -> &[usize] {
        &self.selection
    }

    /// Per-chunk visitation flags, parallel to [`chunks`](Self::chunks).
    #[must_use]
    pub fn visited(&self) -> &[bool] {
        &self.visited
    }

    /// Number of selected key chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.selection.len()
    }

    /// Whether nothing was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }
}

/// Selects the most topic-relevant chunks from a chunk list.
///
/// ```rust
/// use std::sync::Arc;
/// use quarry::testing::{HashEmbedder, StaticScorer};
/// use quarry::{Chunk, Locator, Retriever, SourceKind};
///
/// let chunks: Vec<Chunk> = ["orbit mechanics", "launch windows", "lunch menus"]
///     .iter()
///     .enumerate()
///     .map(|(i, text)| {
///         Chunk::new("notes.pdf", SourceKind::Document, Locator::page(i as u32 + 1), *text)
///     })
///     .collect();
///
/// let retriever = Retriever::new(
///     Arc::new(HashEmbedder::new(64)),
///     Arc::new(StaticScorer::new(["orbit", "launch"])),
/// )
/// .with_chunks_per_topic(1);
///
/// let retrieval = retriever.extract_key_chunks(chunks)?;
/// assert_eq!(retrieval.len(), 2);
/// assert_eq!(retrieval.topics().len(), 2);
/// assert_eq!(retrieval.leftovers().count(), 1);
/// # Ok::<(), quarry::Error>(())
/// ```
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    scorer: Arc<dyn TermScorer>,
    num_topics: usize,
    chunks_per_topic: usize,
}

impl Retriever {
    /// Default number of key topics mined from the corpus.
    pub const DEFAULT_NUM_TOPICS: usize = 10;
    /// Default number of chunks claimed per topic.
    pub const DEFAULT_CHUNKS_PER_TOPIC: usize = 5;

    /// Create a retriever from its two capabilities, with default topic
    /// and per-topic counts.
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>, scorer: Arc<dyn TermScorer>) -> Self {
        Self {
            embedder,
            scorer,
            num_topics: Self::DEFAULT_NUM_TOPICS,
            chunks_per_topic: Self::DEFAULT_CHUNKS_PER_TOPIC,
        }
    }

    /// Set the number of key topics to mine.
    #[must_use]
    pub fn with_num_topics(mut self, num_topics: usize) -> Self {
        self.num_topics = num_topics;
        self
    }

    /// Set the number of chunks each topic may claim.
    #[must_use]
    pub fn with_chunks_per_topic(mut self, chunks_per_topic: usize) -> Self {
        self.chunks_per_topic = chunks_per_topic;
        self
    }

    /// Extract the key chunks of `chunks`.
    ///
    /// Embeds every chunk (one batch call), ranks the corpus terms, then
    /// lets each of the top topics claim its most similar unvisited
    /// chunks. An empty input returns an empty [`Retrieval`] without
    /// invoking either capability.
    ///
    /// # Errors
    ///
    /// [`Error::Embedding`] / [`Error::TermScoring`] when a capability
    /// fails; [`Error::EmbeddingCount`] / [`Error::EmbeddingDimensions`]
    /// when the embedder breaks its batch contract. No fallback is
    /// attempted; the caller decides whether to retry or skip.
    pub fn extract_key_chunks(&self, chunks: Vec<Chunk>) -> Result<Retrieval> {
        if chunks.is_empty() {
            return Ok(Retrieval::default());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).map_err(Error::Embedding)?;
        if embeddings.len() != texts.len() {
            return Err(Error::EmbeddingCount {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }
        let dim = embeddings.first().map_or(0, Vec::len);
        for vector in &embeddings {
            if vector.len() != dim {
                return Err(Error::EmbeddingDimensions {
                    expected: dim,
                    actual: vector.len(),
                });
            }
        }

        let ranked = self.scorer.rank(&texts).map_err(Error::TermScoring)?;

        let mut visited = vec![false; chunks.len()];
        let mut selection = Vec::new();
        let mut topics = Vec::with_capacity(self.num_topics.min(ranked.len()));

        for term in ranked.into_iter().take(self.num_topics) {
            let query = self.embedder.embed(&term.term).map_err(Error::Embedding)?;
            if query.len() != dim {
                return Err(Error::EmbeddingDimensions {
                    expected: dim,
                    actual: query.len(),
                });
            }

            let selected = top_unvisited(&embeddings, &query, &visited, self.chunks_per_topic);
            for &index in &selected {
                visited[index] = true;
                selection.push(index);
            }
            debug!(
                topic = %term.term,
                score = term.score,
                claimed = selected.len(),
                "topic claimed chunks"
            );
            topics.push(KeyTopic {
                term: term.term,
                score: term.score,
                selected,
            });
        }

        debug!(
            chunks = chunks.len(),
            selected = selection.len(),
            topics = topics.len(),
            "retrieval complete"
        );
        Ok(Retrieval {
            chunks,
            selection,
            topics,
            visited,
        })
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("num_topics", &self.num_topics)
            .field("chunks_per_topic", &self.chunks_per_topic)
            .finish_non_exhaustive()
    }
}

/// Indices of the `k` unvisited chunks most similar to `query`, descending
/// by dot product, ties toward the lower index.
fn top_unvisited(embeddings: &[Vec<f32>], query: &[f32], visited: &[bool], k: usize) -> Vec<usize> {
    let mut scored: Vec<(usize, f32)> = embeddings
        .iter()
        .enumerate()
        .filter(|&(i, _)| !visited[i])
        .map(|(i, vector)| (i, dot(vector, query)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(k);
    scored.into_iter().map(|(i, _)| i).collect()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
