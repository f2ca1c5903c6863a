//! # quarry
//!
//! Chunking, boilerplate removal, and key-chunk retrieval for parsed
//! documents.
//!
//! ## The Problem
//!
//! Document extractors hand you pages: a PDF becomes a list of text
//! blocks per page, a slide deck a list of blocks per slide. Pages are
//! the wrong unit for retrieval:
//!
//! - One page mixes three topics, a heading, and a footer
//! - Headers and footers repeat on every page and poison term statistics
//! - OCR text pulled from figures belongs in the corpus; the figures don't
//! - Most chunks are filler—retrieval wants the few that carry the document
//!
//! So the crate works in stages, each useful on its own:
//!
//! ```text
//! extractor JSON
//!       |
//!       v
//!  [ ingest ]       one chunk per text block, images set aside
//!       |
//!       v
//!  [ boilerplate ]  drop lines that repeat across too many chunks
//!       |
//!       v
//!  [ resegment ]    re-cut the chunks under a Strategy
//!       |
//!       v
//!  [ retrieve ]     optional: keep only the key chunks, ranked by topic
//! ```
//!
//! Every chunk carries its source id and a page-range [`Locator`], so a
//! retrieved answer can always be traced back to "page 12 of report.pdf"
//! no matter how many times the text was re-cut along the way.
//!
//! ## Re-segmentation Strategies
//!
//! Extractor blocks rarely match what an embedding model wants. The
//! [`Strategy`] enum re-cuts them:
//!
//! | Strategy | Output | Good for |
//! |------------------|-----------------------------|------------------------|
//! | `identity` | extractor blocks untouched | already-clean sources |
//! | `sentence` | one sentence per chunk | precise retrieval |
//! | `fixed-window` | N-token windows | uniform embedding cost |
//! | `sliding-window` | overlapping N-token windows | boundary-safe recall |
//! | `merge-small` | fragments glued up to size | busy slide decks |
//! | `recursive` | structure-aware pieces | long prose |
//!
//! Splitting strategies then apply a validity filter: chunks with fewer
//! than `min_chunk_tokens` words are noise (page numbers, stray labels)
//! and are dropped. `identity` is the escape hatch that filters nothing.
//!
//! ## Key-Chunk Retrieval
//!
//! A 200-page report re-segmented into 3000 chunks is still 3000 chunks.
//! The [`Retriever`] mines the corpus for its most important terms (via a
//! [`TermScorer`], TF-IDF by default), then lets each topic greedily claim
//! the chunks most similar to it (via an [`Embedder`]), best topics first,
//! no chunk claimed twice. What survives is a duplicate-free shortlist
//! with the topics that justified it.
//!
//! Both capabilities are traits. The crate ships the TF-IDF scorer and
//! deterministic test doubles in [`testing`]; real embedding models stay
//! in the application.
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::{BoilerplateFilter, Chunker, ContentItem, Document, Page, Strategy, Tokenizer};
//!
//! let document = Document::new(
//!     "pdf",
//!     vec![
//!         Page::new(1, vec![
//!             ContentItem::text("Rockets are mostly propellant. The payload is an afterthought."),
//!             ContentItem::text("Confidential - Draft"),
//!         ]),
//!         Page::new(2, vec![
//!             ContentItem::text("Staging sheds dead mass early. Every saved gram compounds."),
//!             ContentItem::text("Confidential - Draft"),
//!         ]),
//!     ],
//! );
//!
//! let chunker = Chunker::new(Tokenizer::new(), 3);
//! let ingestion = chunker.ingest("launch.pdf", &document);
//! assert_eq!(ingestion.stats.pages, 2);
//!
//! // The footer repeats on every page; the content does not.
//! let chunks = BoilerplateFilter::new(1).strip(ingestion.chunks);
//! let chunks = chunker.resegment(chunks, &Strategy::Sentence)?;
//!
//! assert_eq!(chunks.len(), 4);
//! assert!(chunks.iter().all(|c| !c.text.contains("Confidential")));
//! # Ok::<(), quarry::Error>(())
//! ```
//!
//! For batches, [`Pipeline`] drives all four stages across a worker pool
//! and isolates failures per document: one malformed file is reported in
//! the [`PipelineReport`], its siblings are unaffected.
//!
//! ## Determinism
//!
//! Given deterministic capabilities, every stage is deterministic: same
//! input, same chunks, same selection, bit for bit. Ties in retrieval
//! break toward the earlier chunk. The one exception is aggregation order
//! across documents in a [`Pipeline`] run, which is completion order;
//! per-document output is stable.

mod boilerplate;
mod chunk;
mod chunker;
mod document;
mod error;
mod locator;
mod merge;
mod pipeline;
mod recursive;
mod retrieve;
mod sentence;
pub mod testing;
mod tfidf;
mod tokenizer;
mod window;

pub use boilerplate::BoilerplateFilter;
pub use chunk::{Chunk, ImageSource, SourceKind};
pub use chunker::{Chunker, IngestStats, Ingestion, Strategy};
pub use document::{ContentItem, Document, Page};
pub use error::{CapabilityError, Error, Result};
pub use locator::Locator;
pub use pipeline::{DocumentFailure, DocumentOutput, Pipeline, PipelineReport};
pub use retrieve::{KeyTopic, Retrieval, Retriever};
pub use tfidf::TfIdfScorer;
pub use tokenizer::{StopWords, Tokenizer};

/// The embedding capability.
///
/// Implementations wrap whatever model the application uses; the crate
/// never loads one itself. A batch must return exactly one vector per
/// input text, all of the same dimension—[`Retriever`] checks both and
/// rejects the batch otherwise.
///
/// Similarity downstream is the raw dot product, so return L2-normalized
/// vectors when cosine semantics are intended (most sentence-embedding
/// models already do).
///
/// ```rust
/// use quarry::Embedder;
/// use quarry::testing::HashEmbedder;
///
/// let embedder = HashEmbedder::new(8);
/// let batch = embedder.embed_batch(&["alpha", "beta"])?;
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batch[0].len(), 8);
///
/// // Single-text embedding goes through the same batch contract.
/// assert_eq!(embedder.embed("alpha")?, batch[0]);
/// # Ok::<(), quarry::CapabilityError>(())
/// ```
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per text.
    ///
    /// # Errors
    ///
    /// Whatever the underlying model reports. Callers inside the crate
    /// wrap it as [`Error::Embedding`].
    fn embed_batch(&self, texts: &[&str]) -> std::result::Result<Vec<Vec<f32>>, CapabilityError>;

    /// Embed one text. The default routes through
    /// [`embed_batch`](Self::embed_batch); override when the model has a
    /// cheaper single-text path.
    ///
    /// # Errors
    ///
    /// As [`embed_batch`](Self::embed_batch), plus an error if the batch
    /// comes back empty.
    fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, CapabilityError> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or_else(|| "embedder returned an empty batch".into())
    }
}

/// The term-importance capability.
///
/// Given one text per chunk, produce the corpus's terms ranked by
/// importance, best first. [`TfIdfScorer`] is the built-in
/// implementation; a keyword model or a hand-curated list fits behind the
/// same trait.
///
/// Rankings should be deterministic for a fixed corpus—break score ties
/// explicitly (the built-in scorer breaks them lexicographically), or
/// downstream selection inherits the instability.
pub trait TermScorer: Send + Sync {
    /// Rank the corpus's terms by importance, descending.
    ///
    /// # Errors
    ///
    /// Whatever the underlying scorer reports. Callers inside the crate
    /// wrap it as [`Error::TermScoring`].
    fn rank(&self, corpus: &[&str]) -> std::result::Result<Vec<RankedTerm>, CapabilityError>;
}

/// A term and its corpus-wide importance score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedTerm {
    /// The term, lowercased by convention.
    pub term: String,
    /// Importance relative to other terms from the same ranking; scores
    /// from different rankings are not comparable.
    pub score: f32,
}
