//! Document ingestion and re-segmentation.
//!
//! The [`Chunker`] turns a normalized [`Document`] into an initial chunk
//! list (one chunk per text block, one per OCR'd image), then re-segments
//! that list under a [`Strategy`]. Between the two steps callers usually
//! run the [`BoilerplateFilter`](crate::BoilerplateFilter).
//!
//! ## Choosing a Strategy
//!
//! | Strategy | Shape of output | Good for |
//! |------------------|----------------------------|------------------------|
//! | `identity` | extractor blocks untouched | already-clean sources |
//! | `sentence` | one sentence per chunk | precise retrieval |
//! | `fixed-window` | N-token windows | uniform embedding cost |
//! | `sliding-window` | overlapping N-token windows| boundary-safe recall |
//! | `merge-small` | fragments glued to size | busy slide decks |
//! | `recursive` | structure-aware pieces | long prose |
//!
//! ## The Validity Filter
//!
//! Every splitting strategy discards output chunks with fewer than
//! `min_chunk_tokens` words. `identity` passes everything through, and
//! `merge-small` enforces the threshold itself (its trailing accumulator is
//! deliberately exempt). The threshold is the most consequential knob in
//! the crate: too low keeps noise, too high silently drops short but
//! meaningful passages such as slide titles. There is no default; callers
//! choose per content type.

use std::str::FromStr;

use tracing::debug;

use crate::chunk::{Chunk, ImageSource};
use crate::document::{ContentItem, Document};
use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::tokenizer::Tokenizer;
use crate::{merge, recursive, sentence, window};

/// Comma-separated names for the unknown-strategy error message.
const KNOWN_STRATEGIES: &str =
    "identity, sentence, fixed-window, sliding-window, merge-small, recursive";

/// A re-segmentation strategy with its parameters.
///
/// The set is closed: dispatch is an exhaustive `match`, so adding a
/// strategy means extending this enum and the one switch in
/// [`Chunker::resegment`]. Parse a name with default parameters via
/// [`FromStr`], or build a variant directly for custom ones:
///
/// ```rust
/// use quarry::Strategy;
///
/// let default: Strategy = "sliding-window".parse()?;
/// assert_eq!(default, Strategy::SlidingWindow { window_size: 100, overlap: 50 });
///
/// let custom = Strategy::SlidingWindow { window_size: 40, overlap: 10 };
/// assert_eq!(custom.name(), "sliding-window");
/// # Ok::<(), quarry::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Keep the extractor's blocks as they are.
    Identity,
    /// One chunk per sentence.
    Sentence,
    /// Consecutive windows of `window_size` tokens.
    FixedWindow {
        /// Tokens per window.
        window_size: usize,
    },
    /// Windows of `window_size` tokens advancing by `window_size - overlap`.
    SlidingWindow {
        /// Tokens per window.
        window_size: usize,
        /// Tokens shared between adjacent windows; must be less than
        /// `window_size`.
        overlap: usize,
    },
    /// Merge undersized neighbors until they reach `min_chunk_tokens`.
    MergeSmall,
    /// Separator-aware splitting with overlap, for long prose.
    Recursive {
        /// Maximum output chunk size in bytes.
        chunk_size: usize,
        /// Bytes of trailing context repeated between neighbors; must be
        /// less than `chunk_size`.
        chunk_overlap: usize,
        /// Separator hierarchy, coarsest first; an empty string enables the
        /// character-level hard split.
        separators: Vec<String>,
    },
}

impl Strategy {
    /// Default window for the token-window strategies.
    pub const DEFAULT_WINDOW_SIZE: usize = 100;
    /// Default overlap for `sliding-window`.
    pub const DEFAULT_OVERLAP: usize = 50;
    /// Default chunk size for `recursive`.
    pub const DEFAULT_CHUNK_SIZE: usize = 1000;
    /// Default overlap for `recursive`.
    pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

    /// A `recursive` strategy with the default separator hierarchy.
    #[must_use]
    pub fn recursive(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self::Recursive {
            chunk_size,
            chunk_overlap,
            separators: recursive::default_separators(),
        }
    }

    /// The canonical name, as accepted by [`FromStr`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Sentence => "sentence",
            Self::FixedWindow { .. } => "fixed-window",
            Self::SlidingWindow { .. } => "sliding-window",
            Self::MergeSmall => "merge-small",
            Self::Recursive { .. } => "recursive",
        }
    }

    /// Check parameter sanity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWindow`] for zero sizes and
    /// [`Error::WindowOverlap`] when an overlap reaches its window, which
    /// would make the step non-positive.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Identity | Self::Sentence | Self::MergeSmall => Ok(()),
            Self::FixedWindow { window_size } => {
                if window_size == 0 {
                    return Err(Error::InvalidWindow(0));
                }
                Ok(())
            }
            Self::SlidingWindow {
                window_size,
                overlap,
            } => {
                if window_size == 0 {
                    return Err(Error::InvalidWindow(0));
                }
                if overlap >= window_size {
                    return Err(Error::WindowOverlap {
                        window: window_size,
                        overlap,
                    });
                }
                Ok(())
            }
            Self::Recursive {
                chunk_size,
                chunk_overlap,
                ..
            } => {
                if chunk_size == 0 {
                    return Err(Error::InvalidWindow(0));
                }
                if chunk_overlap >= chunk_size {
                    return Err(Error::WindowOverlap {
                        window: chunk_size,
                        overlap: chunk_overlap,
                    });
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "identity" => Ok(Self::Identity),
            "sentence" => Ok(Self::Sentence),
            "fixed-window" => Ok(Self::FixedWindow {
                window_size: Self::DEFAULT_WINDOW_SIZE,
            }),
            "sliding-window" => Ok(Self::SlidingWindow {
                window_size: Self::DEFAULT_WINDOW_SIZE,
                overlap: Self::DEFAULT_OVERLAP,
            }),
            "merge-small" => Ok(Self::MergeSmall),
            "recursive" => Ok(Self::recursive(
                Self::DEFAULT_CHUNK_SIZE,
                Self::DEFAULT_CHUNK_OVERLAP,
            )),
            _ => Err(Error::UnknownStrategy {
                name: name.to_owned(),
                known: KNOWN_STRATEGIES,
            }),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Counters tallied while ingesting one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Pages seen, including empty ones.
    pub pages: usize,
    /// Non-empty text blocks turned into chunks.
    pub text_blocks: usize,
    /// Image blocks whose OCR text became a chunk.
    pub ocr_text_blocks: usize,
    /// Image files recorded as [`ImageSource`] entries.
    pub images: usize,
}

/// Everything ingestion produces for one document.
#[derive(Debug, Clone, Default)]
pub struct Ingestion {
    /// Initial chunks, one per text block / OCR'd image, in page order.
    pub chunks: Vec<Chunk>,
    /// Image references, in page order.
    pub images: Vec<ImageSource>,
    /// Extraction counters.
    pub stats: IngestStats,
}

/// Turns documents into chunks and re-segments chunk lists.
///
/// Owns its [`Tokenizer`] and the `min_chunk_tokens` validity threshold;
/// both are fixed at construction so every call site states its tuning
/// explicitly.
///
/// ```rust
/// use quarry::{Chunker, ContentItem, Document, Page, Strategy, Tokenizer};
///
/// let chunker = Chunker::new(Tokenizer::new(), 3);
/// let doc = Document::new(
///     "pdf",
///     vec![Page::new(1, vec![ContentItem::text("First point. Second, longer point here.")])],
/// );
///
/// let ingestion = chunker.ingest("notes.pdf", &doc);
/// let chunks = chunker.resegment(ingestion.chunks, &Strategy::Sentence)?;
/// assert_eq!(chunks.len(), 1); // "First point." has only two words
/// assert_eq!(chunks[0].text, "Second, longer point here.");
/// # Ok::<(), quarry::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Chunker {
    tokenizer: Tokenizer,
    min_chunk_tokens: usize,
}

impl Chunker {
    /// Create a chunker from an owned tokenizer and validity threshold.
    #[must_use]
    pub fn new(tokenizer: Tokenizer, min_chunk_tokens: usize) -> Self {
        Self {
            tokenizer,
            min_chunk_tokens,
        }
    }

    /// The validity threshold in words.
    #[must_use]
    pub fn min_chunk_tokens(&self) -> usize {
        self.min_chunk_tokens
    }

    /// Convert a document into its initial chunk list and image references.
    ///
    /// One chunk per non-empty text block, one per image with OCR text;
    /// every image with a file path lands in `images`. Chunk text is
    /// whitespace-normalized here, so everything downstream sees trimmed,
    /// single-spaced text. Chunks come out in page order, monotonic in
    /// locator start.
    pub fn ingest(&self, source: impl Into<String>, document: &Document) -> Ingestion {
        let source = source.into();
        let kind = document.kind();
        let mut ingestion = Ingestion::default();

        for page in &document.pages {
            ingestion.stats.pages += 1;
            // Pages are 1-based; tolerate extractors that count from zero.
            let locator = Locator::page(page.number.max(1));

            for item in &page.content {
                match item {
                    ContentItem::Text { text } => {
                        let text = normalize(text);
                        if !text.is_empty() {
                            ingestion.stats.text_blocks += 1;
                            ingestion
                                .chunks
                                .push(Chunk::new(&source, kind, locator, text));
                        }
                    }
                    ContentItem::Image {
                        image_path,
                        ocr_text,
                    } => {
                        if let Some(path) = image_path.as_deref().filter(|p| !p.is_empty()) {
                            ingestion.stats.images += 1;
                            ingestion.images.push(ImageSource::new(
                                &source,
                                kind,
                                locator.start,
                                path,
                            ));
                        }
                        if let Some(ocr) = ocr_text.as_deref() {
                            let text = normalize(ocr);
                            if !text.is_empty() {
                                ingestion.stats.ocr_text_blocks += 1;
                                ingestion
                                    .chunks
                                    .push(Chunk::new(&source, kind, locator, text));
                            }
                        }
                    }
                }
            }
        }

        debug!(
            source = %source,
            pages = ingestion.stats.pages,
            chunks = ingestion.chunks.len(),
            images = ingestion.images.len(),
            "ingested document"
        );
        ingestion
    }

    /// Re-segment a chunk list under `strategy`.
    ///
    /// Splitting strategies apply the validity filter to their output;
    /// `identity` does not, and `merge-small` enforces the threshold
    /// through its own accumulation rules.
    ///
    /// # Errors
    ///
    /// Returns the strategy's [`validate`](Strategy::validate) error for bad
    /// parameters. [`Error::SourceMismatch`] cannot escape `merge-small`
    /// (it never merges across sources) but remains in the signature of the
    /// underlying merge.
    pub fn resegment(&self, chunks: Vec<Chunk>, strategy: &Strategy) -> Result<Vec<Chunk>> {
        strategy.validate()?;
        let before = chunks.len();

        let out = match strategy {
            Strategy::Identity => chunks,
            Strategy::Sentence => {
                self.retain_valid(chunks.iter().flat_map(sentence::split).collect())
            }
            Strategy::FixedWindow { window_size } => self.retain_valid(
                chunks
                    .iter()
                    .flat_map(|c| window::fixed(c, &self.tokenizer, *window_size))
                    .collect(),
            ),
            Strategy::SlidingWindow {
                window_size,
                overlap,
            } => self.retain_valid(
                chunks
                    .iter()
                    .flat_map(|c| window::sliding(c, &self.tokenizer, *window_size, *overlap))
                    .collect(),
            ),
            Strategy::MergeSmall => {
                merge::merge_small(chunks, &self.tokenizer, self.min_chunk_tokens)?
            }
            Strategy::Recursive {
                chunk_size,
                chunk_overlap,
                separators,
            } => self.retain_valid(
                chunks
                    .iter()
                    .flat_map(|c| recursive::split(c, *chunk_size, *chunk_overlap, separators))
                    .collect(),
            ),
        };

        debug!(strategy = %strategy, before, after = out.len(), "re-segmented chunks");
        Ok(out)
    }

    /// Whether a chunk meets the validity threshold.
    #[must_use]
    pub fn is_valid(&self, chunk: &Chunk) -> bool {
        self.tokenizer.word_count(&chunk.text) >= self.min_chunk_tokens
    }

    fn retain_valid(&self, mut chunks: Vec<Chunk>) -> Vec<Chunk> {
        chunks.retain(|c| self.is_valid(c));
        chunks
    }
}

/// Trim and collapse all interior whitespace runs to single spaces.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for token in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}
