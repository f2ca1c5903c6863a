//! The Chunk type: a unit of extracted text with provenance.

use crate::error::{Error, Result};
use crate::locator::Locator;

/// What kind of source a chunk or image was extracted from.
///
/// Affects display only (`"page"` vs `"slide"`); chunking logic never
/// branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Paged documents (PDF and friends).
    Document,
    /// Slide decks.
    Slide,
}

impl SourceKind {
    /// The unit label used when printing locations.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Document => "page",
            Self::Slide => "slide",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.unit())
    }
}

/// A chunk of text with the document and page range it came from.
///
/// Chunks are the currency of the whole pipeline: ingestion produces them,
/// re-segmentation strategies consume and re-create them, the boilerplate
/// filter rewrites their text, and the retriever selects among them. They
/// are plain values; every transformation builds new chunks rather than
/// mutating old ones.
///
/// `text` is whitespace-normalized (trimmed, single-spaced) from ingestion
/// onward. `source` ties the chunk to one originating document; operations
/// that combine chunks refuse to cross sources.
///
/// ```rust
/// use quarry::{Chunk, Locator, SourceKind};
///
/// let a = Chunk::new("deck.pptx", SourceKind::Slide, Locator::page(2), "Roadmap");
/// let b = Chunk::new("deck.pptx", SourceKind::Slide, Locator::page(3), "Q3 targets");
///
/// let merged = a.merge(&b)?;
/// assert_eq!(merged.text, "Roadmap Q3 targets");
/// assert_eq!(merged.locator.to_string(), "2-3");
/// # Ok::<(), quarry::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Identifier of the originating document (path or logical name).
    pub source: String,
    /// Provenance kind, for display.
    pub kind: SourceKind,
    /// Page/slide range this text was extracted from.
    pub locator: Locator,
    /// The chunk text.
    pub text: String,
}

impl Chunk {
    /// Create a new chunk.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        kind: SourceKind,
        locator: Locator,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            kind,
            locator,
            text: text.into(),
        }
    }

    /// The length of this chunk's text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether this chunk's text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Combine two chunks of the same source: locators envelope-merged,
    /// texts joined with a single space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceMismatch`] if the chunks come from different
    /// sources. Mixing sources in one chunk is a contract violation, not a
    /// recoverable condition.
    pub fn merge(&self, other: &Self) -> Result<Self> {
        if self.source != other.source {
            return Err(Error::SourceMismatch {
                left: self.source.clone(),
                right: other.source.clone(),
            });
        }
        let mut text = String::with_capacity(self.text.len() + other.text.len() + 1);
        text.push_str(&self.text);
        if !self.text.is_empty() && !other.text.is_empty() {
            text.push(' ');
        }
        text.push_str(&other.text);
        Ok(Self {
            source: self.source.clone(),
            kind: self.kind,
            locator: self.locator.merge(other.locator),
            text,
        })
    }

    /// Derive a chunk with new text but this chunk's provenance.
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            source: self.source.clone(),
            kind: self.kind,
            locator: self.locator,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk {{ source: {}, {}: {}, len: {} }}",
            self.source,
            self.kind,
            self.locator,
            self.len()
        )
    }
}

/// A reference to an image artifact extracted alongside the text.
///
/// Images are never chunked or ranked; the pipeline carries them through
/// untouched so downstream asset handling can pick them up. An image whose
/// OCR text was inlined by the extractor also yields a text [`Chunk`]; the
/// `ImageSource` entry exists either way as long as a file path is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    /// Identifier of the originating document.
    pub source: String,
    /// Provenance kind, for display.
    pub kind: SourceKind,
    /// The single page/slide the image sits on.
    pub page: u32,
    /// Path of the extracted image file.
    pub file_path: String,
}

impl ImageSource {
    /// Create a new image reference.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        kind: SourceKind,
        page: u32,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            kind,
            page,
            file_path: file_path.into(),
        }
    }
}
