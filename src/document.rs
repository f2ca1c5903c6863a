//! The normalized document structure produced by extraction collaborators.
//!
//! Extractors (PDF, slide decks, transcripts) reduce their formats to one
//! shape: an ordered list of pages, each holding text blocks and image
//! references with OCR text already inlined where available. This module is
//! the serde contract for that shape; it mirrors the extractor JSON
//! (`"type": "text" | "image"`, `page_number`, `image_path`, `ocr_text`)
//! and tolerates unknown fields.
//!
//! ```rust
//! use quarry::Document;
//!
//! let doc = Document::from_json(
//!     r#"{
//!         "type": "pdf",
//!         "pages": [
//!             {"page_number": 1, "content": [
//!                 {"type": "text", "text": "Hello from page one."},
//!                 {"type": "image", "image_path": "/tmp/p1_img1.png"}
//!             ]}
//!         ]
//!     }"#,
//! )?;
//! assert_eq!(doc.pages.len(), 1);
//! # Ok::<(), quarry::Error>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::chunk::SourceKind;
use crate::error::Result;

/// One content block on a page: extracted text or an image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    /// A block of extracted text.
    Text {
        /// The raw extracted text (may contain newlines; ingestion
        /// normalizes whitespace).
        text: String,
    },
    /// An extracted image, optionally with OCR text inlined.
    Image {
        /// Path of the extracted image file, when one was written.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_path: Option<String>,
        /// OCR text recovered from the image, when any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ocr_text: Option<String>,
    },
}

impl ContentItem {
    /// A text block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// An image reference without OCR text.
    #[must_use]
    pub fn image(path: impl Into<String>) -> Self {
        Self::Image {
            image_path: Some(path.into()),
            ocr_text: None,
        }
    }

    /// An image reference whose OCR text was inlined by the extractor.
    #[must_use]
    pub fn ocr_image(path: impl Into<String>, ocr_text: impl Into<String>) -> Self {
        Self::Image {
            image_path: Some(path.into()),
            ocr_text: Some(ocr_text.into()),
        }
    }
}

/// One page (or slide) of a normalized document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page/slide number, 1-based.
    #[serde(rename = "page_number", alias = "number")]
    pub number: u32,
    /// Ordered content blocks on this page.
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

impl Page {
    /// Create a page from its number and content blocks.
    #[must_use]
    pub fn new(number: u32, content: Vec<ContentItem>) -> Self {
        Self { number, content }
    }
}

/// A normalized document: the input contract of the chunker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Extractor-reported document type (`"pdf"`, `"pptx"`, ...). Only used
    /// to pick the display kind; absent means `"document"`.
    #[serde(rename = "type", default = "default_doc_type")]
    pub doc_type: String,
    /// Ordered pages.
    #[serde(default)]
    pub pages: Vec<Page>,
}

fn default_doc_type() -> String {
    "document".to_owned()
}

impl Document {
    /// Create a document from a type label and pages.
    #[must_use]
    pub fn new(doc_type: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            doc_type: doc_type.into(),
            pages,
        }
    }

    /// Parse a document from extractor JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`](crate::Error::Document) if the JSON does
    /// not match the contract.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Convert an already-parsed JSON value into a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Document`](crate::Error::Document) if the value does
    /// not match the contract.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// The display kind implied by the extractor-reported type.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self.doc_type.to_ascii_lowercase().as_str() {
            "pptx" | "ppt" | "powerpoint" | "slides" | "slide" => SourceKind::Slide,
            _ => SourceKind::Document,
        }
    }
}
