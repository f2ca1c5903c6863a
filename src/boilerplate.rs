//! Boilerplate removal.
//!
//! Running headers, footers, slide numbers, and watermarks survive
//! extraction as ordinary text and then show up in every chunk of a
//! document. Left alone they dominate term-frequency statistics and pad
//! every embedding with the same noise. This filter removes them by
//! frequency: a line repeated verbatim often enough across a document is
//! boilerplate, whatever it says.
//!
//! ## Batch Semantics
//!
//! Counting only works across a whole document's chunks at once. Applying
//! the filter chunk-by-chunk would see every line exactly once and remove
//! nothing, so [`BoilerplateFilter::strip`] takes the full batch.
//!
//! ```text
//! threshold = 3
//!
//! page 1: "Intro text"            "CONFIDENTIAL"
//! page 2: "More text"             "CONFIDENTIAL"
//! page 3: "Final text"            "CONFIDENTIAL"
//! page 4: "Appendix"              "CONFIDENTIAL"   <- 4th occurrence
//!
//! After strip: the four content lines survive, "CONFIDENTIAL" is gone
//! from every chunk. At exactly 3 occurrences it would have been kept.
//! ```
//!
//! The count is exclusive: a line is boilerplate only when its occurrence
//! count exceeds the threshold.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::chunk::Chunk;

/// Batch filter that strips lines recurring above a frequency threshold.
///
/// ```rust
/// use quarry::BoilerplateFilter;
///
/// let filter = BoilerplateFilter::new(BoilerplateFilter::DEFAULT_THRESHOLD);
/// assert_eq!(filter.threshold(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoilerplateFilter {
    threshold: usize,
}

impl BoilerplateFilter {
    /// The customary threshold: lines must repeat more than three times to
    /// be treated as boilerplate.
    pub const DEFAULT_THRESHOLD: usize = 3;

    /// Create a filter with the given occurrence threshold (exclusive).
    ///
    /// A threshold of zero removes every non-blank line; degenerate but
    /// well-defined.
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// The occurrence threshold.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Remove boilerplate lines from every chunk of the batch.
    ///
    /// Each chunk's text is split into lines; occurrences of each trimmed
    /// line are counted across the whole batch; lines whose count exceeds
    /// the threshold are dropped; the survivors are rejoined with single
    /// spaces. A chunk whose text is entirely boilerplate is kept with
    /// empty text; deciding its fate is the validity filter's job, applied
    /// downstream.
    #[must_use]
    pub fn strip(&self, mut chunks: Vec<Chunk>) -> Vec<Chunk> {
        if chunks.is_empty() {
            return chunks;
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for chunk in &chunks {
            for line in chunk.text.lines() {
                let line = line.trim();
                if !line.is_empty() {
                    *counts.entry(line).or_default() += 1;
                }
            }
        }

        let boilerplate: HashSet<&str> = counts
            .iter()
            .filter(|&(_, &count)| count > self.threshold)
            .map(|(&line, _)| line)
            .collect();

        if !boilerplate.is_empty() {
            debug!(
                distinct_lines = counts.len(),
                boilerplate_lines = boilerplate.len(),
                threshold = self.threshold,
                "stripping boilerplate"
            );
        }

        let rebuilt: Vec<String> = chunks
            .iter()
            .map(|chunk| {
                let mut text = String::with_capacity(chunk.text.len());
                for line in chunk.text.lines() {
                    let line = line.trim();
                    if line.is_empty() || boilerplate.contains(line) {
                        continue;
                    }
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(line);
                }
                text
            })
            .collect();

        for (chunk, text) in chunks.iter_mut().zip(rebuilt) {
            chunk.text = text;
        }
        chunks
    }
}

impl Default for BoilerplateFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}
