//! Merge-small re-segmentation.
//!
//! Walks chunks of the same source in order, accumulating neighbors until
//! the accumulated text reaches the minimum word count, then emits and
//! starts over. Fragmented extractions (one chunk per text box, per bullet,
//! per table cell) come out the other side as passages big enough to embed.
//!
//! ## Emission Rules
//!
//! The accumulator is checked **before** each merge: a chunk that already
//! meets the threshold is emitted untouched, so a list of all-valid chunks
//! passes through element-for-element.
//!
//! ```text
//! threshold = 5 words
//!
//! ["tiny one", "tiny two", "a chunk with plenty of words already"]
//!      |            |                      |
//!      +-- merged --+                      +-- emitted as-is
//!      "tiny one tiny two"
//! ```
//!
//! Boundaries:
//! - A chunk from a different source forces the accumulator out first; an
//!   accumulator still under the threshold at a source boundary is dropped.
//! - The trailing accumulator at end of input is emitted even when it never
//!   reached the threshold (best effort, not discarded).
//!
//! Merged chunks carry the envelope of their parts' locators and the parts'
//! texts joined by single spaces.

use crate::chunk::Chunk;
use crate::error::Result;
use crate::tokenizer::Tokenizer;

/// Merge undersized same-source neighbors until they reach `min_tokens`
/// words.
pub(crate) fn merge_small(
    chunks: Vec<Chunk>,
    tokenizer: &Tokenizer,
    min_tokens: usize,
) -> Result<Vec<Chunk>> {
    let valid = |c: &Chunk| tokenizer.word_count(&c.text) >= min_tokens;

    let mut out = Vec::with_capacity(chunks.len());
    let mut acc: Option<Chunk> = None;

    for chunk in chunks {
        let Some(held) = acc.take() else {
            acc = Some(chunk);
            continue;
        };

        if held.source != chunk.source {
            if valid(&held) {
                out.push(held);
            }
            acc = Some(chunk);
        } else if valid(&held) {
            out.push(held);
            acc = Some(chunk);
        } else {
            let merged = held.merge(&chunk)?;
            if valid(&merged) {
                out.push(merged);
            } else {
                acc = Some(merged);
            }
        }
    }

    // Trailing accumulator survives regardless of size.
    if let Some(held) = acc {
        out.push(held);
    }
    Ok(out)
}
