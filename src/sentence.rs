//! Sentence re-segmentation.
//!
//! Splits each chunk's text on sentence-ending punctuation followed by
//! whitespace (`. `, `! `, `? `). Every surviving sentence becomes its own
//! chunk carrying the parent chunk's source, kind, and locator.
//!
//! ## The Rule
//!
//! A boundary is a `.`, `!`, or `?` whose next character is whitespace:
//!
//! ```text
//! "Pi is 3.14159. Tau is larger!  Why?"
//!         ^     ^               ^     ^
//!         |     boundary        |     end of input
//!         not a boundary        boundary (run of spaces)
//!         (digit follows)
//! ```
//!
//! The rule is deliberately simple: by the time chunks reach this strategy
//! their text is whitespace-normalized, and a cheap scan keeps behavior
//! predictable. The known cost is abbreviations ("Mr. Smith" splits after
//! "Mr.") — callers who care more about those than about uniform behavior
//! should prefer the recursive strategy with sentence-level separators.

use crate::chunk::Chunk;

/// Split one chunk into per-sentence chunks.
///
/// Text without any boundary comes back as a single chunk. Whitespace-only
/// text yields nothing.
pub(crate) fn split(chunk: &Chunk) -> Vec<Chunk> {
    sentences(&chunk.text)
        .into_iter()
        .map(|s| chunk.with_text(s))
        .collect()
}

/// Sentence pieces of `text`, trimmed, in order. Terminal punctuation stays
/// with its sentence.
fn sentences(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        match chars.peek() {
            Some(&(_, next)) if next.is_whitespace() => {
                // `.`, `!`, `?` are single-byte, so i + 1 is a boundary.
                let piece = text[start..=i].trim();
                if !piece.is_empty() {
                    pieces.push(piece);
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        pieces.push(tail);
    }
    pieces
}
