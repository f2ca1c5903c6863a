//! Token-window re-segmentation: fixed and sliding.
//!
//! Both strategies cut a chunk's text into windows of `window_size`
//! whitespace tokens. Fixed windows abut; sliding windows advance by
//! `window_size - overlap` tokens so adjacent windows share context.
//!
//! ## How It Works
//!
//! ```text
//! window_size = 4, overlap = 2  (step = 2)
//!
//! Tokens:  the quick brown fox jumps over the dog
//!
//! Window 0: "the quick brown fox"      [0..4]
//! Window 1: "brown fox jumps over"     [2..6]  <- starts at 4 - 2 = 2
//! Window 2: "jumps over the dog"       [4..8]
//! Window 3: "the dog"                  [6..8]  <- trailing tail window
//! ```
//!
//! Trailing windows shorter than `window_size` are emitted as-is; the
//! validity filter downstream decides whether they carry enough words to
//! keep.
//!
//! ## Why Overlap?
//!
//! Without overlap, a sentence straddling a window boundary is captured by
//! neither side. Sharing a few tokens keeps boundary context retrievable at
//! the price of some duplicated text. Typical settings put the overlap at
//! a quarter to a half of the window.

use crate::chunk::Chunk;
use crate::tokenizer::Tokenizer;

/// Consecutive non-overlapping windows of `window_size` tokens.
pub(crate) fn fixed(chunk: &Chunk, tokenizer: &Tokenizer, window_size: usize) -> Vec<Chunk> {
    windows(chunk, tokenizer, window_size, window_size)
}

/// Overlapping windows advancing `window_size - overlap` tokens at a time.
///
/// The caller validates `overlap < window_size` before dispatching here.
pub(crate) fn sliding(
    chunk: &Chunk,
    tokenizer: &Tokenizer,
    window_size: usize,
    overlap: usize,
) -> Vec<Chunk> {
    windows(chunk, tokenizer, window_size, window_size - overlap)
}

fn windows(chunk: &Chunk, tokenizer: &Tokenizer, size: usize, step: usize) -> Vec<Chunk> {
    debug_assert!(size > 0 && step > 0, "window parameters validated upstream");

    let tokens: Vec<&str> = tokenizer.tokens(&chunk.text).collect();
    if tokens.is_empty() {
        return vec![];
    }

    let mut out = Vec::with_capacity(tokens.len().div_ceil(step));
    let mut start = 0;
    while start < tokens.len() {
        let end = (start + size).min(tokens.len());
        out.push(chunk.with_text(tokens[start..end].join(" ")));
        start += step;
    }
    out
}
