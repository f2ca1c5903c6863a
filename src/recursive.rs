//! Recursive character re-segmentation.
//!
//! Tries progressively finer separators until fragments fit the size limit,
//! then packs adjacent fragments into output chunks with a configurable
//! run of repeated trailing context between neighbors.
//!
//! ## The Algorithm
//!
//! Given separators `["\n\n", "\n", ". ", " ", ""]` and `chunk_size = 100`:
//!
//! ```text
//! 1. Split on "\n\n" (paragraphs)
//! 2. For each fragment > 100 bytes, split that fragment on "\n" (lines)
//! 3. ... then ". " (sentences), then " " (words)
//! 4. "" is the last resort: hard split at 100 bytes on char boundaries
//! 5. Pack fragments into chunks of <= 100 bytes; when a chunk closes,
//!    carry its trailing fragments (<= chunk_overlap bytes) into the next
//! ```
//!
//! Splitting coarse-to-fine preserves structure at the highest level that
//! fits: a paragraph boundary beats a sentence boundary beats a word
//! boundary. The overlap is composed of whole fragments, so repeated
//! context never starts mid-word.
//!
//! ## Separator Hierarchies
//!
//! The default suits extractor prose:
//!
//! ```text
//! ["\n\n", "\n", ". ", " ", ""]
//! ```
//!
//! Markdown-heavy sources do better with headings added up front:
//!
//! ```text
//! ["\n## ", "\n### ", "\n\n", "\n", ". ", " ", ""]
//! ```

use crate::chunk::Chunk;

/// The default separator hierarchy, coarsest first. The trailing empty
/// string enables the character-level hard split.
pub(crate) fn default_separators() -> Vec<String> {
    ["\n\n", "\n", ". ", " ", ""]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Split one chunk recursively and assemble overlapping output chunks.
///
/// The caller validates `chunk_size > 0` and `overlap < chunk_size` before
/// dispatching here.
pub(crate) fn split(
    chunk: &Chunk,
    chunk_size: usize,
    overlap: usize,
    separators: &[String],
) -> Vec<Chunk> {
    debug_assert!(
        chunk_size > 0 && overlap < chunk_size,
        "recursive parameters validated upstream"
    );

    let mut fragments = Vec::new();
    collect_fragments(&chunk.text, separators, 0, chunk_size, &mut fragments);

    assemble(&fragments, chunk_size, overlap)
        .into_iter()
        .map(|text| chunk.with_text(text))
        .collect()
}

/// Break `text` into fragments no longer than `max` bytes, trying
/// `separators[index]` first and recursing into finer ones for oversized
/// parts.
fn collect_fragments(
    text: &str,
    separators: &[String],
    index: usize,
    max: usize,
    out: &mut Vec<String>,
) {
    if text.trim().is_empty() {
        return;
    }
    if text.len() <= max {
        out.push(text.to_owned());
        return;
    }
    let Some(sep) = separators.get(index) else {
        out.extend(force_split(text, max));
        return;
    };
    if sep.is_empty() {
        out.extend(force_split(text, max));
        return;
    }

    let parts: Vec<&str> = text.split(sep.as_str()).collect();
    if parts.len() == 1 {
        // Separator absent; try the next one.
        collect_fragments(text, separators, index + 1, max, out);
        return;
    }

    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        // Keep the separator attached so concatenation is lossless.
        if i < last {
            let with_sep = format!("{part}{sep}");
            if with_sep.len() <= max {
                if !with_sep.trim().is_empty() {
                    out.push(with_sep);
                }
            } else {
                collect_fragments(&with_sep, separators, index + 1, max, out);
            }
        } else if part.len() <= max {
            if !part.trim().is_empty() {
                out.push((*part).to_owned());
            }
        } else {
            collect_fragments(part, separators, index + 1, max, out);
        }
    }
}

/// Hard split at `max` bytes, backed off to char boundaries.
fn force_split(text: &str, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + max).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        if end == start {
            // A single char wider than max; take it whole rather than loop.
            end = start + 1;
            while !text.is_char_boundary(end) {
                end += 1;
            }
        }
        out.push(text[start..end].to_owned());
        start = end;
    }
    out
}

/// Pack fragments into chunks of at most `max` bytes, carrying trailing
/// fragments of at most `overlap` bytes into the next chunk.
fn assemble(fragments: &[String], max: usize, overlap: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut window: Vec<&str> = Vec::new();
    let mut window_len = 0;

    for frag in fragments {
        if !window.is_empty() && window_len + frag.len() > max {
            push_joined(&mut out, &window);
            // Keep a tail within the overlap budget that also leaves room
            // for the incoming fragment.
            while !window.is_empty()
                && (window_len > overlap || window_len + frag.len() > max)
            {
                window_len -= window.remove(0).len();
            }
        }
        window_len += frag.len();
        window.push(frag);
    }

    if !window.is_empty() {
        push_joined(&mut out, &window);
    }
    out
}

fn push_joined(out: &mut Vec<String>, window: &[&str]) {
    let joined = window.concat();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_owned());
    }
}
