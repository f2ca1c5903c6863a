//! Owned NLP resources: word tokenization and stop words.
//!
//! Both resources are plain values constructed by the caller and passed
//! into the components that need them ([`Chunker`](crate::Chunker),
//! [`TfIdfScorer`](crate::TfIdfScorer)). There are no process-wide
//! singletons and nothing is lazily initialized behind the caller's back;
//! a pipeline run owns exactly the resources it was built with.
//!
//! ## Two Token Views
//!
//! The tokenizer exposes two deliberately different segmentations:
//!
//! | Method | Splits on | Used for |
//! |----------|------------------------|--------------------------------|
//! | `tokens` | whitespace | window strategies (lossless) |
//! | `words` | UAX #29 word bounds | validity counting, term mining |
//!
//! Window strategies must be able to rebuild text from tokens, so they use
//! whitespace tokens where punctuation stays attached (`"Hello,"` is one
//! token). Counting and term extraction want linguistic words, so they use
//! Unicode word segmentation where punctuation disappears (`"Hello, world!"`
//! is two words). The practical upshot: a window containing only dashes or
//! bullet glyphs counts zero words and is dropped by the validity filter.

use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

/// Word tokenizer backed by Unicode Standard Annex #29 segmentation.
///
/// ```rust
/// use quarry::Tokenizer;
///
/// let tokenizer = Tokenizer::new();
/// assert_eq!(tokenizer.word_count("Hello, world!"), 2);
/// let tokens: Vec<&str> = tokenizer.tokens("Hello, world!").collect();
/// assert_eq!(tokens, ["Hello,", "world!"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer {
    _private: (),
}

impl Tokenizer {
    /// Create a tokenizer.
    #[must_use]
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Linguistic words per UAX #29. Punctuation is not a word; hyphenated
    /// and apostrophized forms stay whole (`"don't"` is one word).
    pub fn words<'a>(&self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        text.unicode_words()
    }

    /// Number of linguistic words in `text`.
    #[must_use]
    pub fn word_count(&self, text: &str) -> usize {
        self.words(text).count()
    }

    /// Whitespace-delimited tokens. Joining them back with single spaces
    /// reproduces the normalized text, so window strategies use these.
    pub fn tokens<'a>(&self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        text.split_whitespace()
    }
}

/// An explicitly-owned stop-word set.
///
/// The default set is the usual English function-word list. Callers working
/// with domain text extend it rather than patching a global:
///
/// ```rust
/// use quarry::StopWords;
///
/// let stops = StopWords::english().with_words(["figure", "table"]);
/// assert!(stops.contains("the"));
/// assert!(stops.contains("figure"));
/// assert!(!stops.contains("protein"));
/// ```
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

/// English function words. Matches are case-insensitive (lookup lowercases).
const ENGLISH: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "cannot", "could", "couldn't", "did", "didn't", "do", "does", "doesn't",
    "doing", "don't", "down", "during", "each", "few", "for", "from", "further", "had", "hadn't",
    "has", "hasn't", "have", "haven't", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "isn't", "it", "it's", "its",
    "itself", "just", "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
    "own", "same", "shan't", "she", "should", "shouldn't", "so", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "wasn't", "we",
    "were", "weren't", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "won't", "would", "wouldn't", "you", "your", "yours", "yourself", "yourselves",
];

impl StopWords {
    /// The standard English stop-word list.
    #[must_use]
    pub fn english() -> Self {
        Self {
            words: ENGLISH.iter().map(|w| (*w).to_owned()).collect(),
        }
    }

    /// An empty set (keep every term).
    #[must_use]
    pub fn none() -> Self {
        Self {
            words: HashSet::new(),
        }
    }

    /// Build a set from arbitrary words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::none().with_words(words)
    }

    /// Extend the set with additional words.
    #[must_use]
    pub fn with_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words
            .extend(words.into_iter().map(|w| w.into().to_lowercase()));
        self
    }

    /// Whether `word` is a stop word (case-insensitive).
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        if self.words.is_empty() {
            return false;
        }
        // Fast path for words that are already lowercase.
        if self.words.contains(word) {
            return true;
        }
        word.chars().any(char::is_uppercase) && self.words.contains(&word.to_lowercase())
    }

    /// Number of words in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}
