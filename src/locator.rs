//! The Locator type: where in a source document a chunk came from.

/// A page or slide range within a source document.
///
/// Indices are 1-based and inclusive at both ends, matching how page
/// numbers are reported by extractors (and read by humans). A chunk that
/// spans pages 2 through 5 carries `Locator { start: 2, end: 5 }`; a chunk
/// from a single page has `start == end`.
///
/// ```rust
/// use quarry::Locator;
///
/// let a = Locator::page(2);
/// let b = Locator::new(4, 5);
///
/// // Merging produces the covering envelope.
/// assert_eq!(a.merge(b), Locator::new(2, 5));
/// assert_eq!(a.merge(b).to_string(), "2-5");
/// assert_eq!(a.to_string(), "2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locator {
    /// First page/slide of the range (1-based).
    pub start: u32,
    /// Last page/slide of the range (inclusive).
    pub end: u32,
}

impl Locator {
    /// Create a locator covering `start..=end`.
    ///
    /// # Panics
    ///
    /// Panics if `start` is zero (pages are 1-based) or `start > end`.
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        assert!(start >= 1, "page indices are 1-based");
        assert!(start <= end, "locator start must not exceed end");
        Self { start, end }
    }

    /// Create a locator for a single page.
    #[must_use]
    pub fn page(number: u32) -> Self {
        Self::new(number, number)
    }

    /// The smallest range covering both locators.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether this locator is a single page.
    #[must_use]
    pub fn is_single(self) -> bool {
        self.start == self.end
    }

    /// Number of pages covered, inclusive of both ends.
    #[must_use]
    pub fn page_count(self) -> u32 {
        self.end - self.start + 1
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}
