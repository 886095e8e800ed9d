//! Byte ranges recorded on diagnostics.
//!
//! Offsets are `u32`, which is why `ParserConfig` caps `max_input_bytes` at
//! [`MAX_OFFSET`].

use std::ops::Range;

/// Largest input offset a [`Span`] can hold.
pub const MAX_OFFSET: usize = u32::MAX as usize;

/// `[start, end)` in bytes of the parsed input.
///
/// ```rust
/// use kumihan_core::span::Span;
///
/// let input = "本文\n;;;未知;;;";
/// let span = Span::new(7, 19);
/// assert_eq!(&input[span.range()], ";;;未知;;;");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// From the start of `self` to the end of `last`, for constructs that
    /// run over several lines.
    #[inline]
    pub fn through(self, last: Span) -> Span {
        Span {
            start: self.start,
            end: last.end.max(self.end),
        }
    }

    /// The span as a slice range into the input it was taken from.
    #[inline]
    pub fn range(self) -> Range<usize> {
        self.start as usize..self.end.max(self.start) as usize
    }
}
