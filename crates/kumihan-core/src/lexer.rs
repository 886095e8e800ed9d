//! Line splitter feeding the document parser.
//!
//! The orchestrator works on an indexed slice of lines, so the lexer's job is
//! only to cut the input at newlines (via `memchr`) and record where every
//! line came from.
//!
//! - Zero-copy: lines borrow directly from the input
//! - CRLF aware: a `\r` before `\n` is not part of the line text

use crate::span::Span;
use memchr::memchr;

/// A single line from the input with its source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line text (without trailing newline).
    pub text: &'a str,
    /// Byte span in the original input.
    pub span: Span,
    /// 1-based line number.
    pub number: u32,
}

impl<'a> Line<'a> {
    /// Check if this line contains only whitespace.
    #[inline(always)]
    pub fn is_blank(&self) -> bool {
        self.text.bytes().all(|b| b == b' ' || b == b'\t')
    }

    #[inline(always)]
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }

    /// Width of the leading whitespace, counting a tab as `tab_width` columns.
    #[inline]
    pub fn indent_width(&self, tab_width: usize) -> usize {
        let mut width = 0;
        for b in self.text.bytes() {
            match b {
                b' ' => width += 1,
                b'\t' => width += tab_width,
                _ => break,
            }
        }
        width
    }

    /// The line with its leading whitespace removed.
    #[inline]
    pub fn unindented(&self) -> &'a str {
        self.text.trim_start_matches([' ', '\t'])
    }
}

/// Peek/consume access to the lines of a document.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    offset: usize,
    number: u32,
}

impl<'a> Lexer<'a> {
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            offset: 0,
            number: 0,
        }
    }

    /// Consume and return the next line, or `None` at end of input.
    #[inline]
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        if self.offset >= self.bytes.len() {
            return None;
        }

        let start = self.offset;
        let end = match memchr(b'\n', &self.bytes[start..]) {
            Some(pos) => start + pos,
            None => self.bytes.len(),
        };

        let text_end = if end > start && self.bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };

        self.offset = if end < self.bytes.len() { end + 1 } else { end };
        self.number += 1;

        // `\n` and `\r` are ASCII, so both cut points are char boundaries.
        // Input length is bounded by `MAX_OFFSET` before lines are split.
        Some(Line {
            text: &self.input[start..text_end],
            span: Span::new(start as u32, text_end as u32),
            number: self.number,
        })
    }

    /// Collect every remaining line.
    pub fn collect_lines(mut self) -> Vec<Line<'a>> {
        let mut lines = Vec::with_capacity(self.bytes.len() / 32 + 1);
        while let Some(line) = self.next_line() {
            lines.push(line);
        }
        lines
    }
}

/// Split `input` into lines.
///
/// A trailing newline does not produce an extra empty line, so `""` and
/// `"\n"` yield zero and one line respectively.
#[inline]
pub fn split_lines(input: &str) -> Vec<Line<'_>> {
    Lexer::new(input).collect_lines()
}
