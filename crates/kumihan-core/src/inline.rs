//! Inline scanner for footnotes, ruby annotations and emphasis.
//!
//! Single left-to-right pass with `memchr` jumps between candidate bytes.
//! At each candidate position the forms are tried in fixed order
//! (footnote, ruby, emphasis) and the first match wins. Anything that does
//! not close degrades to literal text.
//!
//! Once a search for a closing delimiter has failed, no later opener of the
//! same form can succeed either, so the form is switched off for the rest of
//! the span. This keeps pathological input like `((((((…` linear.

use memchr::memchr3;

use crate::ast::{Node, NodeBuilder, NodeContent};

const FOOTNOTE_OPEN: &str = "((";
const FOOTNOTE_CLOSE: &str = "))";
const RUBY_BAR: &str = "｜";
const RUBY_OPEN: char = '《';
const RUBY_CLOSE: char = '》';

/// First byte of `｜` (U+FF5C) in UTF-8.
const RUBY_LEAD: u8 = 0xEF;

/// Per-document inline scanning state.
///
/// Footnotes are numbered from 1 across every span scanned by the same
/// scanner, so one scanner is created per parse.
#[derive(Debug, Default)]
pub struct InlineScanner {
    footnotes: u32,
}

impl InlineScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of footnotes emitted so far.
    pub fn footnote_count(&self) -> u32 {
        self.footnotes
    }

    /// Split `text` into text fragments and inline markup nodes.
    pub fn scan(&mut self, text: &str) -> Vec<Node> {
        if text.is_empty() {
            return Vec::new();
        }
        InlineParser::new(text, self).parse()
    }

    fn next_footnote(&mut self) -> u32 {
        self.footnotes += 1;
        self.footnotes
    }
}

/// Scan a standalone span with fresh footnote numbering.
pub fn parse_inlines(text: &str) -> Vec<Node> {
    InlineScanner::new().scan(text)
}

struct InlineParser<'t, 's> {
    text: &'t str,
    bytes: &'t [u8],
    pos: usize,
    scanner: &'s mut InlineScanner,
    no_footnote_close: bool,
    no_ruby_open: bool,
    no_strong_close: bool,
    no_emphasis_close: bool,
}

impl<'t, 's> InlineParser<'t, 's> {
    fn new(text: &'t str, scanner: &'s mut InlineScanner) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            scanner,
            no_footnote_close: false,
            no_ruby_open: false,
            no_strong_close: false,
            no_emphasis_close: false,
        }
    }

    fn parse(&mut self) -> Vec<Node> {
        let mut inlines = Vec::with_capacity(4);
        let mut text_start = 0;

        while self.pos < self.bytes.len() {
            let next_special = self.find_next_special();
            if next_special >= self.bytes.len() {
                break;
            }

            self.pos = next_special;

            let parsed = match self.bytes[self.pos] {
                b'(' => self.try_parse_footnote(&mut inlines, &mut text_start),
                RUBY_LEAD => self.try_parse_ruby(&mut inlines, &mut text_start),
                b'*' => self.try_parse_asterisk(&mut inlines, &mut text_start),
                _ => false,
            };

            if !parsed {
                self.advance_char();
            }
        }

        if text_start < self.bytes.len() {
            inlines.push(Node::text(&self.text[text_start..]));
        }

        inlines
    }

    #[inline(always)]
    fn find_next_special(&self) -> usize {
        match memchr3(b'(', b'*', RUBY_LEAD, &self.bytes[self.pos..]) {
            Some(offset) => self.pos + offset,
            None => self.bytes.len(),
        }
    }

    /// Step over the character at `pos`, staying on a char boundary.
    #[inline]
    fn advance_char(&mut self) {
        let width = self.text[self.pos..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.pos += width;
    }

    #[inline]
    fn flush_text(&self, inlines: &mut Vec<Node>, text_start: &mut usize) {
        if *text_start < self.pos {
            inlines.push(Node::text(&self.text[*text_start..self.pos]));
        }
        *text_start = self.pos;
    }

    fn try_parse_footnote(&mut self, inlines: &mut Vec<Node>, text_start: &mut usize) -> bool {
        if self.no_footnote_close || !self.text[self.pos..].starts_with(FOOTNOTE_OPEN) {
            return false;
        }

        let content_start = self.pos + FOOTNOTE_OPEN.len();
        let close = match self.text[content_start..].find(FOOTNOTE_CLOSE) {
            Some(offset) => content_start + offset,
            None => {
                self.no_footnote_close = true;
                return false;
            }
        };

        let inner = &self.text[content_start..close];
        if inner.trim().is_empty() {
            return false;
        }

        self.flush_text(inlines, text_start);

        let number = self.scanner.next_footnote();
        let children = InlineParser::new(inner, &mut *self.scanner).parse();
        inlines.push(
            NodeBuilder::new("footnote")
                .id(format!("footnote-{}", number))
                .attribute("number", number.to_string())
                .content(NodeContent::Children(children))
                .build(),
        );

        self.pos = close + FOOTNOTE_CLOSE.len();
        *text_start = self.pos;
        true
    }

    fn try_parse_ruby(&mut self, inlines: &mut Vec<Node>, text_start: &mut usize) -> bool {
        if self.no_ruby_open || !self.text[self.pos..].starts_with(RUBY_BAR) {
            return false;
        }

        let base_start = self.pos + RUBY_BAR.len();
        let rest = &self.text[base_start..];

        // A later bar restarts the base, a newline ends the candidate.
        let open = match rest.find(['｜', RUBY_OPEN, '\n']) {
            Some(offset) if rest[offset..].starts_with(RUBY_OPEN) => offset,
            Some(_) => return false,
            None => {
                self.no_ruby_open = true;
                return false;
            }
        };
        let base = &rest[..open];
        if base.is_empty() {
            return false;
        }

        let reading_start = open + RUBY_OPEN.len_utf8();
        let after_open = &rest[reading_start..];
        let close = match after_open.find([RUBY_CLOSE, RUBY_OPEN, '\n']) {
            Some(offset) if after_open[offset..].starts_with(RUBY_CLOSE) => offset,
            _ => return false,
        };
        let reading = &after_open[..close];
        if reading.is_empty() {
            return false;
        }

        self.flush_text(inlines, text_start);

        inlines.push(
            NodeBuilder::new("ruby")
                .attribute("base", base)
                .attribute("reading", reading)
                .content(vec![
                    Node::text(base),
                    NodeBuilder::new("rt").content(reading).build(),
                ])
                .build(),
        );

        self.pos = base_start + reading_start + close + RUBY_CLOSE.len_utf8();
        *text_start = self.pos;
        true
    }

    #[inline]
    fn try_parse_asterisk(&mut self, inlines: &mut Vec<Node>, text_start: &mut usize) -> bool {
        if self.pos + 1 < self.bytes.len() && self.bytes[self.pos + 1] == b'*' {
            self.try_parse_strong(inlines, text_start)
        } else {
            self.try_parse_emphasis(inlines, text_start)
        }
    }

    fn try_parse_strong(&mut self, inlines: &mut Vec<Node>, text_start: &mut usize) -> bool {
        if self.no_strong_close {
            return false;
        }

        let start = self.pos;
        let content_start = start + 2;

        if content_start >= self.bytes.len() || is_space(self.bytes[content_start]) {
            return false;
        }

        let mut search = content_start;
        while let Some(offset) = self.text[search..].find("**") {
            let close = search + offset;
            if close > content_start && !is_space(self.bytes[close - 1]) {
                let content = &self.text[content_start..close];
                self.flush_text(inlines, text_start);
                inlines.push(NodeBuilder::new("strong").content(content).build());
                self.pos = close + 2;
                *text_start = self.pos;
                return true;
            }
            search = close + 1;
        }

        self.no_strong_close = true;
        false
    }

    fn try_parse_emphasis(&mut self, inlines: &mut Vec<Node>, text_start: &mut usize) -> bool {
        if self.no_emphasis_close {
            return false;
        }

        let start = self.pos;
        let content_start = start + 1;

        if content_start >= self.bytes.len() || is_space(self.bytes[content_start]) {
            return false;
        }

        let mut search = content_start;
        while let Some(offset) = memchr::memchr(b'*', &self.bytes[search..]) {
            let close = search + offset;

            // `**` belongs to strong, never to a single-star close.
            if close + 1 < self.bytes.len() && self.bytes[close + 1] == b'*' {
                search = close + 2;
                continue;
            }

            if close > content_start && !is_space(self.bytes[close - 1]) {
                let content = &self.text[content_start..close];
                self.flush_text(inlines, text_start);
                inlines.push(NodeBuilder::new("em").content(content).build());
                self.pos = close + 1;
                *text_start = self.pos;
                return true;
            }
            search = close + 1;
        }

        self.no_emphasis_close = true;
        false
    }
}

#[inline(always)]
fn is_space(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'\n'
}
