//! Document parser: the line-driven dispatcher.
//!
//! The input is split into lines once. At each cursor position the first
//! sub-parser that claims the line wins, in this order:
//!
//! 1. keyword marker (`;;;name;;;`)
//! 2. code fence
//! 3. list run
//! 4. heading, blockquote, horizontal rule
//! 5. paragraph (always claims)
//!
//! Each claim reports how many lines it consumed, always at least one, and
//! the cursor never moves backwards. Blank lines between blocks are skipped.

use crate::ast::{Ast, Node, NodeContent};
use crate::blocks;
use crate::config::ParserConfig;
use crate::error::{Diagnostic, Diagnostics, ParseError};
use crate::inline::InlineScanner;
use crate::keyword;
use crate::lexer::{split_lines, Line};
use crate::lists;
use crate::markers::{MarkerLookup, MarkerTable};
use crate::sink::{DiagnosticSink, LogSink};
use crate::span::MAX_OFFSET;

/// Output of a parse that also kept its diagnostics.
#[derive(Debug)]
pub struct ParseResult {
    pub ast: Ast,
    pub diagnostics: Diagnostics,
}

impl ParseResult {
    /// Whether the document parsed without any diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.has_warnings()
    }
}

/// One committed dispatch: the nodes produced from `consumed` lines
/// starting at line index `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub start: usize,
    pub consumed: usize,
    pub nodes: Vec<Node>,
}

/// What a sub-parser hands back when it claims lines.
#[derive(Debug)]
pub(crate) struct Parsed {
    pub nodes: Vec<Node>,
    pub consumed: usize,
}

impl Parsed {
    pub fn one(node: Node, consumed: usize) -> Self {
        Self {
            nodes: vec![node],
            consumed,
        }
    }
}

/// Per-parse state shared by the sub-parsers.
pub(crate) struct Context<'s> {
    pub markers: &'s dyn MarkerLookup,
    pub config: &'s ParserConfig,
    scanner: InlineScanner,
    headings: u32,
    sink: &'s mut dyn DiagnosticSink,
}

impl<'s> Context<'s> {
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.report(&diagnostic);
    }

    pub fn scan(&mut self, text: &str) -> NodeContent {
        NodeContent::from_inlines(self.scanner.scan(text))
    }

    pub fn scan_inlines(&mut self, text: &str) -> Vec<Node> {
        self.scanner.scan(text)
    }

    pub fn next_heading_id(&mut self) -> String {
        self.headings += 1;
        format!("heading-{}", self.headings)
    }
}

/// Kumihan notation parser.
///
/// Holds only read-only configuration, so one parser can serve any number
/// of documents, including from several threads at once when `M` is `Sync`.
///
/// ```rust
/// use kumihan_core::Parser;
///
/// let parser = Parser::new();
/// let ast = parser.parse(";;;太字;;; text ;;;").unwrap();
///
/// assert_eq!(ast.len(), 1);
/// assert_eq!(ast[0].node_type(), "strong");
/// assert_eq!(ast[0].as_text(), Some("text"));
/// ```
#[derive(Debug, Clone)]
pub struct Parser<M = MarkerTable> {
    markers: M,
    config: ParserConfig,
}

impl Parser<MarkerTable> {
    /// A parser with the default marker table and limits.
    pub fn new() -> Self {
        Self::with_markers(MarkerTable::default())
    }
}

impl Default for Parser<MarkerTable> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MarkerLookup> Parser<M> {
    pub fn with_markers(markers: M) -> Self {
        Self {
            markers,
            config: ParserConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn markers(&self) -> &M {
        &self.markers
    }

    /// Parse a document, forwarding diagnostics to the `log` facade.
    ///
    /// Fails only when the input exceeds the configured size bounds.
    pub fn parse(&self, input: &str) -> Result<Ast, ParseError> {
        self.parse_with_sink(input, &mut LogSink)
    }

    /// Parse a document, handing each diagnostic to `sink`.
    pub fn parse_with_sink(
        &self,
        input: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Ast, ParseError> {
        let mut ast = Vec::new();
        for step in self.steps(input, sink)? {
            ast.extend(step.nodes);
        }
        Ok(ast)
    }

    /// Parse a document and return its diagnostics alongside the tree.
    pub fn parse_with_recovery(&self, input: &str) -> Result<ParseResult, ParseError> {
        let mut collected: Vec<Diagnostic> = Vec::new();
        let ast = self.parse_with_sink(input, &mut collected)?;
        Ok(ParseResult {
            ast,
            diagnostics: Diagnostics::from(collected),
        })
    }

    /// Iterate over the dispatch steps of a parse.
    ///
    /// Size bounds are checked up front; the iterator itself cannot fail.
    pub fn steps<'a, 's>(
        &'s self,
        input: &'a str,
        sink: &'s mut dyn DiagnosticSink,
    ) -> Result<Steps<'a, 's>, ParseError> {
        // Offsets must fit in a `Span`.
        let byte_limit = self.config.max_input_bytes.min(MAX_OFFSET);
        if input.len() > byte_limit {
            return Err(ParseError::InputTooLarge {
                bytes: input.len(),
                limit: byte_limit,
            });
        }

        let lines = split_lines(input);
        if lines.len() > self.config.max_lines {
            return Err(ParseError::TooManyLines {
                lines: lines.len(),
                limit: self.config.max_lines,
            });
        }

        log::debug!("parsing {} lines ({} bytes)", lines.len(), input.len());

        Ok(Steps {
            lines,
            pos: 0,
            cx: Context {
                markers: &self.markers,
                config: &self.config,
                scanner: InlineScanner::new(),
                headings: 0,
                sink,
            },
        })
    }
}

/// Iterator returned by [`Parser::steps`].
pub struct Steps<'a, 's> {
    lines: Vec<Line<'a>>,
    pos: usize,
    cx: Context<'s>,
}

impl<'a, 's> Steps<'a, 's> {
    /// Index of the next unconsumed line.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn dispatch(&mut self) -> Parsed {
        let lines = self.lines.as_slice();
        let start = self.pos;
        let cx = &mut self.cx;

        if let Some(parsed) = keyword::parse_marker(lines, start, cx) {
            log::debug!("line {}: keyword marker", lines[start].number);
            return parsed;
        }
        if let Some(parsed) = blocks::parse_code_fence(lines, start, cx) {
            log::debug!("line {}: code fence", lines[start].number);
            return parsed;
        }
        if let Some(parsed) = lists::parse_list(lines, start, cx) {
            log::debug!("line {}: list", lines[start].number);
            return parsed;
        }
        if let Some(parsed) = blocks::parse_heading(lines, start, cx) {
            return parsed;
        }
        if let Some(parsed) = blocks::parse_blockquote(lines, start, cx) {
            return parsed;
        }
        if let Some(parsed) = blocks::parse_rule(lines, start, cx) {
            return parsed;
        }
        blocks::parse_paragraph(lines, start, cx)
    }
}

impl<'a, 's> Iterator for Steps<'a, 's> {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        while self.pos < self.lines.len() && self.lines[self.pos].is_blank() {
            self.pos += 1;
        }
        if self.pos >= self.lines.len() {
            return None;
        }

        let start = self.pos;
        let parsed = self.dispatch();
        debug_assert!(parsed.consumed >= 1, "sub-parser consumed no lines");
        let consumed = parsed.consumed.clamp(1, self.lines.len() - start);
        self.pos = start + consumed;

        log::trace!(
            "step at line {}: {} line(s), {} node(s)",
            self.lines[start].number,
            consumed,
            parsed.nodes.len()
        );

        Some(Step {
            start,
            consumed,
            nodes: parsed.nodes,
        })
    }
}
