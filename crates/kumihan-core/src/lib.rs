//! # Kumihan Core
//!
//! Parser for Kumihan notation, a line-oriented markup for Japanese text
//! with keyword markers, footnotes, ruby annotations, lists, quotes and code
//! fences.
//!
//! The parser turns a document into an [`Ast`]: the ordered top-level
//! [`Node`]s, each a tag name, string attributes and either text or
//! children. Rendering is left to the caller.
//!
//! ## Quick Start
//!
//! ```rust
//! use kumihan_core::Parser;
//!
//! let input = "# 見出し\n\n本文((注釈))と｜漢字《かんじ》。\n\n;;;枠線;;;\n囲み\n;;;";
//! let ast = Parser::new().parse(input).unwrap();
//!
//! let types: Vec<&str> = ast.iter().map(|n| n.node_type()).collect();
//! assert_eq!(types, ["h1", "p", "div"]);
//! ```
//!
//! ## Error Recovery
//!
//! Malformed notation never fails a parse. Unknown markers stay literal,
//! unclosed blocks close at end of document, and each of these is reported
//! as a [`Diagnostic`]:
//!
//! ```rust
//! use kumihan_core::{DiagnosticKind, Parser};
//!
//! let result = Parser::new().parse_with_recovery(";;;未知;;; text ;;;").unwrap();
//!
//! assert_eq!(result.ast[0].text_content(), ";;;未知;;; text ;;;");
//! assert_eq!(result.diagnostics.count(DiagnosticKind::UnknownMarker), 1);
//! ```
//!
//! The only hard error is input beyond the configured size bounds
//! ([`ParseError`]).

pub mod ast;
pub mod blocks;
pub mod config;
pub mod error;
pub mod inline;
pub mod keyword;
pub mod lexer;
pub mod lists;
pub mod markers;
pub mod parser;
pub mod sink;
pub mod span;

pub use ast::{Ast, Node, NodeBuilder, NodeContent};
pub use config::ParserConfig;
pub use error::{ConfigError, Diagnostic, DiagnosticKind, Diagnostics, ParseError, Severity};
pub use markers::{Capabilities, MarkerDefinition, MarkerLookup, MarkerTable};
pub use parser::{ParseResult, Parser, Step, Steps};
pub use sink::{DiagnosticSink, LogSink, NullSink};
