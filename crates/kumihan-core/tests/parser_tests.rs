//! Integration tests for the Kumihan parser

use std::collections::HashMap;

use kumihan_core::span::Span;
use kumihan_core::{
    Capabilities, Diagnostic, DiagnosticKind, MarkerDefinition, MarkerTable, Node, NodeContent,
    ParseError, Parser, ParserConfig,
};

fn parse(input: &str) -> Vec<Node> {
    Parser::new().parse(input).unwrap()
}

fn types(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(Node::node_type).collect()
}

// ============================================================================
// Empty and Blank Input Tests
// ============================================================================

#[test]
fn test_empty_input() {
    assert!(parse("").is_empty());
}

#[test]
fn test_blank_input() {
    assert!(parse("   \n\n").is_empty());
    assert!(parse("\t\n \n\n\n").is_empty());
}

#[test]
fn test_parse_is_deterministic() {
    let input = "# 題\n\n本文((注))\n\n- a\n  - b\n\n;;;枠線;;;\n中身\n;;;";
    let parser = Parser::new();
    assert_eq!(parser.parse(input).unwrap(), parser.parse(input).unwrap());
}

// ============================================================================
// Keyword Marker Tests
// ============================================================================

#[test]
fn test_single_line_marker() {
    let ast = parse(";;;太字;;; text ;;;");
    assert_eq!(ast.len(), 1);
    assert_eq!(ast[0].node_type(), "strong");
    assert_eq!(ast[0].content(), &NodeContent::Text("text".to_string()));
}

#[test]
fn test_block_marker_with_class() {
    let ast = parse(";;;枠線;;;\n一行目\n二行目\n;;;\n\n後ろ");
    assert_eq!(types(&ast), vec!["div", "p"]);
    assert_eq!(ast[0].attribute("class"), Some("box"));
    assert_eq!(ast[0].as_text(), Some("一行目\n二行目"));
    assert_eq!(ast[1].as_text(), Some("後ろ"));
}

#[test]
fn test_block_marker_content_on_opening_line() {
    let ast = parse(";;;ハイライト;;; 最初\n続き\n;;;");
    assert_eq!(ast.len(), 1);
    assert_eq!(ast[0].as_text(), Some("最初\n続き"));
}

#[test]
fn test_collapsible_marker_has_summary() {
    let ast = parse(";;;折りたたみ;;;\n隠れた内容\n;;;");
    assert_eq!(ast[0].node_type(), "details");
    assert_eq!(ast[0].attribute("summary"), Some("詳細を表示"));
}

#[test]
fn test_marker_content_is_inline_scanned() {
    let ast = parse(";;;枠線;;;\n本文((注釈))\n;;;");
    let div = &ast[0];
    assert_eq!(types(div.children()), vec!["text", "footnote"]);
}

#[test]
fn test_unterminated_marker_is_closed_at_end() {
    let result = Parser::new().parse_with_recovery(";;;太字;;; text").unwrap();
    assert_eq!(result.ast.len(), 1);
    assert_eq!(result.ast[0].node_type(), "strong");
    assert_eq!(result.ast[0].as_text(), Some("text"));
    assert_eq!(
        result.diagnostics.count(DiagnosticKind::UnterminatedMarker),
        1
    );
}

#[test]
fn test_unterminated_block_consumes_rest_of_document() {
    let parser = Parser::new();
    let mut sink: Vec<Diagnostic> = Vec::new();
    let steps: Vec<_> = parser
        .steps(";;;枠線;;;\na\n\n# not a heading", &mut sink)
        .unwrap()
        .collect();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].consumed, 4);
    assert_eq!(steps[0].nodes[0].as_text(), Some("a\n\n# not a heading"));
}

#[test]
fn test_unknown_marker_is_literal() {
    let result = Parser::new().parse_with_recovery(";;;未知;;; text ;;;").unwrap();
    assert_eq!(result.ast.len(), 1);
    assert!(result.ast[0].text_content().contains(";;;未知;;;"));
    assert_eq!(result.diagnostics.count(DiagnosticKind::UnknownMarker), 1);
}

#[test]
fn test_unknown_block_marker_continues_with_next_line() {
    let ast = parse(";;;未知;;;\n# 見出し\n;;;");
    assert_eq!(types(&ast), vec!["p", "h1", "p"]);
    assert_eq!(ast[2].as_text(), Some(";;;"));
}

#[test]
fn test_nested_marker_is_literal_and_first_close_wins() {
    let input = ";;;枠線;;;\n外\n;;;太字;;;\n内\n;;;\n残り\n;;;";
    let result = Parser::new().parse_with_recovery(input).unwrap();

    assert_eq!(types(&result.ast), vec!["div", "p"]);
    assert_eq!(result.ast[0].as_text(), Some("外\n;;;太字;;;\n内"));
    // The outer marker's own closer is left over as paragraph text.
    assert_eq!(result.ast[1].as_text(), Some("残り\n;;;"));
    assert_eq!(result.diagnostics.count(DiagnosticKind::NestedMarker), 1);
}

#[test]
fn test_compound_marker_nests_outermost_first() {
    let ast = parse(";;;枠線+太字;;; 強い ;;;");
    assert_eq!(ast[0].node_type(), "div");
    assert_eq!(types(ast[0].children()), vec!["strong"]);
    assert_eq!(ast[0].children()[0].as_text(), Some("強い"));

    let ast = parse(";;;太字＋イタリック;;; x ;;;");
    assert_eq!(ast[0].node_type(), "strong");
    assert_eq!(ast[0].children()[0].node_type(), "em");
}

#[test]
fn test_compound_marker_with_unknown_part_is_literal() {
    let result = Parser::new().parse_with_recovery(";;;太字+未知;;; x ;;;").unwrap();
    assert_eq!(result.ast[0].node_type(), "p");
    assert_eq!(result.diagnostics.count(DiagnosticKind::UnknownMarker), 1);
}

#[test]
fn test_heading_marker_gets_id() {
    let ast = parse(";;;見出し2;;; 章 ;;;\n\n# 次");
    assert_eq!(ast[0].node_type(), "h2");
    assert_eq!(ast[0].attribute("id"), Some("heading-1"));
    assert_eq!(ast[1].attribute("id"), Some("heading-2"));
}

#[test]
fn test_custom_marker_table() {
    let mut markers = MarkerTable::empty();
    markers
        .insert(
            "note",
            MarkerDefinition::new("aside")
                .with_class("note")
                .with_attribute("role", "note"),
        )
        .unwrap();
    let parser = Parser::with_markers(markers);

    let ast = parser.parse(";;;note;;; hi ;;;\n\n;;;太字;;; x ;;;").unwrap();
    assert_eq!(ast[0].node_type(), "aside");
    assert_eq!(ast[0].attribute("role"), Some("note"));
    assert_eq!(ast[1].node_type(), "p");
}

#[test]
fn test_base_capabilities_treat_spoiler_as_unknown() {
    let parser = Parser::with_markers(MarkerTable::with_capabilities(Capabilities::Base));
    let result = parser
        .parse_with_recovery(";;;ネタバレ;;; 犯人は ;;;")
        .unwrap();
    assert_eq!(result.ast[0].node_type(), "p");
    assert_eq!(result.diagnostics.count(DiagnosticKind::UnknownMarker), 1);
}

#[test]
fn test_raw_map_lookup_with_blank_tag_is_unknown() {
    let mut map = HashMap::new();
    map.insert("x".to_string(), MarkerDefinition::new(""));
    map.insert("y".to_string(), MarkerDefinition::new("  "));
    map.insert("z".to_string(), MarkerDefinition::new("mark"));
    let parser = Parser::with_markers(map);

    let result = parser
        .parse_with_recovery(";;;x;;; hi ;;;\n\n;;;z+y;;; hi ;;;\n\n;;;z;;; ok ;;;")
        .unwrap();
    assert_eq!(types(&result.ast), vec!["p", "p", "mark"]);
    assert_eq!(result.ast[0].as_text(), Some(";;;x;;; hi ;;;"));
    assert_eq!(result.diagnostics.count(DiagnosticKind::UnknownMarker), 2);
}

#[test]
fn test_stray_delimiters_are_text() {
    let ast = parse(";;;\n\n;;;;;;");
    assert_eq!(types(&ast), vec!["p", "p"]);
    assert_eq!(ast[1].as_text(), Some(";;;;;;"));
}

// ============================================================================
// List Tests
// ============================================================================

#[test]
fn test_nested_list() {
    let ast = parse("- a\n  - b\n- c");
    assert_eq!(ast.len(), 1);
    let ul = &ast[0];
    assert_eq!(ul.node_type(), "ul");
    assert_eq!(ul.find_all("li").count(), 3);

    let top: Vec<&Node> = ul.children().iter().collect();
    assert_eq!(top.len(), 2);
    assert_eq!(top[1].as_text(), Some("c"));

    let nested = top[0]
        .children()
        .iter()
        .find(|n| n.node_type() == "ul")
        .unwrap();
    assert_eq!(nested.children().len(), 1);
    assert_eq!(nested.children()[0].as_text(), Some("b"));
}

#[test]
fn test_ordered_list_with_start() {
    let ast = parse("3. three\n4. four");
    assert_eq!(ast[0].node_type(), "ol");
    assert_eq!(ast[0].attribute("start"), Some("3"));
    assert_eq!(ast[0].children().len(), 2);

    let ast = parse("1. one");
    assert_eq!(ast[0].attribute("start"), None);
}

#[test]
fn test_mixed_nested_families() {
    let ast = parse("- a\n  1. x\n  2. y\n- b");
    assert_eq!(ast.len(), 1);
    let ol = ast[0].find_all("ol").next().unwrap();
    assert_eq!(ol.children().len(), 2);
}

#[test]
fn test_top_level_family_change_starts_new_list() {
    let ast = parse("- a\n1. b");
    assert_eq!(types(&ast), vec!["ul", "ol"]);
}

#[test]
fn test_deep_indent_is_clamped_to_one_level() {
    let ast = parse("- a\n        - b");
    let ul = &ast[0];
    let nested = ul.children()[0].children()[1].clone();
    assert_eq!(nested.node_type(), "ul");
    assert_eq!(nested.children()[0].as_text(), Some("b"));
}

#[test]
fn test_list_continuation_becomes_paragraph() {
    let result = Parser::new().parse_with_recovery("- a\ncontinued\n- b").unwrap();
    assert_eq!(result.ast.len(), 1);
    let first = &result.ast[0].children()[0];
    assert_eq!(types(first.children()), vec!["text", "p"]);
    assert_eq!(first.children()[1].as_text(), Some("continued"));
    assert_eq!(
        result
            .diagnostics
            .count(DiagnosticKind::MalformedListContinuation),
        1
    );
}

#[test]
fn test_line_shallower_than_list_ends_it() {
    let result = Parser::new().parse_with_recovery("  - a\nfoo").unwrap();
    assert_eq!(types(&result.ast), vec!["ul", "p"]);
    assert_eq!(result.ast[0].children()[0].as_text(), Some("a"));
    assert_eq!(result.ast[1].as_text(), Some("foo"));
    assert!(result.is_clean());
}

#[test]
fn test_list_ends_at_blank_line() {
    let ast = parse("- a\n\n- b");
    assert_eq!(types(&ast), vec!["ul", "ul"]);
}

#[test]
fn test_list_items_are_inline_scanned() {
    let ast = parse("- **大事**な点");
    let li = &ast[0].children()[0];
    assert_eq!(types(li.children()), vec!["strong", "text"]);
}

// ============================================================================
// Block Tests
// ============================================================================

#[test]
fn test_heading_levels() {
    let ast = parse("# H1\n## H2\n### H3\n#### H4\n##### H5");
    assert_eq!(types(&ast), vec!["h1", "h2", "h3", "h4", "h5"]);
}

#[test]
fn test_heading_level_is_clamped() {
    let ast = parse("###### six\n\n####### seven");
    assert_eq!(types(&ast), vec!["h5", "h5"]);
    assert_eq!(ast[0].as_text(), Some("six"));
}

#[test]
fn test_hash_without_space_is_paragraph() {
    let ast = parse("#tag");
    assert_eq!(types(&ast), vec!["p"]);
}

#[test]
fn test_blockquote_paragraphs() {
    let ast = parse("> 一\n> 二\n>\n> 三\n\n後");
    assert_eq!(types(&ast), vec!["blockquote", "p"]);
    let quote = &ast[0];
    assert_eq!(types(quote.children()), vec!["p", "p"]);
    assert_eq!(quote.children()[0].as_text(), Some("一\n二"));
    assert_eq!(quote.children()[1].as_text(), Some("三"));
}

#[test]
fn test_code_block_is_verbatim() {
    let ast = parse("```rust\nlet x = **not bold**;\n((not a footnote))\n```");
    assert_eq!(ast.len(), 1);
    let pre = &ast[0];
    assert_eq!(pre.node_type(), "pre");
    assert_eq!(pre.attribute("data-lang"), Some("rust"));
    assert_eq!(
        pre.as_text(),
        Some("let x = **not bold**;\n((not a footnote))")
    );
}

#[test]
fn test_code_block_keeps_markers_literal() {
    let ast = parse("```\n;;;太字;;; x ;;;\n```");
    assert_eq!(ast.len(), 1);
    assert_eq!(ast[0].as_text(), Some(";;;太字;;; x ;;;"));
}

#[test]
fn test_unterminated_code_fence() {
    let result = Parser::new().parse_with_recovery("```\ncode\n\nmore").unwrap();
    assert_eq!(result.ast.len(), 1);
    assert_eq!(result.ast[0].as_text(), Some("code\n\nmore"));
    assert_eq!(
        result
            .diagnostics
            .count(DiagnosticKind::UnterminatedCodeFence),
        1
    );
}

#[test]
fn test_horizontal_rule() {
    let ast = parse("上\n\n---\n\n下");
    assert_eq!(types(&ast), vec!["p", "hr", "p"]);
    assert_eq!(ast[1].content(), &NodeContent::Children(Vec::new()));
}

#[test]
fn test_paragraph_joins_lines() {
    let ast = parse("一行目\n二行目\n\n次");
    assert_eq!(types(&ast), vec!["p", "p"]);
    assert_eq!(ast[0].as_text(), Some("一行目\n二行目"));
}

#[test]
fn test_paragraph_ends_at_block_start() {
    let ast = parse("本文\n# 見出し\n- 項目\n> 引用");
    assert_eq!(types(&ast), vec!["p", "h1", "ul", "blockquote"]);
}

// ============================================================================
// Inline Tests
// ============================================================================

#[test]
fn test_footnote_extraction() {
    let ast = parse("text((note))");
    assert_eq!(ast.len(), 1);
    let p = &ast[0];
    assert_eq!(p.node_type(), "p");
    let footnote = p
        .children()
        .iter()
        .find(|n| n.node_type() == "footnote")
        .unwrap();
    assert_eq!(footnote.text_content(), "note");
}

#[test]
fn test_footnotes_numbered_across_document() {
    let ast = parse("a((一))\n\n# b((二))\n\n- c((三))");
    let numbers: Vec<&str> = ast
        .iter()
        .flat_map(|n| n.find_all("footnote"))
        .filter_map(|f| f.attribute("number"))
        .collect();
    assert_eq!(numbers, vec!["1", "2", "3"]);
}

#[test]
fn test_ruby_in_paragraph() {
    let ast = parse("｜東京《とうきょう》へ行く");
    let ruby = &ast[0].children()[0];
    assert_eq!(ruby.node_type(), "ruby");
    assert_eq!(ruby.attribute("reading"), Some("とうきょう"));
}

// ============================================================================
// Limits and Configuration Tests
// ============================================================================

#[test]
fn test_input_too_large() {
    let parser = Parser::new().with_config(ParserConfig::default().with_max_input_bytes(8));
    let err = parser.parse("123456789").unwrap_err();
    assert_eq!(
        err,
        ParseError::InputTooLarge {
            bytes: 9,
            limit: 8
        }
    );
}

#[test]
fn test_unclosed_block_span_runs_to_end_of_document() {
    let input = ";;;枠線;;;\na\nbc";
    let result = Parser::new().parse_with_recovery(input).unwrap();
    let diagnostic = result.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.span, Span::new(0, input.len() as u32));
    assert_eq!(diagnostic.line, 1);
}

#[test]
fn test_input_limit_cannot_exceed_span_range() {
    let config = ParserConfig {
        max_input_bytes: usize::MAX,
        ..ParserConfig::default()
    };
    let parser = Parser::new().with_config(config);
    assert!(parser.parse("# ok").is_ok());
    assert_eq!(
        ParserConfig::default().with_max_input_bytes(usize::MAX).max_input_bytes,
        u32::MAX as usize
    );
}

#[test]
fn test_too_many_lines() {
    let parser = Parser::new().with_config(ParserConfig::default().with_max_lines(2));
    assert!(matches!(
        parser.parse("a\nb\nc"),
        Err(ParseError::TooManyLines { lines: 3, limit: 2 })
    ));
    assert!(parser.parse("a\nb").is_ok());
}

#[test]
fn test_indent_width_from_config() {
    let config = ParserConfig::from_toml_str("indent_width = 4").unwrap();
    let parser = Parser::new().with_config(config);
    let ast = parser.parse("- a\n  - b").unwrap();
    // Two spaces is below one level at width 4.
    assert_eq!(ast[0].children().len(), 2);
}

#[test]
fn test_null_sink_still_produces_ast() {
    let mut sink = kumihan_core::NullSink;
    let ast = Parser::new()
        .parse_with_sink(";;;未知;;;\n```\nx", &mut sink)
        .unwrap();
    assert_eq!(types(&ast), vec!["p", "pre"]);
}

#[test]
fn test_parser_is_shareable_across_threads() {
    let parser = &Parser::new();
    let inputs = ["# a", "- b\n  - c", ";;;太字;;; d ;;;"];
    let expected: Vec<_> = inputs.iter().map(|i| parser.parse(i).unwrap()).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|&input| scope.spawn(move || parser.parse(input).unwrap()))
            .collect();
        for (handle, want) in handles.into_iter().zip(&expected) {
            assert_eq!(&handle.join().unwrap(), want);
        }
    });
}
