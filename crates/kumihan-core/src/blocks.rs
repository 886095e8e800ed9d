//! Line-prefix blocks: headings, blockquotes, code fences, rules and
//! paragraphs.

use crate::ast::{Node, NodeBuilder};
use crate::error::Diagnostic;
use crate::keyword;
use crate::lexer::Line;
use crate::lists;
use crate::parser::{Context, Parsed};

const FENCE: &str = "```";

/// Deepest heading level; deeper prefixes fold into it.
pub const MAX_HEADING_LEVEL: usize = 5;

/// Whether `line` starts a construct that ends a running paragraph.
pub(crate) fn is_block_start(line: &Line, cx: &Context) -> bool {
    let text = line.unindented();
    keyword::opener_name(text).is_some()
        || text.starts_with(FENCE)
        || text.starts_with('>')
        || heading_level(text).is_some()
        || is_rule(text)
        || lists::list_marker(line, cx.config.indent_width).is_some()
}

/// Number of leading `#` when followed by whitespace or end of line.
fn heading_level(text: &str) -> Option<usize> {
    let hashes = text.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 {
        return None;
    }
    match text.as_bytes().get(hashes) {
        None | Some(b' ') | Some(b'\t') => Some(hashes),
        Some(_) => None,
    }
}

fn is_rule(text: &str) -> bool {
    let trimmed = text.trim_end();
    trimmed.len() >= 3 && trimmed.bytes().all(|b| b == b'-')
}

pub(crate) fn parse_code_fence(lines: &[Line], start: usize, cx: &mut Context) -> Option<Parsed> {
    let open = lines[start];
    let lang = open.unindented().strip_prefix(FENCE)?.trim();

    let mut body: Vec<&str> = Vec::new();
    let mut i = start + 1;
    let mut closed = false;
    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if line.trimmed() == FENCE {
            closed = true;
            break;
        }
        body.push(line.text);
    }

    if !closed {
        let span = open.span.through(lines[i - 1].span);
        cx.report(Diagnostic::unterminated_code_fence(span, open.number));
    }

    let mut builder = NodeBuilder::new("pre").css_class("code-block");
    if !lang.is_empty() {
        builder = builder.attribute("data-lang", lang);
    }
    let node = builder.content(body.join("\n")).build();
    Some(Parsed::one(node, i - start))
}

pub(crate) fn parse_heading(lines: &[Line], start: usize, cx: &mut Context) -> Option<Parsed> {
    let text = lines[start].unindented();
    let hashes = heading_level(text)?;
    let level = hashes.min(MAX_HEADING_LEVEL);
    let content = cx.scan(text[hashes..].trim());
    let node = NodeBuilder::new(format!("h{}", level))
        .id(cx.next_heading_id())
        .content(content)
        .build();
    Some(Parsed::one(node, 1))
}

pub(crate) fn parse_rule(lines: &[Line], start: usize, _cx: &mut Context) -> Option<Parsed> {
    if !is_rule(lines[start].unindented()) {
        return None;
    }
    Some(Parsed::one(NodeBuilder::new("hr").build(), 1))
}

/// Contiguous `>` lines. An empty quoted line separates paragraphs.
pub(crate) fn parse_blockquote(lines: &[Line], start: usize, cx: &mut Context) -> Option<Parsed> {
    if !lines[start].unindented().starts_with('>') {
        return None;
    }

    let mut paragraphs = Vec::new();
    let mut pending: Vec<&str> = Vec::new();
    let mut i = start;

    while i < lines.len() {
        let Some(quoted) = lines[i].unindented().strip_prefix('>') else {
            break;
        };
        i += 1;
        let quoted = quoted.strip_prefix(' ').unwrap_or(quoted).trim_end();
        if quoted.is_empty() {
            flush_paragraph(&mut pending, &mut paragraphs, cx);
        } else {
            pending.push(quoted);
        }
    }
    flush_paragraph(&mut pending, &mut paragraphs, cx);

    let node = NodeBuilder::new("blockquote").content(paragraphs).build();
    Some(Parsed::one(node, i - start))
}

fn flush_paragraph(pending: &mut Vec<&str>, out: &mut Vec<Node>, cx: &mut Context) {
    if pending.is_empty() {
        return;
    }
    let content = cx.scan(&pending.join("\n"));
    out.push(NodeBuilder::new("p").content(content).build());
    pending.clear();
}

/// Non-blank lines up to a blank line or the start of another block.
///
/// The first line is always taken, so a stray delimiter that no other
/// parser claimed still ends up as text.
pub(crate) fn parse_paragraph(lines: &[Line], start: usize, cx: &mut Context) -> Parsed {
    let mut body = vec![lines[start].trimmed()];
    let mut i = start + 1;
    while i < lines.len() {
        let line = &lines[i];
        if line.is_blank() || is_block_start(line, cx) {
            break;
        }
        body.push(line.trimmed());
        i += 1;
    }

    let content = cx.scan(&body.join("\n"));
    Parsed::one(NodeBuilder::new("p").content(content).build(), i - start)
}
