//! Keyword markers: `;;;name;;; content ;;;`.
//!
//! Two shapes are recognised on a line that starts with `;;;`:
//!
//! - single line: `;;;太字;;; text ;;;`
//! - block: `;;;枠線;;;` followed by content lines and a closing line that
//!   is exactly `;;;`
//!
//! Markers do not nest. Inside an open block, another `;;;name;;;` line is
//! plain content and the first bare `;;;` closes the open block. A block
//! still open at end of document is closed there.

use crate::ast::{Node, NodeBuilder, NodeContent};
use crate::error::Diagnostic;
use crate::lexer::Line;
use crate::markers::{MarkerDefinition, COMPOUND_SEPARATORS};
use crate::parser::{Context, Parsed};

pub const DELIMITER: &str = ";;;";

/// The marker name if `text` opens a marker, resolvable or not.
pub fn opener_name(text: &str) -> Option<&str> {
    let after_open = text.trim_start().strip_prefix(DELIMITER)?;
    let end = after_open.find(DELIMITER)?;
    let name = after_open[..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

pub(crate) fn parse_marker(lines: &[Line], start: usize, cx: &mut Context) -> Option<Parsed> {
    let line = lines[start];
    let after_open = line.text.trim_start().strip_prefix(DELIMITER)?;
    let name_end = after_open.find(DELIMITER)?;
    let name = after_open[..name_end].trim();
    if name.is_empty() {
        return None;
    }
    let rest = after_open[name_end + DELIMITER.len()..].trim();

    let definitions = match resolve(name, cx) {
        Some(defs) => defs,
        None => {
            log::debug!("line {}: unknown marker '{}'", line.number, name);
            cx.report(Diagnostic::unknown_marker(name, line.span, line.number));
            let content = cx.scan(line.trimmed());
            return Some(Parsed::one(NodeBuilder::new("p").content(content).build(), 1));
        }
    };

    if let Some(body) = rest.strip_suffix(DELIMITER) {
        let content = cx.scan(body.trim());
        return Some(Parsed::one(build(&definitions, content, cx), 1));
    }

    let mut body: Vec<&str> = Vec::with_capacity(8);
    if !rest.is_empty() {
        body.push(rest);
    }

    let mut i = start + 1;
    let mut closed = false;
    while i < lines.len() {
        let current = lines[i];
        i += 1;
        if current.trimmed() == DELIMITER {
            closed = true;
            break;
        }
        if let Some(inner) = opener_name(current.text) {
            cx.report(Diagnostic::nested_marker(
                inner,
                name,
                current.span,
                current.number,
            ));
        }
        body.push(current.text);
    }

    if !closed {
        let span = line.span.through(lines[i - 1].span);
        cx.report(Diagnostic::unterminated_marker(name, span, line.number));
    }

    let text = body.join("\n");
    let content = cx.scan(text.trim());
    Some(Parsed::one(build(&definitions, content, cx), i - start))
}

/// Resolve every part of a possibly compound name, outermost first.
///
/// Lookups other than `MarkerTable` are not validated, so a definition with
/// a blank tag counts as unresolved.
fn resolve(name: &str, cx: &Context) -> Option<Vec<MarkerDefinition>> {
    name.split(COMPOUND_SEPARATORS)
        .map(str::trim)
        .map(|part| {
            if part.is_empty() {
                return None;
            }
            cx.markers
                .marker_definition(part)
                .filter(|def| !def.tag.trim().is_empty())
                .cloned()
        })
        .collect()
}

fn build(definitions: &[MarkerDefinition], content: NodeContent, cx: &mut Context) -> Node {
    // Heading ids are handed out outermost first.
    let ids: Vec<Option<String>> = definitions
        .iter()
        .map(|def| {
            (is_heading_tag(def.tag.trim()) && !def.attributes.contains_key("id"))
                .then(|| cx.next_heading_id())
        })
        .collect();

    let mut content = Some(content);
    let mut node: Option<Node> = None;
    for (def, id) in definitions.iter().zip(ids).rev() {
        let inner = match node.take() {
            Some(inner) => NodeContent::Children(vec![inner]),
            None => content.take().unwrap_or_default(),
        };
        let mut builder = NodeBuilder::new(def.tag.trim()).attributes(&def.attributes);
        if let Some(class) = &def.class {
            builder = builder.css_class(class.as_str());
        }
        if let Some(summary) = &def.summary {
            builder = builder.attribute("summary", summary.as_str());
        }
        if let Some(id) = id {
            builder = builder.id(id);
        }
        node = Some(builder.content(inner).build());
    }
    node.unwrap_or_else(|| {
        NodeBuilder::new("span")
            .content(content.unwrap_or_default())
            .build()
    })
}

fn is_heading_tag(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5")
}
