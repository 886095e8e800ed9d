//! Indentation-based lists.
//!
//! A run of `- item` / `1. item` lines becomes one `ul` or `ol`. Every
//! `indent_width` columns of leading whitespace is one nesting level; a jump
//! of several levels at once is clamped to one level deeper than the
//! previous item.
//!
//! The run ends at a blank line, any line shallower than the list itself, an
//! item of the other family at the top level, or a line that starts another
//! block. Any other line is appended to the previous item as a paragraph.

use crate::ast::{Node, NodeBuilder, NodeContent};
use crate::blocks;
use crate::error::Diagnostic;
use crate::lexer::Line;
use crate::parser::{Context, Parsed};

/// Longest accepted ordinal; longer digit runs are plain text.
pub const MAX_LIST_MARKER_DIGITS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered => "ul",
            ListKind::Ordered => "ol",
        }
    }
}

/// A recognised list item prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker<'a> {
    pub kind: ListKind,
    /// Absolute nesting level from indentation.
    pub level: usize,
    pub number: Option<u64>,
    /// Item text after the marker.
    pub content: &'a str,
}

/// Recognise `- text` or `N. text` after optional indentation.
pub fn list_marker<'a>(line: &Line<'a>, indent_width: usize) -> Option<ListMarker<'a>> {
    let indent_width = indent_width.max(1);
    let level = line.indent_width(indent_width) / indent_width;
    let text = line.unindented();

    if let Some(content) = text.strip_prefix("- ") {
        return Some(ListMarker {
            kind: ListKind::Unordered,
            level,
            number: None,
            content: content.trim(),
        });
    }

    let digits = text.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > MAX_LIST_MARKER_DIGITS {
        return None;
    }
    let content = text[digits..].strip_prefix(". ")?;
    Some(ListMarker {
        kind: ListKind::Ordered,
        level,
        number: text[..digits].parse().ok(),
        content: content.trim(),
    })
}

struct Entry<'a> {
    depth: usize,
    kind: ListKind,
    number: Option<u64>,
    inlines: Vec<Node>,
    continuation: Vec<Node>,
    pending: Vec<&'a str>,
}

impl<'a> Entry<'a> {
    fn flush(&mut self, cx: &mut Context) {
        if self.pending.is_empty() {
            return;
        }
        let content = cx.scan(&self.pending.join("\n"));
        self.continuation.push(NodeBuilder::new("p").content(content).build());
        self.pending.clear();
    }
}

pub(crate) fn parse_list(lines: &[Line], start: usize, cx: &mut Context) -> Option<Parsed> {
    let indent_width = cx.config.indent_width.max(1);
    let first = list_marker(&lines[start], indent_width)?;
    let base_level = first.level;
    let root_kind = first.kind;

    let mut entries: Vec<Entry> = Vec::with_capacity(8);
    let mut i = start;

    while i < lines.len() {
        let line = &lines[i];
        if line.is_blank() {
            break;
        }

        if let Some(marker) = list_marker(line, indent_width) {
            if marker.level < base_level {
                break;
            }
            let depth = marker.level - base_level;
            if depth == 0 && marker.kind != root_kind {
                break;
            }
            let depth = match entries.last_mut() {
                Some(prev) => {
                    prev.flush(cx);
                    depth.min(prev.depth + 1)
                }
                None => 0,
            };
            entries.push(Entry {
                depth,
                kind: marker.kind,
                number: marker.number,
                inlines: cx.scan_inlines(marker.content),
                continuation: Vec::new(),
                pending: Vec::new(),
            });
            i += 1;
            continue;
        }

        if blocks::is_block_start(line, cx) {
            break;
        }

        // Only reachable after at least one item. A line shallower than the
        // list itself is left for the caller.
        let Some(prev) = entries.last_mut() else {
            break;
        };
        let level = line.indent_width(indent_width) / indent_width;
        if level < base_level {
            break;
        }
        let item_level = base_level + prev.depth;
        if level <= item_level {
            cx.report(Diagnostic::malformed_list_continuation(line.span, line.number));
        }
        prev.pending.push(line.trimmed());
        i += 1;
    }

    if let Some(last) = entries.last_mut() {
        last.flush(cx);
    }

    let consumed = i - start;
    let mut cursor = 0;
    let node = build_list(&mut entries, &mut cursor, 0);
    log::trace!(
        "list of {} items over {} lines at line {}",
        entries.len(),
        consumed,
        lines[start].number
    );
    Some(Parsed::one(node, consumed))
}

/// Build one `ul`/`ol` from `entries[*cursor..]` at `depth`.
fn build_list(entries: &mut [Entry], cursor: &mut usize, depth: usize) -> Node {
    let kind = entries[*cursor].kind;
    let start_number = entries[*cursor].number;
    let mut items = Vec::new();

    while *cursor < entries.len() {
        let entry = &mut entries[*cursor];
        if entry.depth < depth || (entry.depth == depth && entry.kind != kind) {
            break;
        }
        *cursor += 1;

        let mut children = std::mem::take(&mut entry.inlines);
        let mut nested = std::mem::take(&mut entry.continuation);
        while *cursor < entries.len() && entries[*cursor].depth > depth {
            nested.push(build_list(entries, cursor, depth + 1));
        }

        let content = if nested.is_empty() {
            NodeContent::from_inlines(children)
        } else {
            children.extend(nested);
            NodeContent::Children(children)
        };
        items.push(NodeBuilder::new("li").content(content).build());
    }

    let mut builder = NodeBuilder::new(kind.tag());
    if let (ListKind::Ordered, Some(n)) = (kind, start_number) {
        if n != 1 {
            builder = builder.attribute("start", n.to_string());
        }
    }
    builder.content(items).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::split_lines;

    #[test]
    fn recognises_bullets_and_ordinals() {
        let lines = split_lines("- a\n  12. b\n-x\n1.x\n1234567890. too long");
        let m = list_marker(&lines[0], 2).unwrap();
        assert_eq!((m.kind, m.level, m.content), (ListKind::Unordered, 0, "a"));
        let m = list_marker(&lines[1], 2).unwrap();
        assert_eq!((m.kind, m.level, m.number), (ListKind::Ordered, 1, Some(12)));
        assert!(list_marker(&lines[2], 2).is_none());
        assert!(list_marker(&lines[3], 2).is_none());
        assert!(list_marker(&lines[4], 2).is_none());
    }

    #[test]
    fn tab_is_one_level() {
        let lines = split_lines("\t- a");
        assert_eq!(list_marker(&lines[0], 2).unwrap().level, 1);
    }
}
