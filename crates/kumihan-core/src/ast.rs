//! Document tree types produced by the parser.
//!
//! The tree is uniform: every element is a [`Node`] with a tag
//! name, a tagged [`NodeContent`] and a string attribute map. A parsed
//! document is an [`Ast`], the ordered list of top-level nodes, with no
//! implicit root wrapper.
//!
//! Nodes are created through [`NodeBuilder`] and are immutable afterwards.

use std::collections::BTreeMap;

/// Tag name used for plain inline text fragments.
pub const TEXT: &str = "text";

/// The ordered top-level nodes of one parsed document.
pub type Ast = Vec<Node>;

/// Attribute map. Keys are unique and iteration order is stable.
pub type Attributes = BTreeMap<String, String>;

/// Payload of a node: literal text or an ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Text(String),
    Children(Vec<Node>),
}

impl NodeContent {
    /// Collapse inline scanner output into node content.
    ///
    /// A single plain-text fragment becomes `Text`, no fragments become an
    /// empty `Text`, anything else is kept as `Children`.
    pub fn from_inlines(mut inlines: Vec<Node>) -> Self {
        match inlines.len() {
            0 => NodeContent::Text(String::new()),
            1 if inlines[0].is_text() => match inlines.pop() {
                Some(Node {
                    content: NodeContent::Text(text),
                    ..
                }) => NodeContent::Text(text),
                Some(other) => NodeContent::Children(vec![other]),
                None => NodeContent::Text(String::new()),
            },
            _ => NodeContent::Children(inlines),
        }
    }
}

impl Default for NodeContent {
    fn default() -> Self {
        NodeContent::Children(Vec::new())
    }
}

impl From<String> for NodeContent {
    fn from(text: String) -> Self {
        NodeContent::Text(text)
    }
}

impl From<&str> for NodeContent {
    fn from(text: &str) -> Self {
        NodeContent::Text(text.to_string())
    }
}

impl From<Vec<Node>> for NodeContent {
    fn from(children: Vec<Node>) -> Self {
        NodeContent::Children(children)
    }
}

/// A single element of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    node_type: String,
    content: NodeContent,
    attributes: Attributes,
}

impl Node {
    /// Shorthand for a plain text fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Node {
            node_type: TEXT.to_string(),
            content: NodeContent::Text(text.into()),
            attributes: Attributes::new(),
        }
    }

    /// The tag name, never empty.
    #[inline]
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    #[inline]
    pub fn content(&self) -> &NodeContent {
        &self.content
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether this is a plain text fragment (see [`TEXT`]).
    #[inline]
    pub fn is_text(&self) -> bool {
        self.node_type == TEXT && matches!(self.content, NodeContent::Text(_))
    }

    /// The literal text of a leaf node.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            NodeContent::Text(text) => Some(text),
            NodeContent::Children(_) => None,
        }
    }

    /// Children of a composite node; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match &self.content {
            NodeContent::Children(children) => children,
            NodeContent::Text(_) => &[],
        }
    }

    /// All text below this node, concatenated in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.content {
            NodeContent::Text(text) => out.push_str(text),
            NodeContent::Children(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Pre-order iterator over this node's descendants (excluding itself).
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Node> = self.children().iter().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// Descendants with the given tag name.
    pub fn find_all<'n>(&'n self, node_type: &'n str) -> impl Iterator<Item = &'n Node> + 'n {
        self.descendants().filter(move |n| n.node_type == node_type)
    }
}

/// Iterator returned by [`Node::descendants`].
pub struct Descendants<'n> {
    stack: Vec<&'n Node>,
}

impl<'n> Iterator for Descendants<'n> {
    type Item = &'n Node;

    fn next(&mut self) -> Option<&'n Node> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Fluent constructor for [`Node`].
///
/// `build` takes the builder by value, so a builder cannot be reused once it
/// has produced its node.
///
/// ```rust
/// use kumihan_core::ast::NodeBuilder;
///
/// let node = NodeBuilder::new("div")
///     .css_class("box")
///     .id("intro")
///     .content("hello")
///     .build();
///
/// assert_eq!(node.node_type(), "div");
/// assert_eq!(node.attribute("class"), Some("box"));
/// assert_eq!(node.as_text(), Some("hello"));
/// ```
#[derive(Debug)]
#[must_use = "a builder does nothing until `build` is called"]
pub struct NodeBuilder {
    node_type: String,
    content: NodeContent,
    attributes: Attributes,
}

impl NodeBuilder {
    /// Start a node with the given tag name.
    ///
    /// # Panics
    ///
    /// Panics if `node_type` is empty. Tag names coming from configuration
    /// are validated when the marker table is loaded.
    pub fn new(node_type: impl Into<String>) -> Self {
        let node_type = node_type.into();
        assert!(!node_type.is_empty(), "node type must not be empty");
        Self {
            node_type,
            content: NodeContent::default(),
            attributes: Attributes::new(),
        }
    }

    pub fn content(mut self, content: impl Into<NodeContent>) -> Self {
        self.content = content.into();
        self
    }

    /// Set an attribute, replacing any previous value for `key`.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set several attributes in order; later keys win.
    pub fn attributes<K, V>(mut self, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in attributes {
            self.attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn css_class(self, name: impl Into<String>) -> Self {
        self.attribute("class", name)
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attribute("id", id)
    }

    pub fn style(self, style: impl Into<String>) -> Self {
        self.attribute("style", style)
    }

    pub fn build(self) -> Node {
        Node {
            node_type: self.node_type,
            content: self.content,
            attributes: self.attributes,
        }
    }
}

/// A heading collected by [`headings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    pub level: u8,
    pub id: Option<String>,
    pub text: String,
}

/// Collect `h1`..`h5` nodes anywhere in the tree, in document order.
pub fn headings(ast: &[Node]) -> Vec<HeadingEntry> {
    let mut out = Vec::new();
    for node in ast {
        push_heading(node, &mut out);
        for descendant in node.descendants() {
            push_heading(descendant, &mut out);
        }
    }
    out
}

fn push_heading(node: &Node, out: &mut Vec<HeadingEntry>) {
    if let Some(level) = heading_level(node.node_type()) {
        out.push(HeadingEntry {
            level,
            id: node.attribute("id").map(str::to_string),
            text: node.text_content(),
        });
    }
}

fn heading_level(node_type: &str) -> Option<u8> {
    match node_type.strip_prefix('h')?.parse::<u8>() {
        Ok(level @ 1..=5) => Some(level),
        _ => None,
    }
}
