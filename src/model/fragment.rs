//! Styled fragment tree types.

use serde::{Deserialize, Serialize};

/// Kind of a content node, mirroring the block structure of rendered
/// markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// A heading with level 1-6.
    Heading {
        /// Heading level (1 = `h1`)
        level: u8,
    },

    /// A paragraph of inline text
    Paragraph,

    /// An ordered or unordered list
    List {
        /// Whether the list is numbered
        ordered: bool,
        /// Starting number for ordered lists
        start: u64,
    },

    /// A single list item
    ListItem,

    /// A block quote
    Blockquote,

    /// A fenced or indented code block
    CodeBlock {
        /// Language hint from the fence info string
        language: Option<String>,
    },

    /// A table
    Table,

    /// A table row
    TableRow {
        /// Whether this row came from the table head
        header: bool,
    },

    /// A single table cell
    TableCell,

    /// An image reference
    Image {
        /// Source URL or path (never fetched by the pipeline)
        source: String,
        /// Alternative text
        alt: String,
    },

    /// A horizontal rule
    Rule,
}

impl NodeKind {
    /// Heading level, if this node is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            NodeKind::Heading { level } => Some(*level),
            _ => None,
        }
    }

    /// Check if this node is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, NodeKind::Heading { .. })
    }
}

/// A run of inline text with formatting flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inline {
    /// Text content; `\n` marks a hard line break
    pub text: String,

    /// Bold (strong emphasis)
    pub bold: bool,

    /// Italic (emphasis)
    pub italic: bool,

    /// Inline code styling
    pub code: bool,

    /// Strikethrough
    pub strike: bool,

    /// Link target, if the run is inside an anchor
    pub link: Option<String>,
}

impl Inline {
    /// Create an unformatted text run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a hard line break run.
    pub fn hard_break() -> Self {
        Self::plain("\n")
    }

    /// Check if the run is a hard line break.
    pub fn is_break(&self) -> bool {
        self.text == "\n" && !self.code
    }
}

/// Presentation attributes computed for a node by the style rule table.
///
/// Font sizes are typographic points; spacing and padding are points as
/// well and are converted to pixels exactly once, inside the rasterizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedStyle {
    /// Font size in points
    pub font_size_pt: f32,

    /// Line height as a multiple of the font size
    pub line_height: f32,

    /// Bold text
    pub bold: bool,

    /// Italic text
    pub italic: bool,

    /// Monospace font
    pub monospace: bool,

    /// Vertical space before the block, in points
    pub space_before_pt: f32,

    /// Vertical space after the block, in points
    pub space_after_pt: f32,

    /// Left padding in points (list indent, quote inset, code padding)
    pub pad_left_pt: f32,

    /// Right padding in points
    pub pad_right_pt: f32,

    /// Top padding in points
    pub pad_top_pt: f32,

    /// Bottom padding in points
    pub pad_bottom_pt: f32,

    /// Background fill, RGB
    pub background: Option<[u8; 3]>,

    /// Left border width in points (0 = no border)
    pub border_left_pt: f32,

    /// Border color, RGB
    pub border_color: [u8; 3],

    /// Page-break hint: avoid breaking directly after this block
    pub avoid_break_after: bool,

    /// Page-break hint: avoid breaking inside this block
    pub avoid_break_inside: bool,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            font_size_pt: 12.0,
            line_height: 1.6,
            bold: false,
            italic: false,
            monospace: false,
            space_before_pt: 0.0,
            space_after_pt: 10.0,
            pad_left_pt: 0.0,
            pad_right_pt: 0.0,
            pad_top_pt: 0.0,
            pad_bottom_pt: 0.0,
            background: None,
            border_left_pt: 0.0,
            border_color: [204, 204, 204],
            avoid_break_after: false,
            avoid_break_inside: false,
        }
    }
}

/// A styled block-level node in the fragment tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    /// Node kind and kind-specific data
    pub kind: NodeKind,

    /// Computed presentation attributes
    pub style: ComputedStyle,

    /// Inline text runs (empty for pure container nodes)
    pub inlines: Vec<Inline>,

    /// Child blocks (list items, quoted blocks, table rows/cells)
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// Create a node with default styling.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            style: ComputedStyle::default(),
            inlines: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a node with the given style.
    pub fn with_style(kind: NodeKind, style: ComputedStyle) -> Self {
        Self {
            kind,
            style,
            inlines: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Check if this node is a heading.
    pub fn is_heading(&self) -> bool {
        self.kind.is_heading()
    }

    /// Concatenated text of this node's inline runs.
    pub fn inline_text(&self) -> String {
        self.inlines.iter().map(|run| run.text.as_str()).collect()
    }

    /// Plain text of this node and all descendants.
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        let own = self.inline_text();
        if !own.is_empty() {
            parts.push(own);
        }
        for child in &self.children {
            let text = child.plain_text();
            if !text.is_empty() {
                parts.push(text);
            }
        }
        parts.join(" ")
    }

    /// Whether the node carries any visible content.
    pub fn has_content(&self) -> bool {
        match &self.kind {
            NodeKind::Rule | NodeKind::Image { .. } => true,
            _ => {
                self.inlines.iter().any(|run| !run.text.trim().is_empty())
                    || self.children.iter().any(|child| child.has_content())
            }
        }
    }
}

/// An ordered tree of styled content nodes, produced by the stylist.
///
/// Immutable once produced; sections take deep copies, so nothing that
/// happens during rasterization can reach back into the fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Top-level blocks in document order
    pub nodes: Vec<ContentNode>,
}

impl Fragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Number of top-level nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the fragment holds any visible content.
    pub fn is_empty(&self) -> bool {
        !self.nodes.iter().any(|node| node.has_content())
    }

    /// Number of top-level heading nodes.
    pub fn heading_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_heading()).count()
    }

    /// Plain text of the whole fragment.
    pub fn plain_text(&self) -> String {
        self.nodes
            .iter()
            .map(|node| node.plain_text())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_node(kind: NodeKind, text: &str) -> ContentNode {
        let mut node = ContentNode::new(kind);
        node.inlines.push(Inline::plain(text));
        node
    }

    #[test]
    fn test_heading_level() {
        let h2 = NodeKind::Heading { level: 2 };
        assert!(h2.is_heading());
        assert_eq!(h2.heading_level(), Some(2));
        assert_eq!(NodeKind::Paragraph.heading_level(), None);
    }

    #[test]
    fn test_plain_text_recurses() {
        let mut list = ContentNode::new(NodeKind::List {
            ordered: false,
            start: 1,
        });
        list.children
            .push(text_node(NodeKind::ListItem, "first"));
        list.children
            .push(text_node(NodeKind::ListItem, "second"));
        assert_eq!(list.plain_text(), "first second");
    }

    #[test]
    fn test_fragment_emptiness() {
        let mut fragment = Fragment::new();
        assert!(fragment.is_empty());

        fragment.nodes.push(text_node(NodeKind::Paragraph, "   "));
        assert!(fragment.is_empty());

        fragment.nodes.push(text_node(NodeKind::Paragraph, "hi"));
        assert!(!fragment.is_empty());
    }

    #[test]
    fn test_rule_counts_as_content() {
        let mut fragment = Fragment::new();
        fragment.nodes.push(ContentNode::new(NodeKind::Rule));
        assert!(!fragment.is_empty());
    }

    #[test]
    fn test_hard_break_run() {
        assert!(Inline::hard_break().is_break());
        assert!(!Inline::plain("text").is_break());
    }
}
