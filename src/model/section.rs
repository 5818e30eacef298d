//! Heading-bounded section type.

use super::ContentNode;
use serde::{Deserialize, Serialize};

/// A heading-bounded, page-break-safe run of content nodes.
///
/// Sections own deep copies of their nodes, never references into the
/// source fragment, so rasterization cannot corrupt the original. The
/// first node is the bounding heading, except for the single leading
/// section that may exist when content precedes the first heading (or
/// when the document has no headings at all).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Zero-based position in document order
    pub index: usize,

    /// Owned copies of the section's nodes
    pub nodes: Vec<ContentNode>,
}

impl Section {
    /// Create a section from owned nodes.
    pub fn new(index: usize, nodes: Vec<ContentNode>) -> Self {
        Self { index, nodes }
    }

    /// The bounding heading node, if this section starts with one.
    pub fn heading(&self) -> Option<&ContentNode> {
        self.nodes.first().filter(|node| node.is_heading())
    }

    /// Whether this is a leading, heading-less section.
    pub fn is_leading(&self) -> bool {
        self.heading().is_none()
    }

    /// Title text taken from the bounding heading.
    pub fn title(&self) -> Option<String> {
        self.heading().map(|node| node.inline_text())
    }

    /// Number of nodes in the section.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Plain text of the whole section.
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
    use crate::model::{Inline, NodeKind};

    fn heading(level: u8, text: &str) -> ContentNode {
        let mut node = ContentNode::new(NodeKind::Heading { level });
        node.inlines.push(Inline::plain(text));
        node
    }

    #[test]
    fn test_section_title() {
        let section = Section::new(0, vec![heading(1, "Intro")]);
        assert!(!section.is_leading());
        assert_eq!(section.title(), Some("Intro".to_string()));
    }

    #[test]
    fn test_leading_section() {
        let mut para = ContentNode::new(NodeKind::Paragraph);
        para.inlines.push(Inline::plain("preamble"));
        let section = Section::new(0, vec![para]);
        assert!(section.is_leading());
        assert_eq!(section.title(), None);
    }
}
