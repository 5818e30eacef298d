//! Heading-bounded sectionizing.
//!
//! Splits a styled fragment into ordered, page-break-safe sections. Every
//! heading starts a new section that carries the heading together with the
//! content that follows it, so pagination can never separate the two.
//! Content appearing before the first heading becomes its own leading,
//! heading-less section rather than being dropped.

use crate::model::{Fragment, Section};

/// Partition a fragment into ordered sections.
///
/// Sections hold deep copies of the fragment's nodes. Concatenating the
/// sections' nodes in order reproduces the fragment's node sequence
/// exactly.
pub fn sectionize(fragment: &Fragment) -> Vec<Section> {
    let nodes = &fragment.nodes;
    if nodes.is_empty() {
        return Vec::new();
    }

    let heading_positions: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is_heading())
        .map(|(i, _)| i)
        .collect();

    if heading_positions.is_empty() {
        return vec![Section::new(0, nodes.clone())];
    }

    let mut sections = Vec::new();

    if heading_positions[0] > 0 {
        sections.push(Section::new(0, nodes[..heading_positions[0]].to_vec()));
    }

    for (i, &start) in heading_positions.iter().enumerate() {
        let end = heading_positions
            .get(i + 1)
            .copied()
            .unwrap_or(nodes.len());
        let index = sections.len();
        sections.push(Section::new(index, nodes[start..end].to_vec()));
    }

    log::debug!(
        "sectionized {} nodes into {} sections ({} headings)",
        nodes.len(),
        sections.len(),
        heading_positions.len()
    );

    sections
}
