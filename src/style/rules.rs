//! The style rule table.

use crate::model::{ComputedStyle, NodeKind};

const CODE_BACKGROUND: [u8; 3] = [245, 245, 245];
const QUOTE_BORDER: [u8; 3] = [204, 204, 204];

/// Presentation rules keyed by element kind.
///
/// A pure lookup table: resolving a kind clones the matching rule, so
/// styling never mutates shared state. The defaults reproduce the
/// document stylesheet the export has always used (heading scale from
/// 24pt down to 11pt, 12pt body text at 1.6 line height, shaded
/// monospace code blocks, bordered italic quotes).
#[derive(Debug, Clone)]
pub struct StyleSheet {
    /// Paragraph text
    pub body: ComputedStyle,

    /// Heading styles, indexed by level - 1
    pub headings: [ComputedStyle; 6],

    /// List container
    pub list: ComputedStyle,

    /// Single list item
    pub list_item: ComputedStyle,

    /// Block quote container
    pub blockquote: ComputedStyle,

    /// Fenced/indented code block
    pub code_block: ComputedStyle,

    /// Table container
    pub table: ComputedStyle,

    /// Table header row
    pub table_header: ComputedStyle,

    /// Table body row
    pub table_row: ComputedStyle,

    /// Table cell
    pub table_cell: ComputedStyle,

    /// Image block
    pub image: ComputedStyle,

    /// Horizontal rule
    pub rule: ComputedStyle,
}

impl Default for StyleSheet {
    fn default() -> Self {
        let body = ComputedStyle::default();

        let heading_sizes = [24.0, 20.0, 16.0, 14.0, 12.0, 11.0];
        let headings = heading_sizes.map(|size| ComputedStyle {
            font_size_pt: size,
            bold: true,
            space_before_pt: 16.0,
            space_after_pt: 8.0,
            avoid_break_after: true,
            avoid_break_inside: true,
            ..ComputedStyle::default()
        });

        Self {
            body: body.clone(),
            headings,
            list: ComputedStyle {
                pad_left_pt: 20.0,
                space_after_pt: 10.0,
                ..body.clone()
            },
            list_item: ComputedStyle {
                space_after_pt: 2.0,
                ..body.clone()
            },
            blockquote: ComputedStyle {
                italic: true,
                border_left_pt: 4.0,
                border_color: QUOTE_BORDER,
                pad_left_pt: 15.0,
                space_after_pt: 10.0,
                avoid_break_inside: true,
                ..body.clone()
            },
            code_block: ComputedStyle {
                font_size_pt: 10.0,
                monospace: true,
                background: Some(CODE_BACKGROUND),
                pad_left_pt: 10.0,
                pad_right_pt: 10.0,
                pad_top_pt: 10.0,
                pad_bottom_pt: 10.0,
                space_after_pt: 10.0,
                avoid_break_inside: true,
                ..body.clone()
            },
            table: ComputedStyle {
                space_after_pt: 16.0,
                avoid_break_inside: true,
                ..body.clone()
            },
            table_header: ComputedStyle {
                bold: true,
                background: Some(CODE_BACKGROUND),
                ..body.clone()
            },
            table_row: body.clone(),
            table_cell: ComputedStyle {
                pad_left_pt: 8.0,
                pad_right_pt: 8.0,
                pad_top_pt: 8.0,
                pad_bottom_pt: 8.0,
                space_after_pt: 0.0,
                ..body.clone()
            },
            image: ComputedStyle {
                space_after_pt: 10.0,
                ..body.clone()
            },
            rule: ComputedStyle {
                space_before_pt: 8.0,
                space_after_pt: 8.0,
                ..body
            },
        }
    }
}

impl StyleSheet {
    /// Create the default rule table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the rule for a node kind.
    pub fn resolve(&self, kind: &NodeKind) -> ComputedStyle {
        match kind {
            NodeKind::Heading { level } => {
                let idx = (*level).clamp(1, 6) as usize - 1;
                self.headings[idx].clone()
            }
            NodeKind::Paragraph => self.body.clone(),
            NodeKind::List { .. } => self.list.clone(),
            NodeKind::ListItem => self.list_item.clone(),
            NodeKind::Blockquote => self.blockquote.clone(),
            NodeKind::CodeBlock { .. } => self.code_block.clone(),
            NodeKind::Table => self.table.clone(),
            NodeKind::TableRow { header: true } => self.table_header.clone(),
            NodeKind::TableRow { header: false } => self.table_row.clone(),
            NodeKind::TableCell => self.table_cell.clone(),
            NodeKind::Image { .. } => self.image.clone(),
            NodeKind::Rule => self.rule.clone(),
        }
    }
}
