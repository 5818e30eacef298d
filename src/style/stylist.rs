//! The document stylist: HTML fragment in, styled fragment tree out.

use crate::error::{Error, Result};
use crate::model::{ContentNode, Fragment, Inline, NodeKind};

use super::{decode_entities, StyleSheet};

/// Formatting flags carried down while collecting inline runs.
#[derive(Debug, Clone, Default)]
struct InlineFlags {
    bold: bool,
    italic: bool,
    code: bool,
    strike: bool,
    link: Option<String>,
}

impl InlineFlags {
    fn run(&self, text: String) -> Inline {
        Inline {
            text,
            bold: self.bold,
            italic: self.italic,
            code: self.code,
            strike: self.strike,
            link: self.link.clone(),
        }
    }
}

/// Applies the style rule table to a rendered HTML fragment, producing a
/// detached, styled content tree.
///
/// The stylist never mutates its input; the fragment it returns owns every
/// node, so a caller keeping the HTML around (a live preview, say) is
/// unaffected by anything the pipeline does afterwards.
#[derive(Debug, Clone, Default)]
pub struct Stylist {
    sheet: StyleSheet,
}

impl Stylist {
    /// Create a stylist with the given rule table.
    pub fn new(sheet: StyleSheet) -> Self {
        Self { sheet }
    }

    /// The stylist's rule table.
    pub fn sheet(&self) -> &StyleSheet {
        &self.sheet
    }

    /// Parse and style an HTML fragment.
    pub fn style(&self, html: &str) -> Result<Fragment> {
        let dom = tl::parse(html, tl::ParserOptions::default())
            .map_err(|e| Error::Render(e.to_string()))?;
        let parser = dom.parser();

        let mut nodes = Vec::new();
        for handle in dom.children() {
            self.block(*handle, parser, &mut nodes);
        }
        Ok(Fragment { nodes })
    }

    fn styled(&self, kind: NodeKind) -> ContentNode {
        let style = self.sheet.resolve(&kind);
        ContentNode::with_style(kind, style)
    }

    fn block(&self, handle: tl::NodeHandle, parser: &tl::Parser, out: &mut Vec<ContentNode>) {
        let Some(node) = handle.get(parser) else {
            return;
        };

        match node {
            tl::Node::Tag(tag) => {
                let name = tag.name().as_utf8_str().to_lowercase();
                match name.as_str() {
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                        let level = name.as_bytes()[1] - b'0';
                        let mut heading = self.styled(NodeKind::Heading { level });
                        self.inlines(tag, parser, &InlineFlags::default(), &mut heading.inlines);
                        out.push(heading);
                    }
                    "p" => self.paragraph(tag, parser, out),
                    "ul" | "ol" => out.push(self.list(tag, parser, name == "ol")),
                    "blockquote" => out.push(self.blockquote(tag, parser)),
                    "pre" => out.push(self.code_block(tag, parser)),
                    "table" => out.push(self.table(tag, parser)),
                    "hr" => out.push(self.styled(NodeKind::Rule)),
                    "img" => out.push(self.image_node(tag)),
                    // Wrappers the renderer may emit (divs, footnote
                    // containers) are transparent.
                    _ => {
                        for child in tag.children().top().iter() {
                            self.block(*child, parser, out);
                        }
                    }
                }
            }
            tl::Node::Raw(bytes) => {
                let text = decode_entities(&bytes.as_utf8_str());
                if !text.trim().is_empty() {
                    let mut para = self.styled(NodeKind::Paragraph);
                    para.inlines.push(Inline::plain(text.trim().to_string()));
                    out.push(para);
                }
            }
            tl::Node::Comment(_) => {}
        }
    }

    /// A paragraph that wraps only images becomes image blocks; anything
    /// else becomes a paragraph of inline runs. Empty paragraphs are
    /// dropped.
    fn paragraph(&self, tag: &tl::HTMLTag, parser: &tl::Parser, out: &mut Vec<ContentNode>) {
        let mut images = Vec::new();
        let mut has_other_content = false;

        for child in tag.children().top().iter() {
            match child.get(parser) {
                Some(tl::Node::Tag(inner)) => {
                    if inner.name().as_utf8_str().eq_ignore_ascii_case("img") {
                        images.push(self.image_node(inner));
                    } else {
                        has_other_content = true;
                    }
                }
                Some(tl::Node::Raw(bytes)) => {
                    if !bytes.as_utf8_str().trim().is_empty() {
                        has_other_content = true;
                    }
                }
                _ => {}
            }
        }

        if !images.is_empty() && !has_other_content {
            out.extend(images);
            return;
        }

        let mut para = self.styled(NodeKind::Paragraph);
        self.inlines(tag, parser, &InlineFlags::default(), &mut para.inlines);
        if para.inlines.iter().any(|run| !run.text.trim().is_empty()) {
            out.push(para);
        }
    }

    fn list(&self, tag: &tl::HTMLTag, parser: &tl::Parser, ordered: bool) -> ContentNode {
        let start = attr(tag, "start")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        let mut list = self.styled(NodeKind::List { ordered, start });

        for child in tag.children().top().iter() {
            if let Some(tl::Node::Tag(inner)) = child.get(parser) {
                if inner.name().as_utf8_str().eq_ignore_ascii_case("li") {
                    list.children.push(self.list_item(inner, parser));
                }
            }
        }
        list
    }

    /// List items hold mixed content: their own inline runs plus nested
    /// blocks (sub-lists, quotes, code). Loose-list `<p>` wrappers merge
    /// into the item's runs with a hard break between them.
    fn list_item(&self, tag: &tl::HTMLTag, parser: &tl::Parser) -> ContentNode {
        let mut item = self.styled(NodeKind::ListItem);

        for child in tag.children().top().iter() {
            let Some(node) = child.get(parser) else {
                continue;
            };
            match node {
                tl::Node::Tag(inner) => {
                    let name = inner.name().as_utf8_str().to_lowercase();
                    match name.as_str() {
                        "ul" | "ol" => item.children.push(self.list(inner, parser, name == "ol")),
                        "blockquote" => item.children.push(self.blockquote(inner, parser)),
                        "pre" => item.children.push(self.code_block(inner, parser)),
                        "table" => item.children.push(self.table(inner, parser)),
                        "p" => {
                            if !item.inlines.is_empty() {
                                item.inlines.push(Inline::hard_break());
                            }
                            self.inlines(inner, parser, &InlineFlags::default(), &mut item.inlines);
                        }
                        _ => self.inline_tag(
                            inner,
                            parser,
                            &InlineFlags::default(),
                            &mut item.inlines,
                        ),
                    }
                }
                tl::Node::Raw(bytes) => {
                    push_text(
                        &bytes.as_utf8_str(),
                        &InlineFlags::default(),
                        &mut item.inlines,
                    );
                }
                tl::Node::Comment(_) => {}
            }
        }
        item
    }

    fn blockquote(&self, tag: &tl::HTMLTag, parser: &tl::Parser) -> ContentNode {
        let mut quote = self.styled(NodeKind::Blockquote);
        for child in tag.children().top().iter() {
            self.block(*child, parser, &mut quote.children);
        }
        quote
    }

    fn code_block(&self, tag: &tl::HTMLTag, parser: &tl::Parser) -> ContentNode {
        let mut language = None;
        for child in tag.children().top().iter() {
            if let Some(tl::Node::Tag(inner)) = child.get(parser) {
                if inner.name().as_utf8_str().eq_ignore_ascii_case("code") {
                    language = attr(inner, "class")
                        .and_then(|class| {
                            class
                                .split_whitespace()
                                .find_map(|c| c.strip_prefix("language-").map(str::to_string))
                        })
                        .filter(|lang| !lang.is_empty());
                }
            }
        }

        let mut code = self.styled(NodeKind::CodeBlock { language });
        let mut text = String::new();
        collect_raw_text(tag, parser, &mut text);
        let text = decode_entities(text.trim_end_matches('\n'));
        if !text.is_empty() {
            code.inlines.push(Inline::plain(text));
        }
        code
    }

    fn table(&self, tag: &tl::HTMLTag, parser: &tl::Parser) -> ContentNode {
        let mut table = self.styled(NodeKind::Table);

        for child in tag.children().top().iter() {
            let Some(tl::Node::Tag(inner)) = child.get(parser) else {
                continue;
            };
            let name = inner.name().as_utf8_str().to_lowercase();
            match name.as_str() {
                "thead" | "tbody" => {
                    let header = name == "thead";
                    for row in inner.children().top().iter() {
                        if let Some(tl::Node::Tag(tr)) = row.get(parser) {
                            if tr.name().as_utf8_str().eq_ignore_ascii_case("tr") {
                                table.children.push(self.table_row(tr, parser, header));
                            }
                        }
                    }
                }
                "tr" => table.children.push(self.table_row(inner, parser, false)),
                _ => {}
            }
        }
        table
    }

    fn table_row(&self, tag: &tl::HTMLTag, parser: &tl::Parser, header: bool) -> ContentNode {
        let mut row = self.styled(NodeKind::TableRow { header });
        for child in tag.children().top().iter() {
            if let Some(tl::Node::Tag(cell)) = child.get(parser) {
                let name = cell.name().as_utf8_str().to_lowercase();
                if name == "td" || name == "th" {
                    let mut cell_node = self.styled(NodeKind::TableCell);
                    if name == "th" {
                        cell_node.style.bold = true;
                    }
                    self.inlines(cell, parser, &InlineFlags::default(), &mut cell_node.inlines);
                    row.children.push(cell_node);
                }
            }
        }
        row
    }

    fn image_node(&self, tag: &tl::HTMLTag) -> ContentNode {
        let source = attr(tag, "src").unwrap_or_default();
        let alt = attr(tag, "alt").unwrap_or_default();
        self.styled(NodeKind::Image {
            source: decode_entities(&source),
            alt: decode_entities(&alt),
        })
    }

    fn inlines(
        &self,
        tag: &tl::HTMLTag,
        parser: &tl::Parser,
        flags: &InlineFlags,
        out: &mut Vec<Inline>,
    ) {
        for child in tag.children().top().iter() {
            let Some(node) = child.get(parser) else {
                continue;
            };
            match node {
                tl::Node::Tag(inner) => self.inline_tag(inner, parser, flags, out),
                tl::Node::Raw(bytes) => push_text(&bytes.as_utf8_str(), flags, out),
                tl::Node::Comment(_) => {}
            }
        }
    }

    fn inline_tag(
        &self,
        tag: &tl::HTMLTag,
        parser: &tl::Parser,
        flags: &InlineFlags,
        out: &mut Vec<Inline>,
    ) {
        let name = tag.name().as_utf8_str().to_lowercase();
        match name.as_str() {
            "br" => out.push(Inline::hard_break()),
            "em" | "i" => {
                let nested = InlineFlags {
                    italic: true,
                    ..flags.clone()
                };
                self.inlines(tag, parser, &nested, out);
            }
            "strong" | "b" => {
                let nested = InlineFlags {
                    bold: true,
                    ..flags.clone()
                };
                self.inlines(tag, parser, &nested, out);
            }
            "code" => {
                let nested = InlineFlags {
                    code: true,
                    ..flags.clone()
                };
                self.inlines(tag, parser, &nested, out);
            }
            "del" | "s" | "strike" => {
                let nested = InlineFlags {
                    strike: true,
                    ..flags.clone()
                };
                self.inlines(tag, parser, &nested, out);
            }
            "a" => {
                let nested = InlineFlags {
                    link: attr(tag, "href"),
                    ..flags.clone()
                };
                self.inlines(tag, parser, &nested, out);
            }
            "img" => {
                let alt = attr(tag, "alt").unwrap_or_default();
                out.push(flags.run(format!("[image: {}]", decode_entities(&alt))));
            }
            "input" => {
                // GFM task list checkbox
                let marker = if attr(tag, "checked").is_some() {
                    "[x] "
                } else {
                    "[ ] "
                };
                out.push(flags.run(marker.to_string()));
            }
            _ => self.inlines(tag, parser, flags, out),
        }
    }
}

/// Push a decoded text run, folding in-paragraph newlines to spaces.
/// Hard breaks come only from `<br>`.
fn push_text(raw: &str, flags: &InlineFlags, out: &mut Vec<Inline>) {
    let text = decode_entities(raw).replace(['\n', '\r', '\t'], " ");
    if text.is_empty() {
        return;
    }
    out.push(flags.run(text));
}

/// Concatenate raw text of a subtree, preserving newlines (code blocks).
fn collect_raw_text(tag: &tl::HTMLTag, parser: &tl::Parser, out: &mut String) {
    for child in tag.children().top().iter() {
        match child.get(parser) {
            Some(tl::Node::Tag(inner)) => collect_raw_text(inner, parser, out),
            Some(tl::Node::Raw(bytes)) => out.push_str(&bytes.as_utf8_str()),
            _ => {}
        }
    }
}

fn attr(tag: &tl::HTMLTag, name: &str) -> Option<String> {
    for (key, value) in tag.attributes().iter() {
        if key.as_ref().eq_ignore_ascii_case(name) {
            return Some(value.map(|v| v.to_string()).unwrap_or_default());
        }
    }
    None
}
