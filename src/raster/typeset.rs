//! The built-in typesetting rasterizer.
//!
//! Lays a section out at a fixed pixel width with real font metrics
//! (greedy word wrap, per-block spacing and padding from the computed
//! styles), then paints backgrounds, borders, grids and glyphs into an
//! RGBA buffer. The whole layout happens at the rasterization scale, so
//! a 2.0 scale doubles pixel density without changing geometry.

use image::{Rgba, RgbaImage};
use rusttype::{Font, GlyphId, Scale};

use crate::error::{Error, Result};
use crate::model::{ComputedStyle, ContentNode, Inline, NodeKind, Section, SectionImage};

use super::{FontLibrary, RasterOptions, Rasterizer};

/// CSS pixels per typographic point.
const PX_PER_PT: f32 = 96.0 / 72.0;

const TEXT_COLOR: [u8; 3] = [0, 0, 0];
const LINK_COLOR: [u8; 3] = [0, 102, 204];
const RULE_COLOR: [u8; 3] = [204, 204, 204];
const GRID_COLOR: [u8; 3] = [221, 221, 221];
const INLINE_CODE_BG: [u8; 3] = [245, 245, 245];

/// Height of the framed placeholder drawn for image nodes, in points.
const IMAGE_PLACEHOLDER_PT: f32 = 72.0;

/// Which face a text op draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontSel {
    Regular,
    Bold,
    Italic,
    Mono,
}

/// Formatting inherited from enclosing containers (blockquote italics).
#[derive(Debug, Clone, Copy, Default)]
struct Inherit {
    bold: bool,
    italic: bool,
}

/// A paint instruction with absolute pixel coordinates.
#[derive(Debug, Clone)]
enum PaintOp {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: [u8; 3],
    },
    Text {
        x: f32,
        baseline: f32,
        px: f32,
        font: FontSel,
        color: [u8; 3],
        text: String,
    },
}

/// Rasterizes sections by typesetting them with loaded system fonts.
///
/// Construction loads fonts once and fails fast when none are available;
/// after that, rasterization is deterministic for identical inputs.
#[derive(Debug, Clone)]
pub struct TypesetRasterizer {
    fonts: FontLibrary,
}

impl TypesetRasterizer {
    /// Create a rasterizer with fonts from well-known system locations.
    pub fn new() -> Result<Self> {
        Ok(Self {
            fonts: FontLibrary::load()?,
        })
    }

    /// Create a rasterizer with an explicitly loaded font library.
    pub fn with_fonts(fonts: FontLibrary) -> Self {
        Self { fonts }
    }

    /// The loaded font library.
    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }
}

impl Rasterizer for TypesetRasterizer {
    fn rasterize(&mut self, section: &Section, options: &RasterOptions) -> Result<SectionImage> {
        if options.scale <= 0.0 {
            return Err(Error::Rasterize(format!(
                "rasterization scale must be positive, got {}",
                options.scale
            )));
        }
        if options.layout_width_px == 0 {
            return Err(Error::Rasterize("layout width must be positive".to_string()));
        }

        let width = (options.layout_width_px as f32 * options.scale).round().max(1.0);
        let mut engine = LayoutEngine {
            fonts: &self.fonts,
            scale: options.scale,
            ops: Vec::new(),
        };

        let mut y = 0.0f32;
        for node in &section.nodes {
            engine.block(node, 0.0, width, Inherit::default(), &mut y);
        }

        let width_px = width as u32;
        let height_px = y.ceil().max(1.0) as u32;
        let image = paint(&self.fonts, &engine.ops, width_px, height_px, options.background);
        let rgb = image::DynamicImage::ImageRgba8(image).into_rgb8().into_raw();

        log::debug!(
            "rasterized section {} at {}x{} (scale {})",
            section.index,
            width_px,
            height_px,
            options.scale
        );

        Ok(SectionImage::from_rgb(width_px, height_px, options.scale, rgb))
    }
}

struct LayoutEngine<'a> {
    fonts: &'a FontLibrary,
    scale: f32,
    ops: Vec<PaintOp>,
}

impl LayoutEngine<'_> {
    fn px(&self, pt: f32) -> f32 {
        pt * PX_PER_PT * self.scale
    }

    fn hairline(&self) -> f32 {
        self.scale.max(1.0)
    }

    fn font_for(&self, sel: FontSel) -> &Font<'static> {
        match sel {
            FontSel::Regular => self.fonts.select(false, false, false),
            FontSel::Bold => self.fonts.select(true, false, false),
            FontSel::Italic => self.fonts.select(false, true, false),
            FontSel::Mono => self.fonts.select(false, false, true),
        }
    }

    fn measure(&self, sel: FontSel, px: f32, text: &str) -> f32 {
        measure_text(self.font_for(sel), px, text)
    }

    fn baseline_offset(&self, sel: FontSel, px: f32, line_h: f32) -> f32 {
        let metrics = self.font_for(sel).v_metrics(Scale::uniform(px));
        let content_h = metrics.ascent - metrics.descent;
        (line_h - content_h) * 0.5 + metrics.ascent
    }

    fn block(
        &mut self,
        node: &ContentNode,
        left: f32,
        right: f32,
        inherit: Inherit,
        y: &mut f32,
    ) {
        let style = &node.style;
        *y += self.px(style.space_before_pt);

        match &node.kind {
            NodeKind::Heading { .. } | NodeKind::Paragraph => {
                if !node.inlines.is_empty() {
                    self.flow_inlines(
                        &node.inlines,
                        style,
                        inherit,
                        left + self.px(style.pad_left_pt),
                        right - self.px(style.pad_right_pt),
                        y,
                    );
                }
            }
            NodeKind::List { ordered, start } => {
                let inner_left = left + self.px(style.pad_left_pt);
                let mut counter = *start;
                for item in &node.children {
                    if !matches!(item.kind, NodeKind::ListItem) {
                        continue;
                    }
                    let marker = if *ordered {
                        format!("{}. ", counter)
                    } else {
                        "\u{2022} ".to_string()
                    };
                    counter += 1;

                    let mut runs = Vec::with_capacity(item.inlines.len() + 1);
                    runs.push(Inline::plain(marker));
                    runs.extend(item.inlines.iter().cloned());
                    self.flow_inlines(&runs, &item.style, inherit, inner_left, right, y);
                    *y += self.px(item.style.space_after_pt);

                    for child in &item.children {
                        self.block(child, inner_left, right, inherit, y);
                    }
                }
            }
            NodeKind::ListItem => {
                // Items only occur under a list; a stray one flows as text.
                self.flow_inlines(&node.inlines, style, inherit, left, right, y);
            }
            NodeKind::Blockquote => {
                let top = *y;
                let inner_left = left + self.px(style.pad_left_pt);
                let nested = Inherit {
                    bold: inherit.bold || style.bold,
                    italic: inherit.italic || style.italic,
                };
                for child in &node.children {
                    self.block(child, inner_left, right, nested, y);
                }
                if *y > top && style.border_left_pt > 0.0 {
                    self.ops.push(PaintOp::Rect {
                        x: left,
                        y: top,
                        w: self.px(style.border_left_pt),
                        h: *y - top,
                        color: style.border_color,
                    });
                }
            }
            NodeKind::CodeBlock { .. } => {
                let mark = self.ops.len();
                let top = *y;
                *y += self.px(style.pad_top_pt);
                let text = node.inline_text();
                self.flow_mono(
                    &text,
                    style,
                    left + self.px(style.pad_left_pt),
                    right - self.px(style.pad_right_pt),
                    y,
                );
                *y += self.px(style.pad_bottom_pt);
                if let Some(bg) = style.background {
                    self.ops.insert(
                        mark,
                        PaintOp::Rect {
                            x: left,
                            y: top,
                            w: right - left,
                            h: *y - top,
                            color: bg,
                        },
                    );
                }
            }
            NodeKind::Table => self.table(node, left, right, inherit, y),
            NodeKind::TableRow { .. } | NodeKind::TableCell => {
                // Only reachable through a table; ignore when orphaned.
            }
            NodeKind::Image { source, alt } => {
                self.image_placeholder(source, alt, style, left, right, y);
            }
            NodeKind::Rule => {
                self.ops.push(PaintOp::Rect {
                    x: left,
                    y: *y,
                    w: right - left,
                    h: self.hairline(),
                    color: RULE_COLOR,
                });
                *y += self.hairline();
            }
        }

        *y += self.px(style.space_after_pt);
    }

    /// Greedy word wrap of inline runs into [left, right).
    fn flow_inlines(
        &mut self,
        runs: &[Inline],
        style: &ComputedStyle,
        inherit: Inherit,
        left: f32,
        right: f32,
        y: &mut f32,
    ) {
        let px = self.px(style.font_size_pt);
        let line_h = px * style.line_height;
        if right - left < px {
            *y += line_h;
            return;
        }

        let mut x = left;
        let mut pending_space = false;

        for run in runs {
            if run.is_break() {
                *y += line_h;
                x = left;
                pending_space = false;
                continue;
            }

            let sel = select_font(style, run, inherit);
            let color = if run.link.is_some() {
                LINK_COLOR
            } else {
                TEXT_COLOR
            };
            let space_w = self.measure(sel, px, " ");

            for (wi, word) in run.text.split(' ').enumerate() {
                if wi > 0 {
                    pending_space = true;
                }
                if word.is_empty() {
                    continue;
                }

                let w = self.measure(sel, px, word);
                let lead = if pending_space && x > left { space_w } else { 0.0 };
                if x > left && x + lead + w > right {
                    *y += line_h;
                    x = left;
                } else {
                    x += lead;
                }

                if run.code {
                    self.ops.push(PaintOp::Rect {
                        x: x - 2.0 * self.scale,
                        y: *y + line_h * 0.08,
                        w: w + 4.0 * self.scale,
                        h: line_h * 0.84,
                        color: INLINE_CODE_BG,
                    });
                }

                let baseline = *y + self.baseline_offset(sel, px, line_h);
                self.ops.push(PaintOp::Text {
                    x,
                    baseline,
                    px,
                    font: sel,
                    color,
                    text: word.to_string(),
                });

                if run.strike {
                    self.ops.push(PaintOp::Rect {
                        x,
                        y: baseline - px * 0.3,
                        w,
                        h: self.hairline(),
                        color,
                    });
                }
                if run.link.is_some() {
                    self.ops.push(PaintOp::Rect {
                        x,
                        y: baseline + 2.0 * self.scale,
                        w,
                        h: self.hairline(),
                        color,
                    });
                }

                x += w;
                pending_space = false;
            }
        }

        *y += line_h;
    }

    /// Monospace flow with preserved whitespace; long lines hard-wrap at
    /// the character level so indentation survives.
    fn flow_mono(&mut self, text: &str, style: &ComputedStyle, left: f32, right: f32, y: &mut f32) {
        let px = self.px(style.font_size_pt);
        let line_h = px * style.line_height;
        let char_w = self.measure(FontSel::Mono, px, "M").max(1.0);
        let max_chars = (((right - left) / char_w).floor() as usize).max(1);

        for line in text.split('\n') {
            if line.is_empty() {
                *y += line_h;
                continue;
            }
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(max_chars) {
                let baseline = *y + self.baseline_offset(FontSel::Mono, px, line_h);
                self.ops.push(PaintOp::Text {
                    x: left,
                    baseline,
                    px,
                    font: FontSel::Mono,
                    color: TEXT_COLOR,
                    text: chunk.iter().collect(),
                });
                *y += line_h;
            }
        }
    }

    fn table(
        &mut self,
        node: &ContentNode,
        left: f32,
        right: f32,
        inherit: Inherit,
        y: &mut f32,
    ) {
        let rows: Vec<&ContentNode> = node
            .children
            .iter()
            .filter(|child| matches!(child.kind, NodeKind::TableRow { .. }))
            .collect();
        let ncols = rows.iter().map(|row| row.children.len()).max().unwrap_or(0);
        if ncols == 0 {
            return;
        }

        let col_w = (right - left) / ncols as f32;
        let line_px = self.hairline();
        let table_top = *y;

        for row in rows {
            let header = matches!(row.kind, NodeKind::TableRow { header: true });
            let row_top = *y;
            let row_mark = self.ops.len();
            let mut row_bottom = row_top;

            for (ci, cell) in row.children.iter().enumerate() {
                let cx = left + ci as f32 * col_w;
                let pad_l = self.px(cell.style.pad_left_pt);
                let pad_r = self.px(cell.style.pad_right_pt);
                let pad_t = self.px(cell.style.pad_top_pt);
                let pad_b = self.px(cell.style.pad_bottom_pt);

                let mut cy = row_top + pad_t;
                self.flow_inlines(
                    &cell.inlines,
                    &cell.style,
                    inherit,
                    cx + pad_l,
                    cx + col_w - pad_r,
                    &mut cy,
                );
                row_bottom = row_bottom.max(cy + pad_b);
            }

            if row.children.is_empty() {
                row_bottom = row_top + self.px(16.0);
            }

            if header {
                self.ops.insert(
                    row_mark,
                    PaintOp::Rect {
                        x: left,
                        y: row_top,
                        w: right - left,
                        h: row_bottom - row_top,
                        color: INLINE_CODE_BG,
                    },
                );
            }
            self.ops.push(PaintOp::Rect {
                x: left,
                y: row_top,
                w: right - left,
                h: line_px,
                color: GRID_COLOR,
            });

            *y = row_bottom;
        }

        // Bottom edge and column separators.
        self.ops.push(PaintOp::Rect {
            x: left,
            y: *y,
            w: right - left,
            h: line_px,
            color: GRID_COLOR,
        });
        let table_h = *y - table_top + line_px;
        for c in 0..=ncols {
            let x = (left + c as f32 * col_w).min(right - line_px);
            self.ops.push(PaintOp::Rect {
                x,
                y: table_top,
                w: line_px,
                h: table_h,
                color: GRID_COLOR,
            });
        }
        *y += line_px;
    }

    /// Images are never fetched; a framed placeholder carries the alt
    /// text (or the source when no alt was given).
    fn image_placeholder(
        &mut self,
        source: &str,
        alt: &str,
        style: &ComputedStyle,
        left: f32,
        right: f32,
        y: &mut f32,
    ) {
        let h = self.px(IMAGE_PLACEHOLDER_PT);
        let b = self.hairline();
        let top = *y;
        let w = right - left;

        for (rx, ry, rw, rh) in [
            (left, top, w, b),
            (left, top + h - b, w, b),
            (left, top, b, h),
            (right - b, top, b, h),
        ] {
            self.ops.push(PaintOp::Rect {
                x: rx,
                y: ry,
                w: rw,
                h: rh,
                color: RULE_COLOR,
            });
        }

        let label = if alt.is_empty() { source } else { alt };
        if !label.is_empty() {
            let px = self.px(style.font_size_pt);
            let baseline = top + h * 0.5 + px * 0.35;
            self.ops.push(PaintOp::Text {
                x: left + self.px(8.0),
                baseline,
                px,
                font: FontSel::Italic,
                color: [120, 120, 120],
                text: label.to_string(),
            });
        }

        *y += h;
    }
}

fn select_font(style: &ComputedStyle, run: &Inline, inherit: Inherit) -> FontSel {
    if run.code || style.monospace {
        FontSel::Mono
    } else if run.bold || style.bold || inherit.bold {
        FontSel::Bold
    } else if run.italic || style.italic || inherit.italic {
        FontSel::Italic
    } else {
        FontSel::Regular
    }
}

fn measure_text(font: &Font<'_>, px: f32, text: &str) -> f32 {
    let scale = Scale::uniform(px);
    let mut width = 0.0;
    let mut last: Option<GlyphId> = None;
    for ch in text.chars() {
        let glyph = font.glyph(ch);
        if let Some(prev) = last {
            width += font.pair_kerning(scale, prev, glyph.id());
        }
        last = Some(glyph.id());
        width += glyph.scaled(scale).h_metrics().advance_width;
    }
    width
}

fn paint(
    fonts: &FontLibrary,
    ops: &[PaintOp],
    width: u32,
    height: u32,
    background: [u8; 3],
) -> RgbaImage {
    let [r, g, b] = background;
    let mut img = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));

    for op in ops {
        match op {
            PaintOp::Rect { x, y, w, h, color } => {
                let x0 = x.max(0.0) as u32;
                let y0 = y.max(0.0) as u32;
                let x1 = ((x + w).ceil().max(0.0) as u32).min(width);
                let y1 = ((y + h).ceil().max(0.0) as u32).min(height);
                for py in y0..y1 {
                    for px in x0..x1 {
                        img.put_pixel(px, py, Rgba([color[0], color[1], color[2], 255]));
                    }
                }
            }
            PaintOp::Text {
                x,
                baseline,
                px,
                font,
                color,
                text,
            } => {
                let face = match font {
                    FontSel::Regular => fonts.select(false, false, false),
                    FontSel::Bold => fonts.select(true, false, false),
                    FontSel::Italic => fonts.select(false, true, false),
                    FontSel::Mono => fonts.select(false, false, true),
                };
                draw_text(&mut img, face, *px, *x, *baseline, *color, text);
            }
        }
    }
    img
}

fn draw_text(
    img: &mut RgbaImage,
    font: &Font<'_>,
    px: f32,
    x: f32,
    baseline: f32,
    color: [u8; 3],
    text: &str,
) {
    let scale = Scale::uniform(px);
    let (width, height) = img.dimensions();
    let mut cursor = x;
    let mut last: Option<GlyphId> = None;

    for ch in text.chars() {
        let base = font.glyph(ch);
        let id = base.id();
        if let Some(prev) = last {
            cursor += font.pair_kerning(scale, prev, id);
        }
        last = Some(id);

        let glyph = base.scaled(scale);
        let advance = glyph.h_metrics().advance_width;
        let positioned = glyph.positioned(rusttype::point(cursor, baseline));

        if let Some(bb) = positioned.pixel_bounding_box() {
            positioned.draw(|gx, gy, coverage| {
                let ix = gx as i32 + bb.min.x;
                let iy = gy as i32 + bb.min.y;
                if coverage > 0.0 && ix >= 0 && iy >= 0 && (ix as u32) < width && (iy as u32) < height
                {
                    let pixel = img.get_pixel_mut(ix as u32, iy as u32);
                    for c in 0..3 {
                        let bg = pixel.0[c] as f32;
                        let fg = color[c] as f32;
                        pixel.0[c] = (bg + (fg - bg) * coverage).round() as u8;
                    }
                }
            });
        }
        cursor += advance;
    }
}
