//! # mdpress
//!
//! Markdown to paginated PDF, entirely in-process.
//!
//! This library converts freeform markdown into a styled, multi-page PDF
//! through a strictly forward pipeline: render markdown to HTML, sanitize
//! it, apply a style rule table, split the styled fragment into
//! heading-bounded sections, rasterize each section with real font
//! metrics, and place the snapshots onto fixed-size pages.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> mdpress::Result<()> {
//!     // One call: markdown in, PDF on disk.
//!     let receipt = mdpress::export_to_file("# Notes\n\nSome text", "my notes")?;
//!     println!("wrote {} ({} pages)", receipt.filename, receipt.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Builder
//!
//! ```no_run
//! use mdpress::{Mdpress, PageGeometry};
//!
//! fn main() -> mdpress::Result<()> {
//!     let receipt = Mdpress::new()
//!         .with_geometry(PageGeometry::letter())
//!         .with_margin_mm(15.0)
//!         .with_title("Meeting notes")
//!         .export("# Agenda\n\n- item one\n- item two", "agenda")?;
//!     println!("{} pages", receipt.page_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Design notes
//!
//! - **Single unit**: page geometry is millimeters end to end; points
//!   exist only inside the PDF writer and the typographic rule table.
//! - **Injected collaborators**: the renderer, sanitizer and rasterizer
//!   are constructor parameters, never ambient globals. Tests swap in
//!   deterministic rasterizers through the [`Rasterizer`] trait.
//! - **Sequential by construction**: exports run one section at a time
//!   and `run` takes `&mut self`, so a pipeline cannot be re-entered
//!   while an export is outstanding.
//! - **No network**: remote images are never fetched and nothing is
//!   POSTed anywhere; export is fully local.

pub mod compose;
pub mod error;
pub mod export;
pub mod model;
pub mod observer;
pub mod pipeline;
pub mod raster;
pub mod render;
pub mod section;
pub mod style;

// Re-export commonly used types
pub use compose::{PageCompositor, PageGeometry};
pub use error::{Error, Result};
pub use export::{resolve_filename, write_pdf, ExportReceipt};
pub use model::{
    ContentNode, Fragment, Inline, LayoutReport, Metadata, NodeKind, OutputDocument, OutputPage,
    PlacedImage, Section, SectionImage,
};
pub use observer::{ExportEvent, ExportObserver, NullObserver, RecordingObserver};
pub use pipeline::{ExportPipeline, PipelineOptions};
pub use raster::{FontLibrary, RasterOptions, Rasterizer, TypesetRasterizer};
pub use render::{MarkdownOptions, MarkdownRenderer, Sanitizer};
pub use section::sectionize;
pub use style::{StyleSheet, Stylist};

use std::path::Path;

/// Convert markdown to PDF bytes with default settings.
///
/// # Example
///
/// ```no_run
/// let bytes = mdpress::to_pdf_bytes("# Title\n\nSome text").unwrap();
/// std::fs::write("out.pdf", bytes).unwrap();
/// ```
pub fn to_pdf_bytes(markdown: &str) -> Result<Vec<u8>> {
    let doc = Mdpress::new().compose(markdown)?;
    write_pdf(&doc)
}

/// Convert markdown and write the PDF next to the current directory.
///
/// The filename gets `.pdf` appended when the extension is missing.
pub fn export_to_file(markdown: &str, filename: &str) -> Result<ExportReceipt> {
    Mdpress::new().export(markdown, filename)
}

/// Builder for configuring and running exports.
///
/// # Example
///
/// ```no_run
/// use mdpress::Mdpress;
///
/// let doc = Mdpress::new()
///     .with_margin_mm(12.0)
///     .with_scale(2.0)
///     .without_sanitizer()
///     .compose("# Title\n\nbody")?;
/// # Ok::<(), mdpress::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mdpress {
    options: PipelineOptions,
}

impl Mdpress {
    /// Create a builder with default settings (A4, 10 mm margin, 2x
    /// rasterization, sanitizer on).
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the markdown rendering options.
    pub fn with_markdown_options(mut self, options: MarkdownOptions) -> Self {
        self.options.markdown = options;
        self
    }

    /// Enable or disable hard line breaks.
    pub fn with_hard_breaks(mut self, enabled: bool) -> Self {
        self.options.markdown.hard_breaks = enabled;
        self
    }

    /// Skip HTML sanitization (trusted input only).
    pub fn without_sanitizer(mut self) -> Self {
        self.options.sanitize = false;
        self
    }

    /// Replace the style rule table.
    pub fn with_style(mut self, style: StyleSheet) -> Self {
        self.options.style = style;
        self
    }

    /// Replace the page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.options.geometry = geometry;
        self
    }

    /// Set the page margin.
    pub fn with_margin_mm(mut self, margin: f32) -> Self {
        self.options.geometry.margin_mm = margin;
        self
    }

    /// Set the gap between placed sections.
    pub fn with_gap_mm(mut self, gap: f32) -> Self {
        self.options.geometry.section_gap_mm = gap;
        self
    }

    /// Set the rasterization scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.options.raster.scale = scale;
        self
    }

    /// Set the layout width in CSS pixels.
    pub fn with_layout_width(mut self, width_px: u32) -> Self {
        self.options.raster.layout_width_px = width_px;
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.options.metadata.title = Some(title.into());
        self
    }

    /// Set the document author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.options.metadata.author = Some(author.into());
        self
    }

    /// Set the document subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.options.metadata.subject = Some(subject.into());
        self
    }

    /// The accumulated pipeline options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Build a reusable pipeline with the built-in rasterizer.
    pub fn build(self) -> Result<ExportPipeline> {
        ExportPipeline::new(self.options)
    }

    /// Build a reusable pipeline with an injected rasterizer.
    pub fn build_with_rasterizer(self, rasterizer: Box<dyn Rasterizer>) -> Result<ExportPipeline> {
        ExportPipeline::with_rasterizer(self.options, rasterizer)
    }

    /// Run the pipeline once, returning the composed document.
    pub fn compose(self, markdown: &str) -> Result<OutputDocument> {
        self.build()?.run(markdown)
    }

    /// Run the pipeline once and write the PDF to the current directory.
    pub fn export(self, markdown: &str, filename: &str) -> Result<ExportReceipt> {
        self.export_in_dir(markdown, Path::new("."), filename)
    }

    /// Run the pipeline once and write the PDF into a directory.
    pub fn export_in_dir(
        self,
        markdown: &str,
        dir: &Path,
        filename: &str,
    ) -> Result<ExportReceipt> {
        self.build()?.export_to_dir(markdown, dir, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_options() {
        let builder = Mdpress::new()
            .with_margin_mm(14.0)
            .with_gap_mm(7.0)
            .with_scale(1.5)
            .with_hard_breaks(false)
            .without_sanitizer()
            .with_title("T")
            .with_author("A");

        let options = builder.options();
        assert_eq!(options.geometry.margin_mm, 14.0);
        assert_eq!(options.geometry.section_gap_mm, 7.0);
        assert_eq!(options.raster.scale, 1.5);
        assert!(!options.markdown.hard_breaks);
        assert!(!options.sanitize);
        assert_eq!(options.metadata.title.as_deref(), Some("T"));
        assert_eq!(options.metadata.author.as_deref(), Some("A"));
    }

    #[test]
    fn test_builder_defaults() {
        let options = Mdpress::new().options().clone();
        assert!(options.sanitize);
        assert!(options.markdown.hard_breaks);
        assert_eq!(options.geometry.page_width_mm, 210.0);
        assert_eq!(options.raster.scale, 2.0);
    }

    #[test]
    fn test_geometry_swap() {
        let builder = Mdpress::new().with_geometry(PageGeometry::letter());
        assert_eq!(builder.options().geometry.page_width_mm, 215.9);
    }
}
