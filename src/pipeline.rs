//! The export pipeline: explicit wiring of all collaborators.
//!
//! Every collaborator (renderer, sanitizer, stylist, rasterizer) is owned
//! by the pipeline and injected at construction; nothing is read from
//! ambient state. Construction is the readiness gate: the built-in
//! rasterizer loads its fonts exactly once, before any export can start.
//! `run` takes `&mut self`, so overlapping exports through one pipeline
//! are unrepresentable; callers wanting concurrency build one pipeline
//! per thread.

use std::fmt;
use std::path::Path;

use crate::compose::{PageCompositor, PageGeometry};
use crate::error::{Error, Result};
use crate::export::{self, ExportReceipt};
use crate::model::{Metadata, OutputDocument};
use crate::observer::{ExportEvent, ExportObserver, NullObserver};
use crate::raster::{RasterOptions, Rasterizer, TypesetRasterizer};
use crate::render::{MarkdownOptions, MarkdownRenderer, Sanitizer};
use crate::section::sectionize;
use crate::style::{StyleSheet, Stylist};

/// Everything a pipeline needs, bundled for construction.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Markdown rendering options
    pub markdown: MarkdownOptions,

    /// Sanitize rendered HTML before styling
    pub sanitize: bool,

    /// Style rule table
    pub style: StyleSheet,

    /// Page geometry
    pub geometry: PageGeometry,

    /// Rasterization options
    pub raster: RasterOptions,

    /// Metadata for the exported document
    pub metadata: Metadata,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            markdown: MarkdownOptions::default(),
            sanitize: true,
            style: StyleSheet::default(),
            geometry: PageGeometry::default(),
            raster: RasterOptions::default(),
            metadata: Metadata::default(),
        }
    }
}

/// The markdown-to-PDF export pipeline.
pub struct ExportPipeline {
    renderer: MarkdownRenderer,
    sanitizer: Option<Sanitizer>,
    stylist: Stylist,
    compositor: PageCompositor,
    rasterizer: Box<dyn Rasterizer>,
    metadata: Metadata,
}

impl ExportPipeline {
    /// Create a pipeline with the built-in typesetting rasterizer.
    ///
    /// Fails fast with `FontUnavailable` when no system font can be
    /// loaded, and with `InvalidGeometry` for unusable page geometry.
    pub fn new(options: PipelineOptions) -> Result<Self> {
        let rasterizer = Box::new(TypesetRasterizer::new()?);
        Self::with_rasterizer(options, rasterizer)
    }

    /// Create a pipeline with an injected rasterizer.
    pub fn with_rasterizer(
        options: PipelineOptions,
        rasterizer: Box<dyn Rasterizer>,
    ) -> Result<Self> {
        let compositor = PageCompositor::new(options.geometry, options.raster)?;
        Ok(Self {
            renderer: MarkdownRenderer::new(options.markdown),
            sanitizer: options.sanitize.then(Sanitizer::new),
            stylist: Stylist::new(options.style),
            compositor,
            rasterizer,
            metadata: options.metadata,
        })
    }

    /// The pipeline's page geometry.
    pub fn geometry(&self) -> &PageGeometry {
        self.compositor.geometry()
    }

    /// The metadata attached to exported documents.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Replace the metadata attached to exported documents.
    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = metadata;
    }

    /// Run the pipeline: markdown in, composed document out.
    ///
    /// Empty or whitespace-only input short-circuits with
    /// `EmptyDocument` before anything is rasterized.
    pub fn run(&mut self, markdown: &str) -> Result<OutputDocument> {
        self.run_observed(markdown, &mut NullObserver)
    }

    /// Run the pipeline, reporting progress to an observer.
    pub fn run_observed(
        &mut self,
        markdown: &str,
        observer: &mut dyn ExportObserver,
    ) -> Result<OutputDocument> {
        if markdown.trim().is_empty() {
            return Err(Error::EmptyDocument);
        }

        observer.on_event(&ExportEvent::RenderStarted);
        let html = self.renderer.render(markdown)?;
        let html = match &self.sanitizer {
            Some(sanitizer) => sanitizer.clean(&html),
            None => html,
        };

        let fragment = self.stylist.style(&html)?;
        observer.on_event(&ExportEvent::Styled {
            node_count: fragment.node_count(),
        });
        if fragment.is_empty() {
            return Err(Error::EmptyDocument);
        }

        let sections = sectionize(&fragment);
        observer.on_event(&ExportEvent::Sectionized {
            section_count: sections.len(),
        });

        self.compositor.compose_observed(
            &sections,
            self.rasterizer.as_mut(),
            self.metadata.clone(),
            observer,
        )
    }

    /// Run the pipeline and write the PDF into a directory.
    pub fn export_to_dir(
        &mut self,
        markdown: &str,
        dir: &Path,
        filename: &str,
    ) -> Result<ExportReceipt> {
        self.export_to_dir_observed(markdown, dir, filename, &mut NullObserver)
    }

    /// Run the pipeline and write the PDF, reporting progress.
    pub fn export_to_dir_observed(
        &mut self,
        markdown: &str,
        dir: &Path,
        filename: &str,
        observer: &mut dyn ExportObserver,
    ) -> Result<ExportReceipt> {
        let doc = self.run_observed(markdown, observer)?;
        let receipt = export::save_in_dir(&doc, dir, filename)?;
        observer.on_event(&ExportEvent::Saved {
            filename: receipt.filename.clone(),
            bytes: receipt.bytes_written,
        });
        Ok(receipt)
    }
}

impl fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportPipeline")
            .field("renderer", &self.renderer)
            .field("sanitize", &self.sanitizer.is_some())
            .field("geometry", self.compositor.geometry())
            .finish_non_exhaustive()
    }
}
