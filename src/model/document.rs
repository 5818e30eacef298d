//! Output document types.

use super::OutputPage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata embedded into the exported PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Creator application tag
    pub creator: String,

    /// PDF producer
    pub producer: String,

    /// Creation timestamp
    pub created: Option<DateTime<Utc>>,
}

impl Default for Metadata {
    fn default() -> Self {
        let tag = concat!("mdpress ", env!("CARGO_PKG_VERSION"));
        Self {
            title: None,
            author: None,
            subject: Some("Markdown export".to_string()),
            creator: tag.to_string(),
            producer: tag.to_string(),
            created: None,
        }
    }
}

impl Metadata {
    /// Create metadata with a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// The composed multi-page document, ready for serialization.
///
/// Created once per export invocation; its terminal state is either
/// "serialized by the exporter" or "dropped on error". There is no
/// persisted document model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDocument {
    /// Document metadata
    pub metadata: Metadata,

    /// Pages in order
    pub pages: Vec<OutputPage>,
}

impl OutputDocument {
    /// Create an empty document.
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            pages: Vec::new(),
        }
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Check if the document has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Append a page.
    pub fn add_page(&mut self, page: OutputPage) {
        self.pages.push(page);
    }

    /// Total number of placed images across all pages.
    pub fn total_placements(&self) -> usize {
        self.pages.iter().map(|page| page.placement_count()).sum()
    }

    /// Build a lightweight, serializable layout summary.
    pub fn layout_report(&self) -> LayoutReport {
        LayoutReport {
            page_count: self.page_count(),
            pages: self
                .pages
                .iter()
                .map(|page| PageReport {
                    number: page.number,
                    width_mm: page.width_mm,
                    height_mm: page.height_mm,
                    placements: page
                        .placements
                        .iter()
                        .map(|p| PlacementReport {
                            x_mm: p.x_mm,
                            y_mm: p.y_mm,
                            width_mm: p.width_mm,
                            height_mm: p.height_mm,
                            pixel_width: p.image.width_px,
                            pixel_height: p.image.height_px,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Serialize the layout summary to JSON.
    pub fn to_layout_json(&self, pretty: bool) -> Result<String> {
        let report = self.layout_report();
        let json = if pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        json.map_err(|e| crate::error::Error::Export(e.to_string()))
    }
}

/// Serializable summary of a composed document's layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutReport {
    /// Number of pages
    pub page_count: u32,

    /// Per-page placement summaries
    pub pages: Vec<PageReport>,
}

/// Layout summary for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in millimeters
    pub width_mm: f32,

    /// Page height in millimeters
    pub height_mm: f32,

    /// Placement rectangles
    pub placements: Vec<PlacementReport>,
}

/// Layout summary for one placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementReport {
    /// Horizontal offset in millimeters
    pub x_mm: f32,

    /// Vertical offset in millimeters
    pub y_mm: f32,

    /// Placed width in millimeters
    pub width_mm: f32,

    /// Placed height in millimeters
    pub height_mm: f32,

    /// Source image width in pixels
    pub pixel_width: u32,

    /// Source image height in pixels
    pub pixel_height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlacedImage, SectionImage};

    #[test]
    fn test_document_new() {
        let doc = OutputDocument::new(Metadata::default());
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert_eq!(doc.total_placements(), 0);
    }

    #[test]
    fn test_metadata_defaults_carry_generator_tag() {
        let metadata = Metadata::default();
        assert!(metadata.creator.starts_with("mdpress "));
        assert_eq!(metadata.creator, metadata.producer);
    }

    #[test]
    fn test_layout_report_shape() {
        let mut doc = OutputDocument::new(Metadata::with_title("Notes"));
        let mut page = OutputPage::new(1, 210.0, 297.0);
        page.place(PlacedImage {
            x_mm: 10.0,
            y_mm: 10.0,
            width_mm: 190.0,
            height_mm: 30.0,
            image: SectionImage::from_rgb(20, 10, 2.0, vec![0; 20 * 10 * 3]),
        });
        doc.add_page(page);

        let report = doc.layout_report();
        assert_eq!(report.page_count, 1);
        assert_eq!(report.pages[0].placements.len(), 1);
        assert_eq!(report.pages[0].placements[0].pixel_width, 20);

        let json = doc.to_layout_json(false).unwrap();
        assert!(json.contains("\"page_count\":1"));
    }
}
