//! Output page types.

use super::SectionImage;
use serde::{Deserialize, Serialize};

/// A section image placed on a page at an explicit position.
///
/// All coordinates are millimeters from the top-left corner of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedImage {
    /// Horizontal offset of the left edge
    pub x_mm: f32,

    /// Vertical offset of the top edge
    pub y_mm: f32,

    /// Placed width
    pub width_mm: f32,

    /// Placed height
    pub height_mm: f32,

    /// The raster snapshot being placed
    pub image: SectionImage,
}

impl PlacedImage {
    /// Bottom edge of the placement.
    pub fn bottom_mm(&self) -> f32 {
        self.y_mm + self.height_mm
    }
}

/// A fixed-size output page holding zero or more placed section images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputPage {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in millimeters
    pub width_mm: f32,

    /// Page height in millimeters
    pub height_mm: f32,

    /// Images placed on the page, in placement order
    pub placements: Vec<PlacedImage>,
}

impl OutputPage {
    /// Create an empty page.
    pub fn new(number: u32, width_mm: f32, height_mm: f32) -> Self {
        Self {
            number,
            width_mm,
            height_mm,
            placements: Vec::new(),
        }
    }

    /// Place an image on the page.
    pub fn place(&mut self, placement: PlacedImage) {
        self.placements.push(placement);
    }

    /// Check if the page holds no placements.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of placements on the page.
    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }

    /// Bottom edge of the lowest placement, or `None` for an empty page.
    pub fn content_bottom_mm(&self) -> Option<f32> {
        self.placements
            .iter()
            .map(|p| p.bottom_mm())
            .fold(None, |acc, b| Some(acc.map_or(b, |a: f32| a.max(b))))
    }
}
