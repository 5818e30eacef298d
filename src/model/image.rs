//! Raster snapshot of a section.

use serde::{Deserialize, Serialize};

/// A raster snapshot of one section, produced by the rasterizer and
/// consumed within a single compositor pass.
///
/// Pixels are tightly packed RGB8, `width_px * height_px * 3` bytes. The
/// buffer is skipped during serialization; layout reports only carry the
/// dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionImage {
    /// Width in pixels at the rasterization scale
    pub width_px: u32,

    /// Height in pixels at the rasterization scale
    pub height_px: u32,

    /// Rasterization scale the snapshot was taken at
    pub scale: f32,

    /// Raw RGB8 pixel data
    #[serde(skip)]
    pub rgb: Vec<u8>,
}

impl SectionImage {
    /// Create a snapshot from raw RGB8 data.
    ///
    /// The buffer length must be exactly `width_px * height_px * 3`.
    pub fn from_rgb(width_px: u32, height_px: u32, scale: f32, rgb: Vec<u8>) -> Self {
        debug_assert_eq!(rgb.len(), width_px as usize * height_px as usize * 3);
        Self {
            width_px,
            height_px,
            scale,
            rgb,
        }
    }

    /// Height the image occupies when scaled proportionally to the given
    /// width.
    pub fn height_for_width(&self, width: f32) -> f32 {
        if self.width_px == 0 {
            return 0.0;
        }
        self.height_px as f32 * width / self.width_px as f32
    }

    /// Aspect ratio (height / width).
    pub fn aspect(&self) -> f32 {
        if self.width_px == 0 {
            return 0.0;
        }
        self.height_px as f32 / self.width_px as f32
    }

    /// Whether the snapshot holds any pixels.
    pub fn is_empty(&self) -> bool {
        self.width_px == 0 || self.height_px == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_for_width() {
        let img = SectionImage::from_rgb(200, 100, 2.0, vec![255; 200 * 100 * 3]);
        assert_eq!(img.height_for_width(100.0), 50.0);
        assert_eq!(img.aspect(), 0.5);
    }

    #[test]
    fn test_zero_width_is_safe() {
        let img = SectionImage::from_rgb(0, 0, 2.0, Vec::new());
        assert!(img.is_empty());
        assert_eq!(img.height_for_width(100.0), 0.0);
    }
}
