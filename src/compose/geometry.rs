//! Page geometry in millimeters.

use crate::error::{Error, Result};

/// Page geometry for composition.
///
/// Every field is millimeters; the single mm→pt conversion lives inside
/// the PDF writer. The margin applies to all four edges.
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    /// Page width
    pub page_width_mm: f32,

    /// Page height
    pub page_height_mm: f32,

    /// Margin on all four edges
    pub margin_mm: f32,

    /// Vertical gap between consecutive section placements
    pub section_gap_mm: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageGeometry {
    /// A4 portrait (210 x 297 mm) with a 10 mm margin.
    pub fn a4() -> Self {
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 10.0,
            section_gap_mm: 5.0,
        }
    }

    /// US Letter portrait (215.9 x 279.4 mm) with a 10 mm margin.
    pub fn letter() -> Self {
        Self {
            page_width_mm: 215.9,
            page_height_mm: 279.4,
            ..Self::a4()
        }
    }

    /// Set a custom page size.
    pub fn with_page_size(mut self, width_mm: f32, height_mm: f32) -> Self {
        self.page_width_mm = width_mm;
        self.page_height_mm = height_mm;
        self
    }

    /// Set the margin.
    pub fn with_margin(mut self, margin_mm: f32) -> Self {
        self.margin_mm = margin_mm;
        self
    }

    /// Set the inter-section gap.
    pub fn with_gap(mut self, gap_mm: f32) -> Self {
        self.section_gap_mm = gap_mm;
        self
    }

    /// Usable width between the margins.
    pub fn printable_width_mm(&self) -> f32 {
        self.page_width_mm - 2.0 * self.margin_mm
    }

    /// Usable height between the margins.
    pub fn printable_height_mm(&self) -> f32 {
        self.page_height_mm - 2.0 * self.margin_mm
    }

    /// Lowest allowed bottom edge for a placement.
    pub fn bottom_limit_mm(&self) -> f32 {
        self.page_height_mm - self.margin_mm
    }

    /// Reject geometry that leaves no printable area.
    pub fn validate(&self) -> Result<()> {
        if !(self.page_width_mm.is_finite()
            && self.page_height_mm.is_finite()
            && self.margin_mm.is_finite()
            && self.section_gap_mm.is_finite())
        {
            return Err(Error::InvalidGeometry(
                "page dimensions must be finite".to_string(),
            ));
        }
        if self.page_width_mm <= 0.0 || self.page_height_mm <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "page size {}x{} mm is not positive",
                self.page_width_mm, self.page_height_mm
            )));
        }
        if self.margin_mm < 0.0 || self.section_gap_mm < 0.0 {
            return Err(Error::InvalidGeometry(
                "margin and gap must not be negative".to_string(),
            ));
        }
        if self.printable_width_mm() <= 0.0 || self.printable_height_mm() <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "margins of {} mm consume the whole page",
                self.margin_mm
            )));
        }
        Ok(())
    }
}
