//! Shared helpers for integration tests.

use std::cell::Cell;
use std::rc::Rc;

use mdpress::{
    ExportPipeline, Mdpress, RasterOptions, Rasterizer, Result, Section, SectionImage,
};

/// Deterministic rasterizer: section height in pixels cycles through a
/// fixed list, and every call bumps a shared counter.
pub struct StubRasterizer {
    heights: Vec<u32>,
    calls: Rc<Cell<usize>>,
}

impl StubRasterizer {
    pub fn new(heights: Vec<u32>) -> Self {
        Self {
            heights,
            calls: Rc::new(Cell::new(0)),
        }
    }

    /// Handle to the call counter, usable after the rasterizer moves
    /// into a pipeline.
    pub fn call_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }
}

impl Rasterizer for StubRasterizer {
    fn rasterize(&mut self, section: &Section, options: &RasterOptions) -> Result<SectionImage> {
        self.calls.set(self.calls.get() + 1);
        let width = (options.layout_width_px as f32 * options.scale) as u32;
        let height = self.heights[section.index % self.heights.len()];
        Ok(SectionImage::from_rgb(
            width,
            height,
            options.scale,
            vec![255; (width * height * 3) as usize],
        ))
    }
}

/// A pipeline with small images and a deterministic rasterizer: a
/// 100 px-wide layout at scale 1.0 places each 50 px-tall section at
/// 95 mm height on A4.
pub fn stub_pipeline(heights: Vec<u32>) -> ExportPipeline {
    stub_pipeline_counted(heights).0
}

/// Like [`stub_pipeline`], also returning the rasterizer call counter.
pub fn stub_pipeline_counted(heights: Vec<u32>) -> (ExportPipeline, Rc<Cell<usize>>) {
    let rasterizer = StubRasterizer::new(heights);
    let counter = rasterizer.call_counter();
    let pipeline = Mdpress::new()
        .with_scale(1.0)
        .with_layout_width(100)
        .build_with_rasterizer(Box::new(rasterizer))
        .expect("stub pipeline construction");
    (pipeline, counter)
}
