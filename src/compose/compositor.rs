//! The sequential page compositor.

use crate::error::{Error, Result};
use crate::model::{Metadata, OutputDocument, OutputPage, PlacedImage, Section};
use crate::observer::{ExportEvent, ExportObserver, NullObserver};
use crate::raster::{RasterOptions, Rasterizer};

use super::PageGeometry;

/// Composes rasterized sections onto fixed-size pages.
///
/// Sections are processed strictly in order, one at a time; the
/// rasterizer's scratch surface is exclusively borrowed per call. A
/// section that does not fit the remaining space on the current page
/// starts a new page; a section taller than the printable height is
/// placed alone on a fresh page and may exceed the nominal bound. Any
/// rasterization failure aborts the whole composition and drops the
/// partially composed pages.
#[derive(Debug, Clone)]
pub struct PageCompositor {
    geometry: PageGeometry,
    raster_options: RasterOptions,
}

impl PageCompositor {
    /// Create a compositor, validating the geometry up front.
    pub fn new(geometry: PageGeometry, raster_options: RasterOptions) -> Result<Self> {
        geometry.validate()?;
        Ok(Self {
            geometry,
            raster_options,
        })
    }

    /// The compositor's geometry.
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// The compositor's rasterization options.
    pub fn raster_options(&self) -> &RasterOptions {
        &self.raster_options
    }

    /// Compose sections into an output document.
    pub fn compose(
        &self,
        sections: &[Section],
        rasterizer: &mut dyn Rasterizer,
        metadata: Metadata,
    ) -> Result<OutputDocument> {
        self.compose_observed(sections, rasterizer, metadata, &mut NullObserver)
    }

    /// Compose sections, reporting progress to an observer.
    pub fn compose_observed(
        &self,
        sections: &[Section],
        rasterizer: &mut dyn Rasterizer,
        metadata: Metadata,
        observer: &mut dyn ExportObserver,
    ) -> Result<OutputDocument> {
        if sections.is_empty() {
            return Err(Error::EmptyDocument);
        }

        let geometry = &self.geometry;
        let printable_w = geometry.printable_width_mm();
        let printable_h = geometry.printable_height_mm();
        let bottom_limit = geometry.bottom_limit_mm();

        let mut doc = OutputDocument::new(metadata);
        let mut page = OutputPage::new(1, geometry.page_width_mm, geometry.page_height_mm);
        let mut cursor = geometry.margin_mm;
        observer.on_event(&ExportEvent::PageStarted { number: 1 });

        for section in sections {
            let image = rasterizer.rasterize(section, &self.raster_options)?;
            observer.on_event(&ExportEvent::SectionRasterized {
                index: section.index,
                width_px: image.width_px,
                height_px: image.height_px,
            });

            if image.is_empty() {
                log::debug!("section {} rasterized to nothing, skipped", section.index);
                continue;
            }

            let height_mm = image.height_for_width(printable_w);

            if cursor + height_mm > bottom_limit && !page.is_empty() {
                let next_number = page.number + 1;
                doc.add_page(std::mem::replace(
                    &mut page,
                    OutputPage::new(next_number, geometry.page_width_mm, geometry.page_height_mm),
                ));
                cursor = geometry.margin_mm;
                observer.on_event(&ExportEvent::PageStarted {
                    number: next_number,
                });
            }

            if height_mm > printable_h {
                log::warn!(
                    "section {} is {:.1} mm tall, exceeding the {:.1} mm printable height",
                    section.index,
                    height_mm,
                    printable_h
                );
            }

            observer.on_event(&ExportEvent::ImagePlaced {
                page: page.number,
                y_mm: cursor,
                height_mm,
            });
            page.place(PlacedImage {
                x_mm: geometry.margin_mm,
                y_mm: cursor,
                width_mm: printable_w,
                height_mm,
                image,
            });
            cursor += height_mm + geometry.section_gap_mm;
        }

        if !page.is_empty() {
            doc.add_page(page);
        }
        if doc.is_empty() {
            return Err(Error::EmptyDocument);
        }

        observer.on_event(&ExportEvent::Composed {
            page_count: doc.page_count(),
        });
        log::debug!(
            "composed {} sections onto {} pages",
            sections.len(),
            doc.page_count()
        );
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentNode, Inline, NodeKind, SectionImage};
    use crate::observer::RecordingObserver;

    /// Deterministic rasterizer: fixed pixel height per section index.
    struct FixedRasterizer {
        heights: Vec<u32>,
    }

    impl Rasterizer for FixedRasterizer {
        fn rasterize(
            &mut self,
            section: &Section,
            options: &RasterOptions,
        ) -> Result<SectionImage> {
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

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn rasterize(&mut self, _: &Section, _: &RasterOptions) -> Result<SectionImage> {
            Err(Error::Rasterize("surface unavailable".to_string()))
        }
    }

    fn sections(count: usize) -> Vec<Section> {
        (0..count)
            .map(|i| {
                let mut node = ContentNode::new(NodeKind::Heading { level: 1 });
                node.inlines.push(Inline::plain(format!("Section {}", i)));
                Section::new(i, vec![node])
            })
            .collect()
    }

    fn compositor() -> PageCompositor {
        // 100 px layout width at scale 1.0 on A4: a 100 px tall image
        // places at 190 mm height.
        PageCompositor::new(
            PageGeometry::a4(),
            RasterOptions::new().with_scale(1.0).with_layout_width(100),
        )
        .unwrap()
    }

    #[test]
    fn test_single_section_on_first_page_at_top_margin() {
        let compositor = compositor();
        let mut raster = FixedRasterizer { heights: vec![50] };
        let doc = compositor
            .compose(&sections(1), &mut raster, Metadata::default())
            .unwrap();

        assert_eq!(doc.page_count(), 1);
        let placement = &doc.pages[0].placements[0];
        assert_eq!(placement.x_mm, 10.0);
        assert_eq!(placement.y_mm, 10.0);
        assert_eq!(placement.width_mm, 190.0);
        assert_eq!(placement.height_mm, 95.0); // 50 px * 190 / 100
    }

    #[test]
    fn test_overflow_starts_new_page() {
        let compositor = compositor();
        // Each section places at 95 mm; two fit (10+95+5+95 = 205 < 287),
        // the third would end at 305 > 287 and moves to page 2.
        let mut raster = FixedRasterizer { heights: vec![50] };
        let doc = compositor
            .compose(&sections(3), &mut raster, Metadata::default())
            .unwrap();

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[0].placement_count(), 2);
        assert_eq!(doc.pages[1].placement_count(), 1);
        assert_eq!(doc.pages[1].placements[0].y_mm, 10.0);
    }

    #[test]
    fn test_capacity_invariant_holds() {
        let compositor = compositor();
        let mut raster = FixedRasterizer {
            heights: vec![50, 30, 80, 20, 60, 40],
        };
        let doc = compositor
            .compose(&sections(12), &mut raster, Metadata::default())
            .unwrap();

        let bottom_limit = compositor.geometry().bottom_limit_mm();
        for page in &doc.pages {
            let bottom = page.content_bottom_mm().unwrap();
            assert!(
                bottom <= bottom_limit + 1e-3,
                "page {} content reaches {} past the bottom limit {}",
                page.number,
                bottom,
                bottom_limit
            );
        }
    }

    #[test]
    fn test_oversized_sections_each_get_a_page() {
        let compositor = compositor();
        // 200 px -> 380 mm placed height, exceeding the 277 mm printable
        // height; each oversized section must land alone on its own page
        // without looping.
        let mut raster = FixedRasterizer { heights: vec![200] };
        let doc = compositor
            .compose(&sections(3), &mut raster, Metadata::default())
            .unwrap();

        assert_eq!(doc.page_count(), 3);
        for page in &doc.pages {
            assert_eq!(page.placement_count(), 1);
            assert_eq!(page.placements[0].y_mm, 10.0);
        }
    }

    #[test]
    fn test_composition_is_idempotent() {
        let compositor = compositor();
        let input = sections(7);
        let heights = vec![40, 90, 25, 120, 60];

        let run = |heights: &[u32]| {
            let mut raster = FixedRasterizer {
                heights: heights.to_vec(),
            };
            compositor
                .compose(&input, &mut raster, Metadata::default())
                .unwrap()
        };

        let first = run(&heights);
        let second = run(&heights);
        assert_eq!(first.page_count(), second.page_count());
        for (a, b) in first.pages.iter().zip(second.pages.iter()) {
            assert_eq!(a.placements.len(), b.placements.len());
            for (pa, pb) in a.placements.iter().zip(b.placements.iter()) {
                assert_eq!(pa.y_mm, pb.y_mm);
                assert_eq!(pa.height_mm, pb.height_mm);
            }
        }
    }

    #[test]
    fn test_rasterize_failure_aborts_whole_compose() {
        let compositor = compositor();
        let result = compositor.compose(&sections(3), &mut FailingRasterizer, Metadata::default());
        assert!(matches!(result, Err(Error::Rasterize(_))));
    }

    #[test]
    fn test_no_sections_is_empty_document() {
        let compositor = compositor();
        let mut raster = FixedRasterizer { heights: vec![50] };
        let result = compositor.compose(&[], &mut raster, Metadata::default());
        assert!(matches!(result, Err(Error::EmptyDocument)));
    }

    #[test]
    fn test_observer_sees_page_boundaries() {
        let compositor = compositor();
        let mut raster = FixedRasterizer { heights: vec![200] };
        let mut observer = RecordingObserver::default();
        compositor
            .compose_observed(
                &sections(2),
                &mut raster,
                Metadata::default(),
                &mut observer,
            )
            .unwrap();

        let boundaries = observer
            .events
            .iter()
            .filter(|event| event.is_page_boundary())
            .count();
        assert_eq!(boundaries, 2);
        assert!(observer
            .events
            .iter()
            .any(|event| matches!(event, ExportEvent::Composed { page_count: 2 })));
    }

    #[test]
    fn test_invalid_geometry_rejected_at_construction() {
        let result = PageCompositor::new(
            PageGeometry::a4().with_margin(200.0),
            RasterOptions::default(),
        );
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
    }
}
