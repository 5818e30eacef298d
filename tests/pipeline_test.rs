//! End-to-end pipeline properties: sectionizing, pagination geometry,
//! idempotence and the zero-content guard, exercised with a
//! deterministic stub rasterizer so every assertion is exact.

mod common;

use common::{stub_pipeline, stub_pipeline_counted};
use mdpress::{sectionize, Error, ExportEvent, RecordingObserver, Stylist};

// ==================== Sectionizer Properties ====================

#[test]
fn test_order_preservation_across_sectionize() {
    let html = mdpress::MarkdownRenderer::default()
        .render(
            "intro paragraph\n\n# One\n\ntext one\n\n## Two\n\n- a\n- b\n\n# Three\n\n> quoted",
        )
        .unwrap();
    let fragment = Stylist::default().style(&html).unwrap();
    let sections = sectionize(&fragment);

    let rebuilt: Vec<_> = sections
        .iter()
        .flat_map(|section| section.nodes.iter().cloned())
        .collect();
    assert_eq!(rebuilt, fragment.nodes, "no loss, reorder, or duplication");
}

#[test]
fn test_no_heading_in_section_interior() {
    let html = mdpress::MarkdownRenderer::default()
        .render("# A\n\nx\n\n# B\n\n# C\n\ny\n\nz")
        .unwrap();
    let fragment = Stylist::default().style(&html).unwrap();

    for section in sectionize(&fragment) {
        assert!(
            section.heading().is_some(),
            "every section here starts with a heading"
        );
        for node in &section.nodes[1..] {
            assert!(!node.is_heading(), "heading in section interior");
        }
    }
}

#[test]
fn test_leading_content_becomes_own_section() {
    let html = mdpress::MarkdownRenderer::default()
        .render("before any heading\n\n# First\n\nafter")
        .unwrap();
    let fragment = Stylist::default().style(&html).unwrap();
    let sections = sectionize(&fragment);

    assert_eq!(sections.len(), 2);
    assert!(sections[0].is_leading());
    assert_eq!(sections[1].title(), Some("First".to_string()));
}

// ==================== Composition Scenarios ====================

#[test]
fn test_title_and_text_scenario() {
    // "# Title\n\nSome text" → one section, placed at the top margin of
    // page 1.
    let mut pipeline = stub_pipeline(vec![50]);
    let doc = pipeline.run("# Title\n\nSome text").unwrap();

    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.total_placements(), 1);
    let placement = &doc.pages[0].placements[0];
    assert_eq!(placement.y_mm, 10.0);
    assert_eq!(placement.x_mm, 10.0);
}

#[test]
fn test_oversized_sections_no_infinite_loop() {
    // Three sections, each taller than the printable height (200 px at
    // 100 px layout width → 380 mm placed, printable is 277 mm). Each
    // must land alone on its own page.
    let markdown = "# A\n\n```\ncode\n```\n\n# B\n\n```\ncode\n```\n\n# C\n\n```\ncode\n```";
    let mut pipeline = stub_pipeline(vec![200]);
    let doc = pipeline.run(markdown).unwrap();

    assert_eq!(doc.page_count(), 3);
    for page in &doc.pages {
        assert_eq!(page.placement_count(), 1);
        assert_eq!(page.placements[0].y_mm, 10.0);
    }
}

#[test]
fn test_page_capacity_invariant() {
    let markdown: String = (0..20)
        .map(|i| format!("# Section {}\n\nbody text {}\n\n", i, i))
        .collect();
    let mut pipeline = stub_pipeline(vec![40, 80, 25, 60, 120, 30]);
    let doc = pipeline.run(&markdown).unwrap();

    // A4 with 10 mm margins: content may not pass 287 mm.
    for page in &doc.pages {
        let bottom = page.content_bottom_mm().unwrap();
        assert!(
            bottom <= 287.0 + 1e-3,
            "page {} overflows: {}",
            page.number,
            bottom
        );
    }
}

#[test]
fn test_idempotent_composition() {
    let markdown = "# One\n\ntext\n\n# Two\n\nmore\n\n# Three\n\nlast";
    let run = || {
        let mut pipeline = stub_pipeline(vec![70, 130, 45]);
        pipeline.run(markdown).unwrap()
    };

    let first = run();
    let second = run();

    assert_eq!(first.page_count(), second.page_count());
    for (a, b) in first.pages.iter().zip(second.pages.iter()) {
        assert_eq!(a.placement_count(), b.placement_count());
        for (pa, pb) in a.placements.iter().zip(b.placements.iter()) {
            assert_eq!(pa.y_mm, pb.y_mm);
            assert_eq!(pa.height_mm, pb.height_mm);
        }
    }
}

// ==================== Zero-Content Guard ====================

#[test]
fn test_empty_markdown_never_reaches_rasterizer() {
    let (mut pipeline, calls) = stub_pipeline_counted(vec![50]);

    for input in ["", "   ", "\n\n\t", "<!-- comment only -->"] {
        let result = pipeline.run(input);
        assert!(
            matches!(result, Err(Error::EmptyDocument)),
            "input {:?} must not produce a document",
            input
        );
    }
    assert_eq!(calls.get(), 0, "rasterizer called for empty input");
}

// ==================== Observer Stream ====================

#[test]
fn test_observer_event_order() {
    let mut pipeline = stub_pipeline(vec![50]);
    let mut observer = RecordingObserver::default();
    pipeline
        .run_observed("# A\n\nx\n\n# B\n\ny", &mut observer)
        .unwrap();

    let events = &observer.events;
    assert!(matches!(events[0], ExportEvent::RenderStarted));
    let styled_at = events
        .iter()
        .position(|e| matches!(e, ExportEvent::Styled { .. }))
        .unwrap();
    let sectionized_at = events
        .iter()
        .position(|e| matches!(e, ExportEvent::Sectionized { section_count: 2 }))
        .unwrap();
    let composed_at = events
        .iter()
        .position(|e| matches!(e, ExportEvent::Composed { .. }))
        .unwrap();
    assert!(styled_at < sectionized_at);
    assert!(sectionized_at < composed_at);

    let rasterized = events
        .iter()
        .filter(|e| matches!(e, ExportEvent::SectionRasterized { .. }))
        .count();
    assert_eq!(rasterized, 2);
}

// ==================== Fragment Fidelity ====================

#[test]
fn test_gfm_content_survives_to_sections() {
    let markdown = "# Doc\n\n~~old~~ new\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n- [x] done\n- [ ] open";
    let html = mdpress::MarkdownRenderer::default().render(markdown).unwrap();
    let fragment = Stylist::default().style(&html).unwrap();
    let sections = sectionize(&fragment);

    assert_eq!(sections.len(), 1);
    let text = sections[0].plain_text();
    assert!(text.contains("old"));
    assert!(text.contains("[x]"));
    let has_table = sections[0]
        .nodes
        .iter()
        .any(|n| matches!(n.kind, mdpress::NodeKind::Table));
    assert!(has_table);
}
