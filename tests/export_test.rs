//! Exporter surface: filename resolution, PDF bytes, and the no-partial-
//! file guarantee.

mod common;

use common::stub_pipeline;
use mdpress::{
    Error, Mdpress, RasterOptions, Rasterizer, Result, Section, SectionImage, TypesetRasterizer,
};

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|window| *window == needle)
        .count()
}

#[test]
fn test_filename_without_extension_gets_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = stub_pipeline(vec![50]);
    let receipt = pipeline
        .export_to_dir("# Notes\n\ntext", dir.path(), "my notes")
        .unwrap();

    assert_eq!(receipt.filename, "my notes.pdf");
    assert!(dir.path().join("my notes.pdf").exists());
    assert_eq!(receipt.page_count, 1);
}

#[test]
fn test_pdf_bytes_shape() {
    let mut pipeline = stub_pipeline(vec![50]);
    let doc = pipeline
        .run("# One\n\na\n\n# Two\n\nb\n\n# Three\n\nc")
        .unwrap();
    let bytes = mdpress::write_pdf(&doc).unwrap();

    assert!(bytes.starts_with(b"%PDF-"));
    // One /Page object per output page plus the /Pages tree node.
    let pages = count_occurrences(&bytes, b"/Type /Page");
    assert_eq!(pages as u32, doc.page_count() + 1);
    assert_eq!(
        count_occurrences(&bytes, b"/Subtype /Image"),
        doc.total_placements()
    );
}

#[test]
fn test_written_file_size_matches_receipt() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = stub_pipeline(vec![60]);
    let receipt = pipeline
        .export_to_dir("# T\n\nbody", dir.path(), "sized")
        .unwrap();

    let on_disk = std::fs::metadata(dir.path().join("sized.pdf")).unwrap().len();
    assert_eq!(on_disk, receipt.bytes_written);
}

struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn rasterize(&mut self, _: &Section, _: &RasterOptions) -> Result<SectionImage> {
        Err(Error::Rasterize("surface lost".to_string()))
    }
}

#[test]
fn test_no_partial_file_on_rasterize_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = Mdpress::new()
        .build_with_rasterizer(Box::new(FailingRasterizer))
        .unwrap();

    let result = pipeline.export_to_dir("# T\n\nbody", dir.path(), "broken");
    assert!(matches!(result, Err(Error::Rasterize(_))));
    assert!(
        !dir.path().join("broken.pdf").exists(),
        "a failed export must never leave a file behind"
    );
}

#[test]
fn test_layout_json_report() {
    let mut pipeline = stub_pipeline(vec![50]);
    let doc = pipeline.run("# A\n\nx\n\n# B\n\ny").unwrap();
    let json = doc.to_layout_json(false).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["page_count"], 1);
    assert_eq!(parsed["pages"][0]["placements"].as_array().unwrap().len(), 2);
}

// ==================== Real Rasterizer (font-gated) ====================

#[test]
fn test_end_to_end_with_typeset_rasterizer() {
    let Ok(rasterizer) = TypesetRasterizer::new() else {
        return; // host has no usable fonts installed
    };
    let dir = tempfile::tempdir().unwrap();
    let markdown = "# Report\n\nintro with **bold** and `code`\n\n\
                    ## Data\n\n| k | v |\n|---|---|\n| a | 1 |\n\n\
                    ```rust\nfn main() {}\n```\n\n> closing thought";

    let mut pipeline = Mdpress::new()
        .with_title("Report")
        .build_with_rasterizer(Box::new(rasterizer))
        .unwrap();
    let receipt = pipeline
        .export_to_dir(markdown, dir.path(), "report")
        .unwrap();

    assert_eq!(receipt.filename, "report.pdf");
    assert!(receipt.page_count >= 1);
    let bytes = std::fs::read(dir.path().join("report.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(bytes.len() > 1000, "a typeset page has real image payload");
}
