//! PDF assembly with pdf-writer.
//!
//! One page object per output page; every placed section image becomes an
//! RGB image XObject with a FlateDecode stream, positioned by a single
//! transform in the page's content stream. This is the one place in the
//! pipeline where millimeters turn into PDF points.

use std::io::Write as _;

use chrono::{Datelike, Timelike, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};

use crate::error::{Error, Result};
use crate::model::OutputDocument;

/// Convert millimeters to PDF points (1 pt = 1/72 inch).
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// Serialize a composed document into PDF bytes.
pub fn write_pdf(doc: &OutputDocument) -> Result<Vec<u8>> {
    if doc.is_empty() {
        return Err(Error::EmptyDocument);
    }

    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let id = Ref::new(next_id);
        next_id += 1;
        id
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();
    let page_ids: Vec<Ref> = doc.pages.iter().map(|_| alloc()).collect();

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    write_info(&mut pdf, info_id, doc);

    let mut image_counter = 0usize;
    for (page, &page_id) in doc.pages.iter().zip(&page_ids) {
        let mut content = Content::new();
        let mut page_xobjects: Vec<(String, Ref)> = Vec::new();

        for placement in &page.placements {
            image_counter += 1;
            let name = format!("Im{}", image_counter);
            let image_id = alloc();

            let compressed = deflate(&placement.image.rgb)?;
            let mut xobject = pdf.image_xobject(image_id, &compressed);
            xobject.filter(Filter::FlateDecode);
            xobject.width(placement.image.width_px as i32);
            xobject.height(placement.image.height_px as i32);
            xobject.color_space().device_rgb();
            xobject.bits_per_component(8);
            xobject.finish();

            // PDF origin is bottom-left; placements are top-left based.
            let w_pt = mm_to_pt(placement.width_mm);
            let h_pt = mm_to_pt(placement.height_mm);
            let x_pt = mm_to_pt(placement.x_mm);
            let y_pt = mm_to_pt(page.height_mm - placement.y_mm - placement.height_mm);

            content.save_state();
            content.transform([w_pt, 0.0, 0.0, h_pt, x_pt, y_pt]);
            content.x_object(Name(name.as_bytes()));
            content.restore_state();

            page_xobjects.push((name, image_id));
        }

        let content_id = alloc();
        let raw = content.finish();
        let compressed = deflate(&raw)?;
        pdf.stream(content_id, &compressed)
            .filter(Filter::FlateDecode);

        let mut page_obj = pdf.page(page_id);
        page_obj
            .media_box(Rect::new(
                0.0,
                0.0,
                mm_to_pt(page.width_mm),
                mm_to_pt(page.height_mm),
            ))
            .parent(pages_id)
            .contents(content_id);
        if !page_xobjects.is_empty() {
            let mut resources = page_obj.resources();
            let mut xobjects = resources.x_objects();
            for (name, id) in &page_xobjects {
                xobjects.pair(Name(name.as_bytes()), *id);
            }
        }
    }

    Ok(pdf.finish())
}

fn write_info(pdf: &mut Pdf, info_id: Ref, doc: &OutputDocument) {
    let metadata = &doc.metadata;
    let mut info = pdf.document_info(info_id);
    if let Some(title) = &metadata.title {
        info.title(TextStr(title));
    }
    if let Some(author) = &metadata.author {
        info.author(TextStr(author));
    }
    if let Some(subject) = &metadata.subject {
        info.subject(TextStr(subject));
    }
    info.creator(TextStr(&metadata.creator));
    info.producer(TextStr(&metadata.producer));

    let created = metadata.created.unwrap_or_else(Utc::now);
    let date = pdf_writer::Date::new(created.year() as u16)
        .month(created.month() as u8)
        .day(created.day() as u8)
        .hour(created.hour() as u8)
        .minute(created.minute() as u8)
        .second(created.second() as u8)
        .utc_offset_hour(0)
        .utc_offset_minute(0);
    info.creation_date(date);
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Error::Export(format!("stream compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| Error::Export(format!("stream compression failed: {}", e)))
}
