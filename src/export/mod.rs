//! Export: filename resolution and PDF serialization.

mod pdf;

pub use pdf::{mm_to_pt, write_pdf};

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::model::OutputDocument;

/// Basename used when the user supplies no usable filename.
pub const DEFAULT_BASENAME: &str = "document";

/// Result of a completed export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReceipt {
    /// Final filename the document was written under
    pub filename: String,

    /// Number of pages in the document
    pub page_count: u32,

    /// Size of the written file in bytes
    pub bytes_written: u64,
}

/// Resolve a user-supplied filename into a safe `.pdf` filename.
///
/// Trims, NFC-normalizes, strips path separators and control characters,
/// falls back to `document` when nothing usable remains, and appends
/// `.pdf` when the extension is missing.
pub fn resolve_filename(input: &str) -> String {
    static ILLEGAL: OnceLock<Regex> = OnceLock::new();
    let illegal = ILLEGAL
        .get_or_init(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f]"#).expect("static pattern"));

    let normalized: String = input.trim().nfc().collect();
    let cleaned = illegal.replace_all(&normalized, "");
    let base = cleaned.trim().trim_end_matches('.');

    let base = if base.is_empty() || base.eq_ignore_ascii_case(".pdf") {
        DEFAULT_BASENAME
    } else {
        base
    };
    if base.to_ascii_lowercase().ends_with(".pdf") && base.len() > 4 {
        base.to_string()
    } else {
        format!("{}.pdf", base)
    }
}

/// Serialize the document and write it into a directory.
///
/// The full byte buffer is assembled before any file I/O happens, so a
/// failed export never leaves a partial document behind the filename.
pub fn save_in_dir(doc: &OutputDocument, dir: &Path, filename: &str) -> Result<ExportReceipt> {
    let resolved = resolve_filename(filename);
    let bytes = write_pdf(doc)?;
    let path: PathBuf = dir.join(&resolved);
    std::fs::write(&path, &bytes)?;
    log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(ExportReceipt {
        filename: resolved,
        page_count: doc.page_count(),
        bytes_written: bytes.len() as u64,
    })
}

/// Serialize the document and write it to the current directory.
pub fn save_to_file(doc: &OutputDocument, filename: &str) -> Result<ExportReceipt> {
    save_in_dir(doc, Path::new("."), filename)
}

/// Serialize the document and write it into a directory without blocking.
#[cfg(feature = "async")]
pub async fn save_in_dir_async(
    doc: &OutputDocument,
    dir: &Path,
    filename: &str,
) -> Result<ExportReceipt> {
    let resolved = resolve_filename(filename);
    let bytes = write_pdf(doc)?;
    let path: PathBuf = dir.join(&resolved);
    tokio::fs::write(&path, &bytes).await?;
    Ok(ExportReceipt {
        filename: resolved,
        page_count: doc.page_count(),
        bytes_written: bytes.len() as u64,
    })
}
