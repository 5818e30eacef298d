//! System font discovery and loading for the built-in rasterizer.
//!
//! Fonts load exactly once, at rasterizer construction. This is the
//! pipeline's readiness gate: a missing font surfaces as
//! `Error::FontUnavailable` before any export starts, never midway
//! through one.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rusttype::Font;

use crate::error::{Error, Result};

/// Well-known sans-serif font locations, in preference order.
const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

const ITALIC_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Italic.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Italic.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Italic.ttf",
    "/System/Library/Fonts/Supplemental/Arial Italic.ttf",
    "C:\\Windows\\Fonts\\ariali.ttf",
];

const MONO_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// Directories scanned by filename when no exact candidate path exists.
const SEARCH_ROOTS: &[&str] = &["/usr/share/fonts", "/usr/local/share/fonts"];

/// The four font faces the typesetter draws with.
///
/// Bold+italic text falls back to the bold face; systems without bold,
/// italic or mono variants fall back to the regular face for those roles.
#[derive(Clone)]
pub struct FontLibrary {
    regular: Font<'static>,
    bold: Font<'static>,
    italic: Font<'static>,
    mono: Font<'static>,
    source: PathBuf,
}

impl FontLibrary {
    /// Load fonts from well-known system locations.
    pub fn load() -> Result<Self> {
        let (regular, source) = load_candidates(REGULAR_CANDIDATES)
            .ok_or_else(|| {
                Error::FontUnavailable(
                    "no sans-serif TrueType font in the standard system font directories"
                        .to_string(),
                )
            })?;
        log::debug!("loaded base font from {}", source.display());

        let bold = load_candidates(BOLD_CANDIDATES)
            .map(|(font, _)| font)
            .unwrap_or_else(|| regular.clone());
        let italic = load_candidates(ITALIC_CANDIDATES)
            .map(|(font, _)| font)
            .unwrap_or_else(|| regular.clone());
        let mono = load_candidates(MONO_CANDIDATES)
            .map(|(font, _)| font)
            .unwrap_or_else(|| regular.clone());

        Ok(Self {
            regular,
            bold,
            italic,
            mono,
            source,
        })
    }

    /// Load fonts from explicit TrueType files.
    ///
    /// Missing variants fall back to the regular face.
    pub fn from_files(
        regular: &Path,
        bold: Option<&Path>,
        italic: Option<&Path>,
        mono: Option<&Path>,
    ) -> Result<Self> {
        let base = load_file(regular).ok_or_else(|| {
            Error::FontUnavailable(format!("could not load font {}", regular.display()))
        })?;
        let load_or_base = |path: Option<&Path>| {
            path.and_then(load_file).unwrap_or_else(|| base.clone())
        };
        Ok(Self {
            bold: load_or_base(bold),
            italic: load_or_base(italic),
            mono: load_or_base(mono),
            regular: base,
            source: regular.to_path_buf(),
        })
    }

    /// Pick the face for a combination of formatting flags.
    pub fn select(&self, bold: bool, italic: bool, monospace: bool) -> &Font<'static> {
        if monospace {
            &self.mono
        } else if bold {
            &self.bold
        } else if italic {
            &self.italic
        } else {
            &self.regular
        }
    }

    /// Path the base font was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontLibrary")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

fn load_candidates(candidates: &[&str]) -> Option<(Font<'static>, PathBuf)> {
    for candidate in candidates {
        let path = Path::new(candidate);
        if let Some(font) = load_file(path) {
            return Some((font, path.to_path_buf()));
        }
    }

    // Exact locations failed; scan the font roots for the same filenames.
    let names: Vec<&str> = candidates
        .iter()
        .filter_map(|c| Path::new(c).file_name().and_then(|n| n.to_str()))
        .collect();
    for root in SEARCH_ROOTS {
        if let Some(path) = find_by_name(Path::new(root), &names, 0) {
            if let Some(font) = load_file(&path) {
                return Some((font, path));
            }
        }
    }
    None
}

fn load_file(path: &Path) -> Option<Font<'static>> {
    let data = fs::read(path).ok()?;
    Font::try_from_vec(data)
}

fn find_by_name(dir: &Path, names: &[&str], depth: usize) -> Option<PathBuf> {
    if depth > 4 {
        return None;
    }
    let entries = fs::read_dir(dir).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if names.contains(&name) {
                return Some(path);
            }
        }
    }
    for subdir in subdirs {
        if let Some(found) = find_by_name(&subdir, names, depth + 1) {
            return Some(found);
        }
    }
    None
}
