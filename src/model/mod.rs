//! Document model types for the export pipeline.
//!
//! This module defines the intermediate representation that flows through
//! the pipeline: the styled fragment tree produced by the stylist, the
//! heading-bounded sections derived from it, and the output pages and
//! document assembled by the compositor. Everything here is created fresh
//! per export invocation and owned by that invocation.

mod document;
mod fragment;
mod image;
mod page;
mod section;

pub use document::{LayoutReport, Metadata, OutputDocument, PageReport, PlacementReport};
pub use fragment::{ComputedStyle, ContentNode, Fragment, Inline, NodeKind};
pub use image::SectionImage;
pub use page::{OutputPage, PlacedImage};
pub use section::Section;
