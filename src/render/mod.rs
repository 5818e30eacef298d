//! Rendering collaborators: markdown-to-HTML and HTML sanitization.

mod markdown;
mod sanitize;

pub use markdown::{MarkdownOptions, MarkdownRenderer};
pub use sanitize::Sanitizer;
