//! Markdown to HTML rendering via pulldown-cmark.

use pulldown_cmark::{html, Event, Options, Parser};

use crate::error::Result;

/// Options for markdown rendering.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
    /// Treat single newlines as hard line breaks
    pub hard_breaks: bool,

    /// Enable GFM tables
    pub tables: bool,

    /// Enable GFM strikethrough
    pub strikethrough: bool,

    /// Enable GFM task lists
    pub task_lists: bool,

    /// Enable footnotes
    pub footnotes: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            tables: true,
            strikethrough: true,
            task_lists: true,
            footnotes: true,
        }
    }
}

impl MarkdownOptions {
    /// Create options with defaults (hard breaks plus the GFM extensions).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable hard line breaks.
    pub fn with_hard_breaks(mut self, enabled: bool) -> Self {
        self.hard_breaks = enabled;
        self
    }

    /// Enable or disable the GFM extensions as a group.
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.tables = enabled;
        self.strikethrough = enabled;
        self.task_lists = enabled;
        self
    }

    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        opts
    }
}

/// Markdown renderer collaborator.
///
/// Converts a markdown string into an HTML fragment string. The
/// pulldown-cmark path is total, but the contract is fallible so
/// alternative renderer implementations can report parse errors.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    options: MarkdownOptions,
}

impl MarkdownRenderer {
    /// Create a renderer with the given options.
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// The renderer's options.
    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }

    /// Render markdown to an HTML fragment string.
    pub fn render(&self, markdown: &str) -> Result<String> {
        let parser = Parser::new_ext(markdown, self.options.to_pulldown_options());
        let hard_breaks = self.options.hard_breaks;
        let events = parser.map(move |event| match event {
            Event::SoftBreak if hard_breaks => Event::HardBreak,
            other => other,
        });

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events);
        Ok(output)
    }
}
