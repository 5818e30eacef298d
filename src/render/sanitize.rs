//! HTML sanitization via ammonia.

/// Optional sanitizer collaborator.
///
/// Strips disallowed tags and attributes from the rendered HTML before it
/// reaches the stylist. On by default in the pipeline; callers with
/// trusted input can opt out.
pub struct Sanitizer {
    builder: ammonia::Builder<'static>,
}

impl Sanitizer {
    /// Create a sanitizer with ammonia's default allowlist.
    pub fn new() -> Self {
        Self {
            builder: ammonia::Builder::default(),
        }
    }

    /// Sanitize an HTML fragment, returning safe HTML.
    pub fn clean(&self, html: &str) -> String {
        self.builder.clean(html).to_string()
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sanitizer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_tags() {
        let sanitizer = Sanitizer::new();
        let cleaned = sanitizer.clean("<p>ok</p><script>alert(1)</script>");
        assert!(cleaned.contains("<p>ok</p>"));
        assert!(!cleaned.contains("script"));
    }

    #[test]
    fn test_keeps_document_structure() {
        let sanitizer = Sanitizer::new();
        let cleaned = sanitizer.clean("<h1>T</h1><blockquote><p>q</p></blockquote>");
        assert!(cleaned.contains("<h1>T</h1>"));
        assert!(cleaned.contains("<blockquote>"));
    }

    #[test]
    fn test_strips_event_handlers() {
        let sanitizer = Sanitizer::new();
        let cleaned = sanitizer.clean("<p onclick=\"evil()\">hi</p>");
        assert!(cleaned.contains("hi"));
        assert!(!cleaned.contains("onclick"));
    }
}
