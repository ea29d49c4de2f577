//! Text format filter pipeline.
//!
//! Section and block bodies are rendered through one of three formats:
//! - `plain_text`: HTML-escapes everything, newlines become `<br>`
//! - `filtered_html`: sanitized HTML; responsive-embed iframes survive with
//!   a restricted attribute set
//! - `markdown`: Markdown rendered to HTML, then sanitized

/// Format applied when a record carries none.
pub const DEFAULT_FORMAT: &str = "filtered_html";

/// Trait for text filters in the pipeline.
pub trait TextFilter: Send + Sync {
    /// Filter name for debugging.
    fn name(&self) -> &str;

    /// Process the input text and return filtered output.
    fn process(&self, input: &str) -> String;
}

/// Pipeline of text filters applied in sequence.
pub struct FilterPipeline {
    filters: Vec<Box<dyn TextFilter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline.
    pub fn add<F: TextFilter + 'static>(mut self, filter: F) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Create a pipeline for a format name. Unknown formats get the safest
    /// treatment (plain text).
    pub fn for_format(format: &str) -> Self {
        match format {
            "filtered_html" => Self::filtered_html(),
            "markdown" => Self::markdown(),
            "plain_text" => Self::plain_text(),
            _ => Self::plain_text(),
        }
    }

    /// Escape all HTML and preserve line breaks.
    pub fn plain_text() -> Self {
        Self::new().add(HtmlEscapeFilter).add(NewlineFilter)
    }

    /// Sanitize HTML through the extended allowlist.
    pub fn filtered_html() -> Self {
        Self::new().add(SanitizeHtmlFilter)
    }

    /// Render Markdown to HTML, then sanitize.
    pub fn markdown() -> Self {
        Self::new().add(MarkdownFilter).add(SanitizeHtmlFilter)
    }

    /// Process text through all filters in the pipeline.
    pub fn process(&self, input: &str) -> String {
        self.filters
            .iter()
            .fold(input.to_string(), |acc, filter| filter.process(&acc))
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::plain_text()
    }
}

/// Filter that escapes all HTML characters.
pub struct HtmlEscapeFilter;

impl TextFilter for HtmlEscapeFilter {
    fn name(&self) -> &str {
        "html_escape"
    }

    fn process(&self, input: &str) -> String {
        input
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#x27;")
    }
}

/// Filter that converts newlines to `<br>` tags.
pub struct NewlineFilter;

impl TextFilter for NewlineFilter {
    fn name(&self) -> &str {
        "newline"
    }

    fn process(&self, input: &str) -> String {
        input.replace('\n', "<br>\n")
    }
}

/// Filter that sanitizes HTML through ammonia.
///
/// Extends the default allowlist with `iframe` so video embeds survive,
/// restricted to presentation attributes; scripts and event handlers are
/// always stripped.
pub struct SanitizeHtmlFilter;

impl TextFilter for SanitizeHtmlFilter {
    fn name(&self) -> &str {
        "sanitize_html"
    }

    fn process(&self, input: &str) -> String {
        ammonia::Builder::default()
            .add_tags(["iframe"])
            .add_tag_attributes(
                "iframe",
                [
                    "src",
                    "width",
                    "height",
                    "frameborder",
                    "allowfullscreen",
                    "scrolling",
                    "class",
                    "name",
                ],
            )
            .clean(input)
            .to_string()
    }
}

/// Filter that renders Markdown to HTML.
pub struct MarkdownFilter;

impl TextFilter for MarkdownFilter {
    fn name(&self) -> &str {
        "markdown"
    }

    fn process(&self, input: &str) -> String {
        let parser = pulldown_cmark::Parser::new(input);
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, parser);
        html
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_escapes_everything() {
        let out = FilterPipeline::for_format("plain_text").process("<b>hi</b>\nthere");
        assert_eq!(out, "&lt;b&gt;hi&lt;/b&gt;<br>\nthere");
    }

    #[test]
    fn filtered_html_strips_scripts_keeps_iframes() {
        let pipeline = FilterPipeline::for_format("filtered_html");

        let out = pipeline.process("<p>ok</p><script>alert(1)</script>");
        assert!(out.contains("<p>ok</p>"));
        assert!(!out.contains("script"));

        let out = pipeline.process(
            r#"<iframe src="https://example.com/embed" width="560" allowfullscreen onload="x()"></iframe>"#,
        );
        assert!(out.contains("<iframe"));
        assert!(out.contains("width=\"560\""));
        assert!(!out.contains("onload"));
    }

    #[test]
    fn markdown_renders_then_sanitizes() {
        let out = FilterPipeline::for_format("markdown").process("# Title\n\n<script>x</script>");
        assert!(out.contains("<h1>Title</h1>"));
        assert!(!out.contains("script"));
    }

    #[test]
    fn unknown_format_falls_back_to_plain_text() {
        let out = FilterPipeline::for_format("full_html").process("<b>x</b>");
        assert!(!out.contains("<b>"));
    }
}
