//! Tera-backed rendering of editor fragments and front-end pages.

use std::path::Path;

use anyhow::{Context, Result};
use tera::Tera;
use tracing::debug;

use crate::composer::{PageSnapshot, SectionSnapshot};
use crate::filter::FilterPipeline;
use crate::layout::TemplateDescriptor;

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    tera: Tera,
}

impl ThemeEngine {
    /// Create a new theme engine loading templates from the given directory.
    pub fn new(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let mut tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;
        Self::register_filters(&mut tera);

        let count = tera.get_template_names().count();
        debug!(count, "loaded templates");

        Ok(Self { tera })
    }

    /// Create a theme engine with no templates (for testing).
    pub fn empty() -> Self {
        let mut tera = Tera::default();
        Self::register_filters(&mut tera);
        Self { tera }
    }

    /// Register custom Tera filters.
    fn register_filters(tera: &mut Tera) {
        // Body text through the format filter pipeline.
        tera.register_filter(
            "text_format",
            |value: &tera::Value, args: &std::collections::HashMap<String, tera::Value>| {
                let text = tera::try_get_value!("text_format", "value", String, value);
                let format = args
                    .get("format")
                    .and_then(|v| v.as_str())
                    .unwrap_or(crate::filter::DEFAULT_FORMAT);

                let pipeline = FilterPipeline::for_format(format);
                Ok(tera::Value::String(pipeline.process(&text)))
            },
        );
    }

    /// Get the underlying Tera instance for custom operations.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Render the full editor page for a page's composition.
    pub fn render_editor_page(
        &self,
        snapshot: &PageSnapshot,
        templates: &[TemplateDescriptor],
    ) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("page", &snapshot.page);
        context.insert("sections", &snapshot.sections);
        context.insert("templates", templates);
        self.tera
            .render("editor.html", &context)
            .context("failed to render editor page")
    }

    /// Render the admin editor fragment for one section.
    pub fn render_admin_section(
        &self,
        snapshot: &SectionSnapshot,
        templates: &[TemplateDescriptor],
    ) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("snapshot", snapshot);
        context.insert("templates", templates);
        self.tera
            .render("admin/section.html", &context)
            .context("failed to render admin section fragment")
    }

    /// Render the block editors fragment for one section.
    pub fn render_admin_blocks(&self, snapshot: &SectionSnapshot) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("snapshot", snapshot);
        self.tera
            .render("admin/blocks.html", &context)
            .context("failed to render admin blocks fragment")
    }

    /// Render the front-end view of a composed page.
    ///
    /// Each section renders through its own template file; a template id with
    /// no file on disk falls back to the default single-column layout.
    pub fn render_page(&self, snapshot: &PageSnapshot) -> Result<String> {
        let mut rendered_sections = Vec::with_capacity(snapshot.sections.len());
        for section in &snapshot.sections {
            rendered_sections.push(self.render_section(section)?);
        }

        let mut context = tera::Context::new();
        context.insert("page", &snapshot.page);
        context.insert("rendered_sections", &rendered_sections);
        self.tera
            .render("page.html", &context)
            .context("failed to render page")
    }

    /// Render one section through its layout template.
    pub fn render_section(&self, snapshot: &SectionSnapshot) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("snapshot", &snapshot);

        let name = format!("sections/{}.html", snapshot.template.id);
        let name = if self.tera.get_template(&name).is_ok() {
            name
        } else {
            debug!(template = %name, "section template missing, using default");
            format!("sections/{}.html", crate::layout::DEFAULT_TEMPLATE)
        };

        self.tera
            .render(&name, &context)
            .with_context(|| format!("failed to render section template {name}"))
    }
}
