//! File-based template registry.
//!
//! Section layout templates are plain template files whose header comments
//! declare a display label and a required block count:
//!
//! ```text
//! {# Section Template: Two Column #}
//! {# Section Blocks: 2 #}
//! ```
//!
//! Files without a `Section Template:` header are skipped. A missing
//! `Section Blocks:` header defaults to one block.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use dashmap::DashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::DEFAULT_TEMPLATE;

static TEMPLATE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    let re = Regex::new(r"(?mi)Section Template:(.*)$").expect("template header regex is valid");
    re
});

static BLOCKS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    let re =
        Regex::new(r"(?mi)Section Blocks: ?([0-9]{1,2})").expect("blocks header regex is valid");
    re
});

/// A registered layout template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    /// Identifier: the template's file stem.
    pub id: String,
    /// Display label from the header comment.
    pub label: String,
    /// Number of blocks the template renders.
    pub blocks: usize,
}

impl TemplateDescriptor {
    /// Descriptor for the built-in single-column fallback.
    pub fn default_template() -> Self {
        Self {
            id: DEFAULT_TEMPLATE.to_string(),
            label: "One Column".to_string(),
            blocks: 1,
        }
    }
}

/// Registry of section layout templates discovered on disk.
pub struct TemplateRegistry {
    dir: Option<PathBuf>,
    descriptors: DashMap<String, TemplateDescriptor>,
}

impl TemplateRegistry {
    /// Scan `dir` for template files and build the registry.
    ///
    /// A missing directory yields an empty registry (surfaced to editors as
    /// a missing-templates notice) rather than an error.
    pub fn scan(dir: &Path) -> Result<Self> {
        let registry = Self {
            dir: Some(dir.to_path_buf()),
            descriptors: DashMap::new(),
        };
        registry.reload()?;
        Ok(registry)
    }

    /// Build a registry from fixed descriptors. Intended for tests.
    pub fn with_descriptors(descriptors: Vec<TemplateDescriptor>) -> Self {
        let map = DashMap::new();
        for descriptor in descriptors {
            map.insert(descriptor.id.clone(), descriptor);
        }
        Self {
            dir: None,
            descriptors: map,
        }
    }

    /// Re-scan the template directory, replacing the registered set.
    pub fn reload(&self) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };

        let mut found = Vec::new();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "template directory unreadable");
                self.descriptors.clear();
                return Ok(());
            }
        };

        for entry in entries {
            let entry = entry.context("failed to read template directory entry")?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            match parse_template_file(&path) {
                Ok(Some(descriptor)) => found.push(descriptor),
                Ok(None) => {
                    debug!(file = %path.display(), "no template header, skipping");
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "failed to parse template file");
                }
            }
        }

        self.descriptors.clear();
        for descriptor in found {
            self.descriptors.insert(descriptor.id.clone(), descriptor);
        }

        debug!(count = self.descriptors.len(), "template registry loaded");
        Ok(())
    }

    /// Look up a template by identifier.
    pub fn get(&self, id: &str) -> Option<TemplateDescriptor> {
        self.descriptors.get(id).map(|d| d.clone())
    }

    /// A section's descriptor: the registered template, or the single-column
    /// fallback when the id is absent or no longer on disk.
    pub fn get_or_default(&self, id: &str) -> TemplateDescriptor {
        self.get(id)
            .unwrap_or_else(TemplateDescriptor::default_template)
    }

    /// All registered templates, sorted by identifier.
    pub fn list(&self) -> Vec<TemplateDescriptor> {
        let mut templates: Vec<TemplateDescriptor> =
            self.descriptors.iter().map(|d| d.clone()).collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        templates
    }

    /// Whether the scan found no template files at all.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Parse one template file's header comments into a descriptor.
fn parse_template_file(path: &Path) -> Result<Option<TemplateDescriptor>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let Some(header) = TEMPLATE_HEADER.captures(&contents) else {
        return Ok(None);
    };
    let label = cleanup_header(&header[1]);
    if label.is_empty() {
        return Ok(None);
    }

    let blocks = BLOCKS_HEADER
        .captures(&contents)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(1);

    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .context("template file has no stem")?
        .to_string();

    Ok(Some(TemplateDescriptor { id, label, blocks }))
}

/// Strip comment-closing noise from a captured header value.
fn cleanup_header(raw: &str) -> String {
    raw.trim()
        .trim_end_matches("#}")
        .trim_end_matches("-->")
        .trim_end_matches("*/")
        .trim()
        .to_string()
}
