//! Typed section view over a content record and its metadata.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::meta;
use super::record::{ContentRecord, RecordKind};
use crate::layout::DEFAULT_TEMPLATE;

/// A section together with its layout metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    /// The underlying content record.
    pub record: ContentRecord,

    /// Raw per-record metadata.
    pub metadata: HashMap<String, String>,
}

impl Section {
    /// Wrap a record and its metadata. Returns `None` for non-section records.
    pub fn from_record(record: ContentRecord, metadata: HashMap<String, String>) -> Option<Self> {
        if record.kind != RecordKind::Section {
            return None;
        }
        Some(Self { record, metadata })
    }

    pub fn id(&self) -> Uuid {
        self.record.id
    }

    /// Persisted template identifier, if any.
    pub fn template_id(&self) -> Option<&str> {
        self.metadata.get(meta::TEMPLATE).map(String::as_str)
    }

    /// Template identifier, falling back to the default single-column layout.
    pub fn template_or_default(&self) -> &str {
        self.template_id().unwrap_or(DEFAULT_TEMPLATE)
    }

    /// Free-form CSS class for the section wrapper.
    pub fn css_class(&self) -> Option<&str> {
        self.metadata.get(meta::CSS_CLASS).map(String::as_str)
    }

    /// Grid offset, when set to a parseable integer.
    pub fn offset(&self) -> i32 {
        self.metadata
            .get(meta::OFFSET)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Whether the section title should be rendered on the front end.
    pub fn title_display(&self) -> bool {
        self.metadata.get(meta::TITLE_DISPLAY).map(String::as_str) == Some("1")
    }

    /// Push/pull column ordering flag.
    pub fn push_pull(&self) -> bool {
        self.metadata.get(meta::PUSH_PULL).map(String::as_str) == Some("1")
    }

    /// Background image reference, when set to a valid UUID.
    pub fn background_image(&self) -> Option<Uuid> {
        self.metadata
            .get(meta::BACKGROUND_IMAGE)
            .and_then(|v| v.parse().ok())
    }
}
