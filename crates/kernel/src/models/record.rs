//! Content record model.
//!
//! Pages, sections, and blocks are all content records distinguished by
//! [`RecordKind`]; ordering among siblings is carried by `order_key` and
//! everything layout-specific (template, css class, column weight, background)
//! lives in per-record metadata.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a content record is within the page hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A page, the host-owned root of a composition.
    Page,
    /// A content region belonging to a page.
    Section,
    /// A sub-region belonging to a section, arranged in columns.
    Block,
}

impl RecordKind {
    /// Machine name used in storage and wire payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Page => "page",
            RecordKind::Section => "section",
            RecordKind::Block => "block",
        }
    }

    /// Parse a machine name back into a kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "page" => Some(RecordKind::Page),
            "section" => Some(RecordKind::Section),
            "block" => Some(RecordKind::Block),
            _ => None,
        }
    }

    /// The kind of children this kind may own.
    pub fn child_kind(&self) -> Option<RecordKind> {
        match self {
            RecordKind::Page => Some(RecordKind::Section),
            RecordKind::Section => Some(RecordKind::Block),
            RecordKind::Block => None,
        }
    }
}

/// A stored content record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Record kind (page, section, or block).
    pub kind: RecordKind,

    /// Parent record. `None` only for pages.
    pub parent_id: Option<Uuid>,

    /// Render position among siblings. Unique within a sibling set;
    /// gaps are permitted, comparison order is what matters.
    pub order_key: i32,

    /// Record title.
    pub title: String,

    /// Body text, interpreted per `format`.
    pub body: String,

    /// Text format for the body (`plain_text`, `filtered_html`, `markdown`).
    pub format: String,

    /// Unix timestamp when created.
    pub created: i64,

    /// Unix timestamp when last changed.
    pub changed: i64,
}

/// Input for creating a new content record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecord {
    pub kind: RecordKind,
    pub parent_id: Option<Uuid>,
    pub order_key: i32,
    pub title: String,
    pub body: Option<String>,
    pub format: Option<String>,
}

/// Input for updating a content record. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecord {
    pub title: Option<String>,
    pub body: Option<String>,
    pub format: Option<String>,
}

impl ContentRecord {
    /// Build a record from creation input, stamping id and timestamps.
    pub fn from_input(input: CreateRecord) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: Uuid::now_v7(),
            kind: input.kind,
            parent_id: input.parent_id,
            order_key: input.order_key,
            title: input.title,
            body: input.body.unwrap_or_default(),
            format: input
                .format
                .unwrap_or_else(|| crate::filter::DEFAULT_FORMAT.to_string()),
            created: now,
            changed: now,
        }
    }
}
