//! Typed block view over a content record and its metadata.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::meta;
use super::record::{ContentRecord, RecordKind};

/// A block together with its column metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    /// The underlying content record.
    pub record: ContentRecord,

    /// Raw per-record metadata.
    pub metadata: HashMap<String, String>,
}

impl Block {
    /// Wrap a record and its metadata. Returns `None` for non-block records.
    pub fn from_record(record: ContentRecord, metadata: HashMap<String, String>) -> Option<Self> {
        if record.kind != RecordKind::Block {
            return None;
        }
        Some(Self { record, metadata })
    }

    pub fn id(&self) -> Uuid {
        self.record.id
    }

    /// Persisted column-width weight. Freshly reconciled blocks carry 0
    /// until the widths endpoint commits a real partition.
    pub fn weight(&self) -> i32 {
        self.metadata
            .get(meta::WEIGHT)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    /// Background image reference, when set to a valid UUID.
    pub fn background_image(&self) -> Option<Uuid> {
        self.metadata
            .get(meta::BACKGROUND_IMAGE)
            .and_then(|v| v.parse().ok())
    }
}
