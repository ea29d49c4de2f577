//! Parent/child integrity for the page → section → block tree.

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{ContentRecord, CreateRecord, RecordKind};
use crate::ordering;
use crate::store::{CHILD_QUERY_LIMIT, ContentStore};

/// Errors from hierarchy mutations.
#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error("parent {0} not found")]
    ParentNotFound(Uuid),

    #[error("record {0} not found")]
    NotFound(Uuid),

    #[error("{child} records cannot nest under a {parent}")]
    WrongKind {
        parent: &'static str,
        child: &'static str,
    },

    #[error("permission denied")]
    PermissionDenied,

    #[error("storage error")]
    Store(#[from] anyhow::Error),
}

/// Create a new child of `kind` under `parent_id`, appended after the
/// current maximum order key.
///
/// Only the nesting the tree allows is accepted: sections under pages,
/// blocks under sections.
pub async fn add_child(
    store: &dyn ContentStore,
    parent_id: Uuid,
    kind: RecordKind,
) -> Result<ContentRecord, HierarchyError> {
    let Some(parent) = store.get(parent_id).await? else {
        return Err(HierarchyError::ParentNotFound(parent_id));
    };

    if parent.kind.child_kind() != Some(kind) {
        return Err(HierarchyError::WrongKind {
            parent: parent.kind.as_str(),
            child: kind.as_str(),
        });
    }

    let order_key = ordering::next_order_key(store, parent_id).await?;
    let record = store
        .create(CreateRecord {
            kind,
            parent_id: Some(parent_id),
            order_key,
            title: String::new(),
            body: None,
            format: None,
        })
        .await?;

    info!(id = %record.id, kind = kind.as_str(), %parent_id, order_key, "child created");
    Ok(record)
}

/// Delete a child record. A section cascades to all of its blocks.
///
/// Not idempotent: a missing id fails with [`HierarchyError::NotFound`] so
/// double submits surface instead of being masked. Pages are host-owned and
/// blocks are destroyed only through their section; both are refused.
pub async fn remove_child(
    store: &dyn ContentStore,
    child_id: Uuid,
) -> Result<(), HierarchyError> {
    let Some(child) = store.get(child_id).await? else {
        return Err(HierarchyError::NotFound(child_id));
    };

    match child.kind {
        RecordKind::Section => {}
        RecordKind::Page | RecordKind::Block => {
            return Err(HierarchyError::WrongKind {
                parent: "remove",
                child: child.kind.as_str(),
            });
        }
    }

    let blocks = store.children(child_id, CHILD_QUERY_LIMIT).await?;
    for block in &blocks {
        store.delete(block.id).await?;
    }
    store.delete(child_id).await?;

    info!(id = %child_id, cascaded_blocks = blocks.len(), "section removed");
    Ok(())
}
