//! Layout templates and block-count reconciliation.

mod registry;

pub use registry::{TemplateDescriptor, TemplateRegistry};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::hierarchy::{self, HierarchyError};
use crate::models::{RecordKind, UpdateRecord, meta};
use crate::store::{CHILD_QUERY_LIMIT, ContentStore};

/// Identifier of the default single-column template.
pub const DEFAULT_TEMPLATE: &str = "one-column";

/// Errors from template application.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template {0} is not registered")]
    UnknownTemplate(String),

    #[error("section {0} not found")]
    SectionNotFound(Uuid),

    #[error("storage error")]
    Store(#[from] anyhow::Error),
}

/// What a template application did to a section's block set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub section_id: Uuid,
    pub template_id: String,
    /// Block count before reconciliation.
    pub before: usize,
    /// Block count after reconciliation.
    pub after: usize,
    /// Ids of blocks created, in append order.
    pub created: Vec<Uuid>,
}

/// Apply a template to a section and reconcile its block count.
///
/// Looks up the template's required block count and appends blocks until the
/// section has at least that many. Reconciliation only grows the block set:
/// a template requiring fewer blocks than exist leaves the extras alone.
/// New blocks are titled `Block {index}` and carry zero column weight until
/// the widths endpoint commits a real partition.
pub async fn apply_template(
    store: &dyn ContentStore,
    registry: &TemplateRegistry,
    section_id: Uuid,
    template_id: &str,
) -> Result<ReconciliationReport, TemplateError> {
    let Some(descriptor) = registry.get(template_id) else {
        return Err(TemplateError::UnknownTemplate(template_id.to_string()));
    };

    let section = match store.get(section_id).await? {
        Some(record) if record.kind == RecordKind::Section => record,
        _ => return Err(TemplateError::SectionNotFound(section_id)),
    };

    let before = store.children(section_id, CHILD_QUERY_LIMIT).await?.len();

    let mut created = Vec::new();
    let mut count = before;
    while count < descriptor.blocks {
        let block = hierarchy::add_child(store, section_id, RecordKind::Block)
            .await
            .map_err(|e| match e {
                HierarchyError::Store(inner) => TemplateError::Store(inner),
                other => TemplateError::Store(anyhow::anyhow!(other)),
            })?;
        store
            .update(
                block.id,
                UpdateRecord {
                    title: Some(format!("Block {count}")),
                    ..UpdateRecord::default()
                },
            )
            .await?;
        created.push(block.id);
        count += 1;
    }

    store
        .set_metadata(section.id, meta::TEMPLATE, &descriptor.id)
        .await?;

    info!(
        %section_id,
        template = %descriptor.id,
        created = created.len(),
        "template applied"
    );

    Ok(ReconciliationReport {
        section_id,
        template_id: descriptor.id,
        before,
        after: count,
        created,
    })
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::CreateRecord;
    use crate::store::MemoryStore;

    fn test_registry() -> TemplateRegistry {
        TemplateRegistry::with_descriptors(vec![
            TemplateDescriptor {
                id: "one-column".to_string(),
                label: "One Column".to_string(),
                blocks: 1,
            },
            TemplateDescriptor {
                id: "three-column".to_string(),
                label: "Three Column".to_string(),
                blocks: 3,
            },
        ])
    }

    async fn make_section(store: &MemoryStore) -> Uuid {
        let page = store
            .create(CreateRecord {
                kind: RecordKind::Page,
                parent_id: None,
                order_key: 0,
                title: "Page".to_string(),
                body: None,
                format: None,
            })
            .await
            .unwrap();
        hierarchy::add_child(store, page.id, RecordKind::Section)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn reconciliation_grows_to_required_count() {
        let store = MemoryStore::new();
        let registry = test_registry();
        let section = make_section(&store).await;

        // One existing block.
        let original = hierarchy::add_child(&store, section, RecordKind::Block)
            .await
            .unwrap();

        let report = apply_template(&store, &registry, section, "three-column")
            .await
            .unwrap();
        assert_eq!(report.before, 1);
        assert_eq!(report.after, 3);
        assert_eq!(report.created.len(), 2);

        let blocks = store.children(section, CHILD_QUERY_LIMIT).await.unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].id, original.id);
        assert_eq!(blocks[1].title, "Block 1");
        assert_eq!(blocks[2].title, "Block 2");
    }

    #[tokio::test]
    async fn shrinking_template_never_deletes() {
        let store = MemoryStore::new();
        let registry = test_registry();
        let section = make_section(&store).await;

        apply_template(&store, &registry, section, "three-column")
            .await
            .unwrap();
        let report = apply_template(&store, &registry, section, "one-column")
            .await
            .unwrap();

        assert_eq!(report.before, 3);
        assert_eq!(report.after, 3);
        assert!(report.created.is_empty());

        let metadata = store.metadata(section).await.unwrap();
        assert_eq!(metadata.get(meta::TEMPLATE).map(String::as_str), Some("one-column"));
    }

    #[tokio::test]
    async fn unknown_template_is_rejected() {
        let store = MemoryStore::new();
        let registry = test_registry();
        let section = make_section(&store).await;

        let err = apply_template(&store, &registry, section, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::UnknownTemplate(_)));

        let err = apply_template(&store, &registry, Uuid::now_v7(), "one-column")
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::SectionNotFound(_)));
    }
}
