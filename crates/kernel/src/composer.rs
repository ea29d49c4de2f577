//! Page-composition service.
//!
//! [`ComposerService`] is the façade the endpoints call: it wires the content
//! store, template registry, media library, and access policy together and
//! owns the read models (snapshots) the theme renders from.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::access::AccessPolicy;
use crate::columns::{self, WidthError};
use crate::hierarchy::{self, HierarchyError};
use crate::layout::{self, ReconciliationReport, TemplateDescriptor, TemplateError, TemplateRegistry};
use crate::media::{MediaImage, MediaLibrary};
use crate::models::{Block, ContentRecord, RecordKind, Section, meta};
use crate::ordering::{self, OrderError};
use crate::store::{CHILD_QUERY_LIMIT, ContentStore};
use crate::theme::background_style;

/// Service for composing pages out of sections and blocks.
#[derive(Clone)]
pub struct ComposerService {
    inner: Arc<ComposerInner>,
}

struct ComposerInner {
    store: Arc<dyn ContentStore>,
    registry: Arc<TemplateRegistry>,
    media: Arc<dyn MediaLibrary>,
    policy: Arc<dyn AccessPolicy>,
}

/// A block prepared for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct BlockSnapshot {
    pub block: Block,
    /// Weight the row actually renders with (valid partition or even split).
    pub weight: i32,
    pub background_url: Option<String>,
    /// Inline style attribute, empty without a background.
    pub background_style: String,
}

/// A section prepared for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SectionSnapshot {
    pub section: Section,
    pub template: TemplateDescriptor,
    /// Wrapper CSS class, empty when unset.
    pub css_class: String,
    pub offset: i32,
    pub title_display: bool,
    pub push_pull: bool,
    pub background_url: Option<String>,
    pub background_title: Option<String>,
    /// Inline style attribute, empty without a background.
    pub background_style: String,
    pub blocks: Vec<BlockSnapshot>,
}

/// A full page prepared for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct PageSnapshot {
    pub page: ContentRecord,
    pub sections: Vec<SectionSnapshot>,
}

impl ComposerService {
    pub fn new(
        store: Arc<dyn ContentStore>,
        registry: Arc<TemplateRegistry>,
        media: Arc<dyn MediaLibrary>,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            inner: Arc::new(ComposerInner {
                store,
                registry,
                media,
                policy,
            }),
        }
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.inner.store.as_ref()
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.inner.registry
    }

    /// Check the edit capability for a page, failing with
    /// [`HierarchyError::PermissionDenied`].
    pub async fn ensure_can_edit(&self, page_id: Uuid) -> Result<(), HierarchyError> {
        if self.inner.policy.can_edit(page_id).await? {
            Ok(())
        } else {
            Err(HierarchyError::PermissionDenied)
        }
    }

    /// Walk up to the owning page of any record.
    pub async fn page_of(&self, record_id: Uuid) -> Result<Uuid, HierarchyError> {
        let mut current = record_id;
        // Bounded by the tree depth (page -> section -> block).
        for _ in 0..3 {
            let Some(record) = self.inner.store.get(current).await? else {
                return Err(HierarchyError::NotFound(current));
            };
            match record.parent_id {
                None if record.kind == RecordKind::Page => return Ok(record.id),
                None => return Err(HierarchyError::ParentNotFound(current)),
                Some(parent) => current = parent,
            }
        }
        Err(HierarchyError::ParentNotFound(record_id))
    }

    /// Create a new section at the end of a page's order.
    pub async fn add_section(&self, page_id: Uuid) -> Result<Section, HierarchyError> {
        self.ensure_can_edit(page_id).await?;
        let record = hierarchy::add_child(self.store(), page_id, RecordKind::Section).await?;
        let metadata = self.inner.store.metadata(record.id).await?;
        Section::from_record(record, metadata)
            .ok_or_else(|| HierarchyError::Store(anyhow::anyhow!("created record is not a section")))
    }

    /// Remove a section and all of its blocks.
    pub async fn remove_section(&self, section_id: Uuid) -> Result<(), HierarchyError> {
        let page_id = self.page_of(section_id).await?;
        self.ensure_can_edit(page_id).await?;
        hierarchy::remove_child(self.store(), section_id).await
    }

    /// Apply a template to a section, reconciling its block count.
    pub async fn apply_template(
        &self,
        section_id: Uuid,
        template_id: &str,
    ) -> Result<ReconciliationReport, TemplateError> {
        layout::apply_template(self.store(), &self.inner.registry, section_id, template_id).await
    }

    /// Persist a full section order for a page.
    pub async fn set_section_order(
        &self,
        page_id: Uuid,
        section_ids: &[Uuid],
    ) -> Result<(), OrderError> {
        self.require_kind(page_id, RecordKind::Page)
            .await
            .map_err(|_| OrderError::ParentNotFound(page_id))?;
        ordering::set_order(self.store(), page_id, section_ids).await
    }

    /// Persist a full block order for a section.
    pub async fn set_block_order(
        &self,
        section_id: Uuid,
        block_ids: &[Uuid],
    ) -> Result<(), OrderError> {
        self.require_kind(section_id, RecordKind::Section)
            .await
            .map_err(|_| OrderError::ParentNotFound(section_id))?;
        ordering::set_order(self.store(), section_id, block_ids).await
    }

    /// Persist a committed column-width map for a section's blocks.
    pub async fn set_block_widths(
        &self,
        section_id: Uuid,
        widths: &HashMap<Uuid, i32>,
    ) -> Result<(), WidthError> {
        self.require_kind(section_id, RecordKind::Section)
            .await
            .map_err(|_| WidthError::SectionNotFound(section_id))?;

        let blocks: Vec<Uuid> = self
            .inner
            .store
            .children(section_id, CHILD_QUERY_LIMIT)
            .await?
            .iter()
            .map(|r| r.id)
            .collect();
        columns::validate_widths(&blocks, widths)?;

        for (block_id, weight) in widths {
            self.inner
                .store
                .set_metadata(*block_id, meta::WEIGHT, &weight.to_string())
                .await?;
        }

        info!(%section_id, blocks = widths.len(), "column widths committed");
        Ok(())
    }

    /// Set or clear the background image of a section or block.
    ///
    /// Returns the resolved image when one was set.
    pub async fn set_background(
        &self,
        target_id: Uuid,
        image_id: Option<Uuid>,
    ) -> Result<Option<MediaImage>, HierarchyError> {
        let Some(target) = self.inner.store.get(target_id).await? else {
            return Err(HierarchyError::NotFound(target_id));
        };
        if target.kind == RecordKind::Page {
            return Err(HierarchyError::WrongKind {
                parent: "background",
                child: target.kind.as_str(),
            });
        }

        match image_id {
            Some(image_id) => {
                let Some(image) = self.inner.media.resolve(image_id).await? else {
                    return Err(HierarchyError::NotFound(image_id));
                };
                self.inner
                    .store
                    .set_metadata(target_id, meta::BACKGROUND_IMAGE, &image_id.to_string())
                    .await?;
                info!(%target_id, %image_id, "background set");
                Ok(Some(image))
            }
            None => {
                self.inner
                    .store
                    .remove_metadata(target_id, meta::BACKGROUND_IMAGE)
                    .await?;
                info!(%target_id, "background cleared");
                Ok(None)
            }
        }
    }

    /// Load a section view.
    pub async fn section(&self, section_id: Uuid) -> Result<Section, HierarchyError> {
        let record = self.require_kind(section_id, RecordKind::Section).await?;
        let metadata = self.inner.store.metadata(section_id).await?;
        Section::from_record(record, metadata)
            .ok_or_else(|| HierarchyError::NotFound(section_id))
    }

    /// Build the render model for one section.
    pub async fn section_snapshot(
        &self,
        section_id: Uuid,
    ) -> Result<SectionSnapshot, HierarchyError> {
        let section = self.section(section_id).await?;
        let template = self.inner.registry.get_or_default(section.template_or_default());

        let records = self
            .inner
            .store
            .children(section_id, CHILD_QUERY_LIMIT)
            .await?;
        let mut blocks = Vec::with_capacity(records.len());
        for record in records {
            let metadata = self.inner.store.metadata(record.id).await?;
            if let Some(block) = Block::from_record(record, metadata) {
                blocks.push(block);
            }
        }

        let persisted: Vec<i32> = blocks.iter().map(Block::weight).collect();
        let effective = columns::effective_weights(&persisted);

        let mut block_snapshots = Vec::with_capacity(blocks.len());
        for (block, weight) in blocks.into_iter().zip(effective) {
            let url = self.resolve_background(block.background_image()).await?;
            block_snapshots.push(BlockSnapshot {
                weight,
                background_style: background_style(url.as_ref().map(|i| i.url.as_str())),
                background_url: url.as_ref().map(|i| i.url.clone()),
                block,
            });
        }

        let background = self.resolve_background(section.background_image()).await?;
        Ok(SectionSnapshot {
            css_class: section.css_class().unwrap_or_default().to_string(),
            offset: section.offset(),
            title_display: section.title_display(),
            push_pull: section.push_pull(),
            background_style: background_style(
                background.as_ref().map(|i| i.url.as_str()),
            ),
            background_url: background.as_ref().map(|i| i.url.clone()),
            background_title: background.map(|i| i.title),
            section,
            template,
            blocks: block_snapshots,
        })
    }

    /// Build the render model for a whole page.
    ///
    /// A missing page is fatal; there is no partial render.
    pub async fn page_snapshot(&self, page_id: Uuid) -> Result<PageSnapshot, HierarchyError> {
        let page = self.require_kind(page_id, RecordKind::Page).await?;

        let sections = self
            .inner
            .store
            .children(page_id, CHILD_QUERY_LIMIT)
            .await?;
        let mut snapshots = Vec::with_capacity(sections.len());
        for section in sections {
            snapshots.push(self.section_snapshot(section.id).await?);
        }

        Ok(PageSnapshot {
            page,
            sections: snapshots,
        })
    }

    async fn require_kind(
        &self,
        id: Uuid,
        kind: RecordKind,
    ) -> Result<ContentRecord, HierarchyError> {
        match self.inner.store.get(id).await? {
            Some(record) if record.kind == kind => Ok(record),
            _ => Err(HierarchyError::NotFound(id)),
        }
    }

    async fn resolve_background(
        &self,
        image_id: Option<Uuid>,
    ) -> Result<Option<MediaImage>, HierarchyError> {
        match image_id {
            // A deleted library image renders as no background rather than
            // failing the whole page.
            Some(id) => Ok(self.inner.media.resolve(id).await?),
            None => Ok(None),
        }
    }
}
