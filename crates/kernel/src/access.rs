//! Edit-capability collaborator.
//!
//! Authentication lives in the host CMS; the kernel only asks whether the
//! current actor may edit a given page before mutating its composition.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Capability check delegated to the host.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Whether the current actor may edit the given page's composition.
    async fn can_edit(&self, page_id: Uuid) -> Result<bool>;
}

/// Policy that permits everything. Suitable for the single-editor demo
/// server where the host has already authenticated the request.
pub struct AllowAll;

#[async_trait]
impl AccessPolicy for AllowAll {
    async fn can_edit(&self, _page_id: Uuid) -> Result<bool> {
        Ok(true)
    }
}

/// Policy that denies everything. Used in tests.
pub struct DenyAll;

#[async_trait]
impl AccessPolicy for DenyAll {
    async fn can_edit(&self, _page_id: Uuid) -> Result<bool> {
        Ok(false)
    }
}
