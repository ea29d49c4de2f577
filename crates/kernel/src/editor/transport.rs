//! Transport seam between the editor controller and the server endpoints.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::composer::ComposerService;
use crate::protocol::{
    Ack, AddSectionRequest, AddSectionResponse, ApplyTemplateRequest, ApplyTemplateResponse,
    BackgroundRequest, BackgroundResponse, BlockOrderRequest, BlockWidthsRequest,
    DismissNoticeRequest, RemoveSectionRequest, SectionOrderRequest,
};
use crate::theme::ThemeEngine;

/// Transport-level failures surfaced to the controller.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Failed(String),

    #[error("unparseable response: {0}")]
    Unparseable(String),
}

impl TransportError {
    fn failed(e: impl std::fmt::Display) -> Self {
        Self::Failed(e.to_string())
    }
}

/// One method per endpoint; the controller never sees anything less typed.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn add_section(
        &self,
        request: AddSectionRequest,
    ) -> Result<AddSectionResponse, TransportError>;

    async fn remove_section(&self, request: RemoveSectionRequest) -> Result<Ack, TransportError>;

    async fn apply_template(
        &self,
        request: ApplyTemplateRequest,
    ) -> Result<ApplyTemplateResponse, TransportError>;

    async fn section_order(&self, request: SectionOrderRequest) -> Result<Ack, TransportError>;

    async fn block_order(&self, request: BlockOrderRequest) -> Result<Ack, TransportError>;

    async fn block_widths(&self, request: BlockWidthsRequest) -> Result<Ack, TransportError>;

    async fn background(
        &self,
        request: BackgroundRequest,
    ) -> Result<BackgroundResponse, TransportError>;

    async fn dismiss_notice(&self, request: DismissNoticeRequest) -> Result<Ack, TransportError>;
}

/// Transport that calls the composer in-process.
///
/// Used by the demo server and tests; token verification is an HTTP-boundary
/// concern and does not apply here.
pub struct DirectTransport {
    composer: ComposerService,
    theme: Arc<ThemeEngine>,
}

impl DirectTransport {
    pub fn new(composer: ComposerService, theme: Arc<ThemeEngine>) -> Self {
        Self { composer, theme }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    async fn add_section(
        &self,
        request: AddSectionRequest,
    ) -> Result<AddSectionResponse, TransportError> {
        let section = self
            .composer
            .add_section(request.page_id)
            .await
            .map_err(TransportError::failed)?;
        let snapshot = self
            .composer
            .section_snapshot(section.id())
            .await
            .map_err(TransportError::failed)?;
        let html = self
            .theme
            .render_admin_section(&snapshot, &self.composer.registry().list())
            .unwrap_or_default();
        Ok(AddSectionResponse {
            section_id: section.id(),
            html,
        })
    }

    async fn remove_section(&self, request: RemoveSectionRequest) -> Result<Ack, TransportError> {
        self.composer
            .remove_section(request.section_id)
            .await
            .map_err(TransportError::failed)?;
        Ok(Ack::ok())
    }

    async fn apply_template(
        &self,
        request: ApplyTemplateRequest,
    ) -> Result<ApplyTemplateResponse, TransportError> {
        let report = self
            .composer
            .apply_template(request.section_id, &request.template_id)
            .await
            .map_err(TransportError::failed)?;
        let snapshot = self
            .composer
            .section_snapshot(request.section_id)
            .await
            .map_err(TransportError::failed)?;
        let html = self.theme.render_admin_blocks(&snapshot).unwrap_or_default();
        Ok(ApplyTemplateResponse { report, html })
    }

    async fn section_order(&self, request: SectionOrderRequest) -> Result<Ack, TransportError> {
        self.composer
            .set_section_order(request.page_id, &request.section_ids)
            .await
            .map_err(TransportError::failed)?;
        Ok(Ack::ok())
    }

    async fn block_order(&self, request: BlockOrderRequest) -> Result<Ack, TransportError> {
        self.composer
            .set_block_order(request.section_id, &request.block_ids)
            .await
            .map_err(TransportError::failed)?;
        Ok(Ack::ok())
    }

    async fn block_widths(&self, request: BlockWidthsRequest) -> Result<Ack, TransportError> {
        self.composer
            .set_block_widths(request.section_id, &request.widths)
            .await
            .map_err(TransportError::failed)?;
        Ok(Ack::ok())
    }

    async fn background(
        &self,
        request: BackgroundRequest,
    ) -> Result<BackgroundResponse, TransportError> {
        let image = self
            .composer
            .set_background(request.target_id, request.image_id)
            .await
            .map_err(TransportError::failed)?;
        Ok(BackgroundResponse {
            image_id: image.as_ref().map(|i| i.id),
            url: image.as_ref().map(|i| i.url.clone()),
            title: image.map(|i| i.title),
        })
    }

    async fn dismiss_notice(&self, _request: DismissNoticeRequest) -> Result<Ack, TransportError> {
        // Dismissals persist in the HTTP session; in-process there is none.
        Ok(Ack::ok())
    }
}
