//! Typed request/response records for the editor endpoints.
//!
//! One record per endpoint, a closed set: nothing here is free-form. Every
//! mutating request carries the per-action anti-forgery token minted into
//! the editor bootstrap.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::{ReconciliationReport, TemplateDescriptor};
use crate::notices::NoticeTag;

/// Generic acknowledgement for endpoints with no payload to return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Per-action anti-forgery tokens handed to the controller at bootstrap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionTokens {
    pub add_section: String,
    pub remove_section: String,
    pub apply_template: String,
    pub section_order: String,
    pub block_order: String,
    pub block_widths: String,
    pub background: String,
    pub dismiss_notice: String,
}

/// Bootstrap payload for the editor controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorBootstrap {
    pub page_id: Uuid,
    /// Section ids in render order.
    pub section_ids: Vec<Uuid>,
    /// Available layout templates.
    pub templates: Vec<TemplateDescriptor>,
    pub tokens: ActionTokens,
    /// Notices not yet dismissed in this session.
    pub notices: Vec<NoticeTag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSectionRequest {
    pub page_id: Uuid,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSectionResponse {
    pub section_id: Uuid,
    /// Admin editor markup for the new section.
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveSectionRequest {
    pub section_id: Uuid,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyTemplateRequest {
    pub section_id: Uuid,
    pub template_id: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyTemplateResponse {
    pub report: ReconciliationReport,
    /// Refreshed block editor markup for the section.
    pub html: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionOrderRequest {
    pub page_id: Uuid,
    /// Full ordered list of the page's section ids.
    pub section_ids: Vec<Uuid>,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockOrderRequest {
    pub section_id: Uuid,
    /// Full ordered list of the section's block ids.
    pub block_ids: Vec<Uuid>,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockWidthsRequest {
    pub section_id: Uuid,
    /// Committed weight per block; must cover the section exactly.
    pub widths: HashMap<Uuid, i32>,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundRequest {
    /// Section or block id.
    pub target_id: Uuid,
    /// Image to set; `None` clears the background.
    pub image_id: Option<Uuid>,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundResponse {
    pub image_id: Option<Uuid>,
    pub url: Option<String>,
    /// Image title, shown on the picker button.
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DismissNoticeRequest {
    pub notice: NoticeTag,
    pub token: String,
}
