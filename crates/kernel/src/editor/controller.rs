//! Editor controller: an explicit state machine over the transport.
//!
//! The controller is pure view coordination. It owns no invariants beyond
//! its own mode; ordering, hierarchy, and width rules are enforced
//! server-side. Gestures arrive as [`UiEvent`]s through a single
//! [`EditorController::dispatch`] entry point, which serializes transport
//! calls: one event's request completes (or fails) before the next runs.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::columns;
use crate::notices::NoticeTag;
use crate::protocol::{
    AddSectionRequest, ApplyTemplateRequest, BackgroundRequest, BlockOrderRequest,
    BlockWidthsRequest, DismissNoticeRequest, EditorBootstrap, RemoveSectionRequest,
    SectionOrderRequest,
};

use super::frames::MediaFrames;
use super::transport::Transport;

/// Title shown when an editor empties the title field.
const NO_TITLE: &str = "No Title";

/// Client-visible editing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// Editing enabled; click-to-add-section active.
    Idle,
    /// Drag handles active; add/edit disabled. "Save Order" is the only exit.
    Reordering,
}

/// A captured DOM gesture.
#[derive(Debug, Clone)]
pub enum UiEvent {
    AddSection,
    RemoveSection(Uuid),
    EditTitle { section_id: Uuid, title: String },
    ChooseTemplate { section_id: Uuid, template_id: String },
    BeginReorder,
    /// A drop inside a reorder session; carries the full current order.
    Drop { ordered: Vec<Uuid> },
    SaveOrder,
    ReorderBlocks { section_id: Uuid, ordered: Vec<Uuid> },
    /// A released divider drag; carries the row's blocks in render order and
    /// the raw divider positions.
    DragDividers {
        section_id: Uuid,
        blocks: Vec<Uuid>,
        dividers: Vec<i32>,
    },
    CommitWidths { section_id: Uuid, widths: HashMap<Uuid, i32> },
    ChooseBackground { target_id: Uuid, current: Option<Uuid> },
    SelectImage { target_id: Uuid, image_id: Option<Uuid> },
    DismissNotice(NoticeTag),
}

/// Rich-text editor host: attach/detach editors by DOM target identifier.
pub trait EditorHost: Send + Sync {
    fn attach(&self, target_id: &str);
    fn detach(&self, target_id: &str);
}

/// Host that does nothing (headless tests, server-side use).
pub struct NullEditorHost;

impl EditorHost for NullEditorHost {
    fn attach(&self, _target_id: &str) {}
    fn detach(&self, _target_id: &str) {}
}

/// The admin-side controller for one page's composition.
pub struct EditorController {
    bootstrap: EditorBootstrap,
    mode: EditorMode,
    sections: Vec<Uuid>,
    /// Local heading text per section; the host CMS persists titles.
    titles: HashMap<Uuid, String>,
    /// Picker button labels per target (the chosen image's title).
    background_labels: HashMap<Uuid, String>,
    /// Targets with a request in flight (busy indicator).
    busy: HashSet<Uuid>,
    /// Page-level busy indicator (add section, order saves).
    page_busy: bool,
    /// At most one save-order request in flight per reorder session.
    order_save_in_flight: bool,
    notices: Vec<NoticeTag>,
    /// Failure messages surfaced to the editor.
    failures: Vec<String>,
    frames: MediaFrames,
    transport: Arc<dyn Transport>,
    host: Arc<dyn EditorHost>,
}

impl EditorController {
    pub fn new(
        bootstrap: EditorBootstrap,
        frames: MediaFrames,
        transport: Arc<dyn Transport>,
        host: Arc<dyn EditorHost>,
    ) -> Self {
        Self {
            mode: EditorMode::Idle,
            sections: bootstrap.section_ids.clone(),
            titles: HashMap::new(),
            background_labels: HashMap::new(),
            busy: HashSet::new(),
            page_busy: false,
            order_save_in_flight: false,
            notices: bootstrap.notices.clone(),
            failures: Vec::new(),
            frames,
            transport,
            host,
            bootstrap,
        }
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn sections(&self) -> &[Uuid] {
        &self.sections
    }

    /// Reorder affordance: disabled until the page has a second section.
    pub fn reorder_enabled(&self) -> bool {
        self.sections.len() > 1
    }

    /// Heading text for a section, with the empty-title fallback.
    pub fn heading(&self, section_id: Uuid) -> &str {
        self.titles
            .get(&section_id)
            .map(String::as_str)
            .unwrap_or(NO_TITLE)
    }

    pub fn background_label(&self, target_id: Uuid) -> Option<&str> {
        self.background_labels.get(&target_id).map(String::as_str)
    }

    pub fn is_busy(&self, target_id: Uuid) -> bool {
        self.busy.contains(&target_id)
    }

    pub fn is_page_busy(&self) -> bool {
        self.page_busy
    }

    pub fn notices(&self) -> &[NoticeTag] {
        &self.notices
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn frames(&self) -> &MediaFrames {
        &self.frames
    }

    /// Single dispatch entry point for all gestures.
    ///
    /// Events that are invalid in the current mode are dropped: the
    /// affordances that should have prevented them are advisory only.
    pub async fn dispatch(&mut self, event: UiEvent) {
        match (self.mode, event) {
            (EditorMode::Idle, UiEvent::AddSection) => self.add_section().await,
            (EditorMode::Idle, UiEvent::RemoveSection(section_id)) => {
                self.remove_section(section_id).await;
            }
            (EditorMode::Idle, UiEvent::EditTitle { section_id, title }) => {
                self.edit_title(section_id, title);
            }
            (
                EditorMode::Idle,
                UiEvent::ChooseTemplate {
                    section_id,
                    template_id,
                },
            ) => self.choose_template(section_id, template_id).await,
            (EditorMode::Idle, UiEvent::BeginReorder) => {
                if self.reorder_enabled() {
                    self.mode = EditorMode::Reordering;
                }
            }
            (EditorMode::Reordering, UiEvent::Drop { ordered }) => {
                self.drop_commit(ordered).await;
            }
            (EditorMode::Reordering, UiEvent::SaveOrder) => self.save_order().await,
            (EditorMode::Idle, UiEvent::ReorderBlocks { section_id, ordered }) => {
                self.reorder_blocks(section_id, ordered).await;
            }
            (
                EditorMode::Idle,
                UiEvent::DragDividers {
                    section_id,
                    blocks,
                    dividers,
                },
            ) => self.drag_dividers(section_id, blocks, dividers).await,
            (EditorMode::Idle, UiEvent::CommitWidths { section_id, widths }) => {
                self.commit_widths(section_id, widths).await;
            }
            (EditorMode::Idle, UiEvent::ChooseBackground { target_id, current }) => {
                self.frames.open(target_id, current);
            }
            (EditorMode::Idle, UiEvent::SelectImage { target_id, image_id }) => {
                self.select_image(target_id, image_id).await;
            }
            (_, UiEvent::DismissNotice(tag)) => self.dismiss_notice(tag).await,
            (mode, event) => {
                debug!(?mode, ?event, "event ignored in current mode");
            }
        }
    }

    fn record_failure(&mut self, action: &str, error: impl std::fmt::Display) {
        // The busy indicator is already cleared by the caller; the optimistic
        // view state is not rolled back, but the failure is surfaced.
        self.failures.push(format!("{action}: {error}"));
    }

    async fn add_section(&mut self) {
        self.page_busy = true;
        let request = AddSectionRequest {
            page_id: self.bootstrap.page_id,
            token: self.bootstrap.tokens.add_section.clone(),
        };
        match self.transport.add_section(request).await {
            Ok(response) => {
                self.sections.push(response.section_id);
                self.host
                    .attach(&editor_target(response.section_id));
            }
            Err(e) => self.record_failure("add section", e),
        }
        self.page_busy = false;
    }

    async fn remove_section(&mut self, section_id: Uuid) {
        self.busy.insert(section_id);
        let request = RemoveSectionRequest {
            section_id,
            token: self.bootstrap.tokens.remove_section.clone(),
        };
        match self.transport.remove_section(request).await {
            Ok(_) => {
                self.host.detach(&editor_target(section_id));
                self.sections.retain(|id| *id != section_id);
                self.titles.remove(&section_id);
            }
            Err(e) => self.record_failure("remove section", e),
        }
        self.busy.remove(&section_id);
    }

    fn edit_title(&mut self, section_id: Uuid, title: String) {
        // Local only; the host CMS persists titles with its own save.
        let heading = if title.trim().is_empty() {
            NO_TITLE.to_string()
        } else {
            title
        };
        self.titles.insert(section_id, heading);
    }

    async fn choose_template(&mut self, section_id: Uuid, template_id: String) {
        self.busy.insert(section_id);
        let request = ApplyTemplateRequest {
            section_id,
            template_id,
            token: self.bootstrap.tokens.apply_template.clone(),
        };
        match self.transport.apply_template(request).await {
            Ok(_response) => {
                // Markup was replaced; cycle the rich-text editors.
                let target = editor_target(section_id);
                self.host.detach(&target);
                self.host.attach(&target);
            }
            Err(e) => self.record_failure("apply template", e),
        }
        self.busy.remove(&section_id);
    }

    /// Optimistic partial commit fired by every drop inside a reorder
    /// session. The view already shows the new order; persistence catches up
    /// asynchronously and the mode does not change.
    async fn drop_commit(&mut self, ordered: Vec<Uuid>) {
        self.sections = ordered.clone();
        if self.order_save_in_flight {
            debug!("drop commit skipped, save already in flight");
            return;
        }
        self.send_order(ordered).await;
    }

    /// The explicit save: final order commit and the only exit from
    /// Reordering.
    async fn save_order(&mut self) {
        let ordered = self.sections.clone();
        self.send_order(ordered).await;
        self.mode = EditorMode::Idle;
    }

    async fn send_order(&mut self, ordered: Vec<Uuid>) {
        self.order_save_in_flight = true;
        self.page_busy = true;
        let request = SectionOrderRequest {
            page_id: self.bootstrap.page_id,
            section_ids: ordered,
            token: self.bootstrap.tokens.section_order.clone(),
        };
        if let Err(e) = self.transport.section_order(request).await {
            self.record_failure("save order", e);
        }
        self.page_busy = false;
        self.order_save_in_flight = false;
    }

    async fn reorder_blocks(&mut self, section_id: Uuid, ordered: Vec<Uuid>) {
        self.busy.insert(section_id);
        let request = BlockOrderRequest {
            section_id,
            block_ids: ordered,
            token: self.bootstrap.tokens.block_order.clone(),
        };
        if let Err(e) = self.transport.block_order(request).await {
            self.record_failure("reorder blocks", e);
        }
        self.busy.remove(&section_id);
    }

    /// Solve a divider drag into a full row partition and commit it.
    ///
    /// Out-of-range positions are corrected silently: the solver clamps
    /// every divider before anything is sent.
    async fn drag_dividers(&mut self, section_id: Uuid, blocks: Vec<Uuid>, dividers: Vec<i32>) {
        let Some(weights) = columns::solve_row(&dividers) else {
            debug!(%section_id, dividers = dividers.len(), "row shape has no dividers");
            return;
        };
        if weights.len() != blocks.len() {
            debug!(%section_id, "divider positions do not match the row");
            return;
        }
        let widths = blocks.into_iter().zip(weights).collect();
        self.commit_widths(section_id, widths).await;
    }

    async fn commit_widths(&mut self, section_id: Uuid, widths: HashMap<Uuid, i32>) {
        self.busy.insert(section_id);
        let request = BlockWidthsRequest {
            section_id,
            widths,
            token: self.bootstrap.tokens.block_widths.clone(),
        };
        if let Err(e) = self.transport.block_widths(request).await {
            self.record_failure("commit widths", e);
        }
        self.busy.remove(&section_id);
    }

    async fn select_image(&mut self, target_id: Uuid, image_id: Option<Uuid>) {
        self.busy.insert(target_id);
        let request = BackgroundRequest {
            target_id,
            image_id,
            token: self.bootstrap.tokens.background.clone(),
        };
        match self.transport.background(request).await {
            Ok(response) => {
                self.frames.record_selection(target_id, response.image_id);
                match response.title {
                    Some(title) => {
                        self.background_labels.insert(target_id, title);
                    }
                    None => {
                        self.background_labels.remove(&target_id);
                    }
                }
            }
            Err(e) => self.record_failure("set background", e),
        }
        self.busy.remove(&target_id);
    }

    async fn dismiss_notice(&mut self, tag: NoticeTag) {
        let request = DismissNoticeRequest {
            notice: tag,
            token: self.bootstrap.tokens.dismiss_notice.clone(),
        };
        match self.transport.dismiss_notice(request).await {
            Ok(_) => self.notices.retain(|n| *n != tag),
            Err(e) => self.record_failure("dismiss notice", e),
        }
    }
}

/// DOM target identifier of a section's rich-text editor.
fn editor_target(section_id: Uuid) -> String {
    format!("section-editor-{section_id}")
}
