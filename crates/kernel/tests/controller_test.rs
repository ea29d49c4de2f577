#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Tests for the editor controller state machine over a recording transport.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use mosaico_kernel::access::AllowAll;
use mosaico_kernel::composer::ComposerService;
use mosaico_kernel::editor::{
    DirectTransport, EditorController, EditorHost, EditorMode, MediaFrames, NullEditorHost,
    Transport, TransportError, UiEvent,
};
use mosaico_kernel::layout::{ReconciliationReport, TemplateDescriptor, TemplateRegistry};
use mosaico_kernel::media::{MediaLibrary, MemoryMediaLibrary};
use mosaico_kernel::models::{ContentRecord, RecordKind, meta};
use mosaico_kernel::notices::NoticeTag;
use mosaico_kernel::store::{CHILD_QUERY_LIMIT, ContentStore, MemoryStore};
use mosaico_kernel::theme::ThemeEngine;
use mosaico_kernel::protocol::{
    Ack, ActionTokens, AddSectionRequest, AddSectionResponse, ApplyTemplateRequest,
    ApplyTemplateResponse, BackgroundRequest, BackgroundResponse, BlockOrderRequest,
    BlockWidthsRequest, DismissNoticeRequest, EditorBootstrap, RemoveSectionRequest,
    SectionOrderRequest,
};

/// Transport double that records calls and can be told to fail per action.
#[derive(Default)]
struct RecordingTransport {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<&'static str>>,
    /// Every full section order received, in call order.
    orders: Mutex<Vec<Vec<Uuid>>>,
    /// Every committed weight map received, in call order.
    widths: Mutex<Vec<HashMap<Uuid, i32>>>,
}

impl RecordingTransport {
    fn fail(&self, action: &'static str) {
        self.failing.lock().unwrap().insert(action);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, action: &'static str) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(action.to_string());
        if self.failing.lock().unwrap().contains(action) {
            Err(TransportError::Failed("server unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn add_section(
        &self,
        _request: AddSectionRequest,
    ) -> Result<AddSectionResponse, TransportError> {
        self.record("add_section")?;
        Ok(AddSectionResponse {
            section_id: Uuid::now_v7(),
            html: String::new(),
        })
    }

    async fn remove_section(&self, _request: RemoveSectionRequest) -> Result<Ack, TransportError> {
        self.record("remove_section")?;
        Ok(Ack::ok())
    }

    async fn apply_template(
        &self,
        request: ApplyTemplateRequest,
    ) -> Result<ApplyTemplateResponse, TransportError> {
        self.record("apply_template")?;
        Ok(ApplyTemplateResponse {
            report: ReconciliationReport {
                section_id: request.section_id,
                template_id: request.template_id,
                before: 0,
                after: 1,
                created: Vec::new(),
            },
            html: String::new(),
        })
    }

    async fn section_order(&self, request: SectionOrderRequest) -> Result<Ack, TransportError> {
        self.orders.lock().unwrap().push(request.section_ids);
        self.record("section_order")?;
        Ok(Ack::ok())
    }

    async fn block_order(&self, _request: BlockOrderRequest) -> Result<Ack, TransportError> {
        self.record("block_order")?;
        Ok(Ack::ok())
    }

    async fn block_widths(&self, request: BlockWidthsRequest) -> Result<Ack, TransportError> {
        self.widths.lock().unwrap().push(request.widths);
        self.record("block_widths")?;
        Ok(Ack::ok())
    }

    async fn background(
        &self,
        request: BackgroundRequest,
    ) -> Result<BackgroundResponse, TransportError> {
        self.record("background")?;
        Ok(BackgroundResponse {
            image_id: request.image_id,
            url: request.image_id.map(|_| "https://cdn.test/pick.jpg".to_string()),
            title: request.image_id.map(|_| "Sunset".to_string()),
        })
    }

    async fn dismiss_notice(&self, _request: DismissNoticeRequest) -> Result<Ack, TransportError> {
        self.record("dismiss_notice")?;
        Ok(Ack::ok())
    }
}

/// Host double that records attach/detach targets.
#[derive(Default)]
struct RecordingHost {
    events: Mutex<Vec<String>>,
}

impl EditorHost for RecordingHost {
    fn attach(&self, target_id: &str) {
        self.events.lock().unwrap().push(format!("attach {target_id}"));
    }

    fn detach(&self, target_id: &str) {
        self.events.lock().unwrap().push(format!("detach {target_id}"));
    }
}

fn make_controller(
    sections: Vec<Uuid>,
) -> (EditorController, Arc<RecordingTransport>, Arc<RecordingHost>) {
    let transport = Arc::new(RecordingTransport::default());
    let host = Arc::new(RecordingHost::default());
    let bootstrap = EditorBootstrap {
        page_id: Uuid::now_v7(),
        section_ids: sections,
        templates: Vec::new(),
        tokens: ActionTokens::default(),
        notices: vec![NoticeTag::GettingStarted],
    };
    let controller = EditorController::new(
        bootstrap,
        MediaFrames::new(),
        Arc::clone(&transport) as Arc<dyn Transport>,
        Arc::clone(&host) as Arc<dyn EditorHost>,
    );
    (controller, transport, host)
}

#[tokio::test]
async fn reorder_needs_a_second_section() {
    let (mut controller, _, _) = make_controller(vec![Uuid::now_v7()]);
    assert!(!controller.reorder_enabled());

    controller.dispatch(UiEvent::BeginReorder).await;
    assert_eq!(controller.mode(), EditorMode::Idle);

    let (mut controller, _, _) =
        make_controller(vec![Uuid::now_v7(), Uuid::now_v7()]);
    assert!(controller.reorder_enabled());
    controller.dispatch(UiEvent::BeginReorder).await;
    assert_eq!(controller.mode(), EditorMode::Reordering);
}

#[tokio::test]
async fn drops_commit_optimistically_and_save_exits() {
    let a = Uuid::now_v7();
    let b = Uuid::now_v7();
    let c = Uuid::now_v7();
    let (mut controller, transport, _) = make_controller(vec![a, b, c]);

    controller.dispatch(UiEvent::BeginReorder).await;
    controller
        .dispatch(UiEvent::Drop {
            ordered: vec![c, a, b],
        })
        .await;

    // The view reflects the drop immediately and persistence was attempted.
    assert_eq!(controller.sections(), &[c, a, b]);
    assert_eq!(controller.mode(), EditorMode::Reordering);
    assert_eq!(*transport.orders.lock().unwrap(), vec![vec![c, a, b]]);

    controller.dispatch(UiEvent::SaveOrder).await;
    assert_eq!(controller.mode(), EditorMode::Idle);
    assert_eq!(transport.orders.lock().unwrap().len(), 2);
    assert!(controller.failures().is_empty());
}

#[tokio::test]
async fn editing_events_are_ignored_while_reordering() {
    let (mut controller, transport, _) =
        make_controller(vec![Uuid::now_v7(), Uuid::now_v7()]);
    controller.dispatch(UiEvent::BeginReorder).await;

    controller.dispatch(UiEvent::AddSection).await;
    controller
        .dispatch(UiEvent::ChooseTemplate {
            section_id: Uuid::now_v7(),
            template_id: "two-column".to_string(),
        })
        .await;

    assert!(transport.calls().is_empty());
    assert_eq!(controller.sections().len(), 2);
    assert_eq!(controller.mode(), EditorMode::Reordering);
}

#[tokio::test]
async fn failed_save_still_exits_reorder_mode() {
    let (mut controller, transport, _) =
        make_controller(vec![Uuid::now_v7(), Uuid::now_v7()]);
    transport.fail("section_order");

    controller.dispatch(UiEvent::BeginReorder).await;
    controller.dispatch(UiEvent::SaveOrder).await;

    assert_eq!(controller.mode(), EditorMode::Idle);
    assert!(!controller.is_page_busy());
    assert_eq!(controller.failures().len(), 1);
    assert!(controller.failures()[0].contains("save order"));
}

#[tokio::test]
async fn add_section_failure_surfaces_and_clears_busy() {
    let (mut controller, transport, _) = make_controller(Vec::new());
    transport.fail("add_section");

    controller.dispatch(UiEvent::AddSection).await;

    assert!(controller.sections().is_empty());
    assert!(!controller.is_page_busy());
    assert_eq!(controller.failures().len(), 1);
    assert!(controller.failures()[0].contains("add section"));
}

#[tokio::test]
async fn add_and_remove_cycle_the_rich_text_editor() {
    let (mut controller, _, host) = make_controller(Vec::new());

    controller.dispatch(UiEvent::AddSection).await;
    let section = controller.sections()[0];
    controller.dispatch(UiEvent::RemoveSection(section)).await;

    assert!(controller.sections().is_empty());
    let events = host.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            format!("attach section-editor-{section}"),
            format!("detach section-editor-{section}"),
        ]
    );
}

#[tokio::test]
async fn empty_titles_fall_back() {
    let section = Uuid::now_v7();
    let (mut controller, _, _) = make_controller(vec![section]);

    assert_eq!(controller.heading(section), "No Title");

    controller
        .dispatch(UiEvent::EditTitle {
            section_id: section,
            title: "Hero".to_string(),
        })
        .await;
    assert_eq!(controller.heading(section), "Hero");

    controller
        .dispatch(UiEvent::EditTitle {
            section_id: section,
            title: "   ".to_string(),
        })
        .await;
    assert_eq!(controller.heading(section), "No Title");
}

#[tokio::test]
async fn one_media_frame_per_target() {
    let target = Uuid::now_v7();
    let current = Uuid::now_v7();
    let (mut controller, _, _) = make_controller(vec![target]);

    controller
        .dispatch(UiEvent::ChooseBackground {
            target_id: target,
            current: Some(current),
        })
        .await;
    controller
        .dispatch(UiEvent::ChooseBackground {
            target_id: target,
            current: None,
        })
        .await;

    assert_eq!(controller.frames().len(), 1);
    let frame = controller.frames().get(target).unwrap();
    assert_eq!(frame.opens, 2);
    // The first open's preselection sticks across reopens.
    assert_eq!(frame.selected, Some(current));
}

#[tokio::test]
async fn selecting_an_image_updates_label_and_frame() {
    let target = Uuid::now_v7();
    let image = Uuid::now_v7();
    let (mut controller, _, _) = make_controller(vec![target]);

    controller
        .dispatch(UiEvent::ChooseBackground {
            target_id: target,
            current: None,
        })
        .await;
    controller
        .dispatch(UiEvent::SelectImage {
            target_id: target,
            image_id: Some(image),
        })
        .await;

    assert_eq!(controller.background_label(target), Some("Sunset"));
    assert_eq!(
        controller.frames().get(target).unwrap().selected,
        Some(image)
    );

    // Clearing removes the label and the remembered selection.
    controller
        .dispatch(UiEvent::SelectImage {
            target_id: target,
            image_id: None,
        })
        .await;
    assert_eq!(controller.background_label(target), None);
    assert_eq!(controller.frames().get(target).unwrap().selected, None);
}

#[tokio::test]
async fn divider_drags_are_clamped_before_commit() {
    let section = Uuid::now_v7();
    let left = Uuid::now_v7();
    let right = Uuid::now_v7();
    let (mut controller, transport, _) = make_controller(vec![section]);

    // A drag far past the left edge commits the minimum-span partition.
    controller
        .dispatch(UiEvent::DragDividers {
            section_id: section,
            blocks: vec![left, right],
            dividers: vec![-4],
        })
        .await;

    let committed = transport.widths.lock().unwrap()[0].clone();
    assert_eq!(committed.get(&left), Some(&3));
    assert_eq!(committed.get(&right), Some(&9));

    // Three columns: both dividers clamp and the row still sums to 12.
    let mid = Uuid::now_v7();
    controller
        .dispatch(UiEvent::DragDividers {
            section_id: section,
            blocks: vec![left, mid, right],
            dividers: vec![20, 20],
        })
        .await;
    let committed = transport.widths.lock().unwrap()[1].clone();
    assert_eq!(committed.get(&left), Some(&6));
    assert_eq!(committed.get(&mid), Some(&3));
    assert_eq!(committed.get(&right), Some(&3));

    // A divider set that does not match the row commits nothing.
    controller
        .dispatch(UiEvent::DragDividers {
            section_id: section,
            blocks: vec![left, right],
            dividers: vec![4, 8],
        })
        .await;
    assert_eq!(transport.widths.lock().unwrap().len(), 2);
    assert!(controller.failures().is_empty());
}

#[tokio::test]
async fn commit_widths_clears_busy_on_failure() {
    let section = Uuid::now_v7();
    let (mut controller, transport, _) = make_controller(vec![section]);
    transport.fail("block_widths");

    let widths: HashMap<Uuid, i32> = [(Uuid::now_v7(), 12)].into_iter().collect();
    controller
        .dispatch(UiEvent::CommitWidths {
            section_id: section,
            widths,
        })
        .await;

    assert!(!controller.is_busy(section));
    assert_eq!(controller.failures().len(), 1);
    assert!(controller.failures()[0].contains("commit widths"));
}

#[tokio::test]
async fn dismissing_a_notice_needs_the_server_ack() {
    let (mut controller, transport, _) = make_controller(Vec::new());
    assert_eq!(controller.notices(), &[NoticeTag::GettingStarted]);

    transport.fail("dismiss_notice");
    controller
        .dispatch(UiEvent::DismissNotice(NoticeTag::GettingStarted))
        .await;
    // The dismissal did not persist, so the notice stays.
    assert_eq!(controller.notices(), &[NoticeTag::GettingStarted]);
    assert_eq!(controller.failures().len(), 1);

    let (mut controller, _, _) = make_controller(Vec::new());
    controller
        .dispatch(UiEvent::DismissNotice(NoticeTag::GettingStarted))
        .await;
    assert!(controller.notices().is_empty());
}

/// The controller over the in-process transport, mutating the real
/// composer end to end.
#[tokio::test]
async fn direct_transport_drives_the_real_composer() {
    let store = Arc::new(MemoryStore::new());
    let media = Arc::new(MemoryMediaLibrary::new());
    let registry = Arc::new(TemplateRegistry::with_descriptors(vec![
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
    ]));
    let composer = ComposerService::new(
        Arc::clone(&store) as Arc<dyn ContentStore>,
        registry,
        Arc::clone(&media) as Arc<dyn MediaLibrary>,
        Arc::new(AllowAll),
    );

    let now = chrono::Utc::now().timestamp();
    let page = Uuid::now_v7();
    store.seed(ContentRecord {
        id: page,
        kind: RecordKind::Page,
        parent_id: None,
        order_key: 0,
        title: "Home".to_string(),
        body: String::new(),
        format: "plain_text".to_string(),
        created: now,
        changed: now,
    });

    let transport = Arc::new(DirectTransport::new(
        composer.clone(),
        Arc::new(ThemeEngine::empty()),
    ));
    let bootstrap = EditorBootstrap {
        page_id: page,
        section_ids: Vec::new(),
        templates: Vec::new(),
        tokens: ActionTokens::default(),
        notices: Vec::new(),
    };
    let mut controller = EditorController::new(
        bootstrap,
        MediaFrames::new(),
        transport as Arc<dyn Transport>,
        Arc::new(NullEditorHost),
    );

    controller.dispatch(UiEvent::AddSection).await;
    controller.dispatch(UiEvent::AddSection).await;
    assert!(controller.failures().is_empty());
    let first = controller.sections()[0];
    let second = controller.sections()[1];

    controller
        .dispatch(UiEvent::ChooseTemplate {
            section_id: first,
            template_id: "three-column".to_string(),
        })
        .await;
    let blocks = store.children(first, CHILD_QUERY_LIMIT).await.unwrap();
    assert_eq!(blocks.len(), 3);

    controller.dispatch(UiEvent::BeginReorder).await;
    controller
        .dispatch(UiEvent::Drop {
            ordered: vec![second, first],
        })
        .await;
    controller.dispatch(UiEvent::SaveOrder).await;
    assert_eq!(controller.mode(), EditorMode::Idle);
    let sections = store.children(page, CHILD_QUERY_LIMIT).await.unwrap();
    assert_eq!(
        sections.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![second, first]
    );

    // A clamped divider drag lands as persisted block weights.
    controller
        .dispatch(UiEvent::DragDividers {
            section_id: first,
            blocks: blocks.iter().map(|r| r.id).collect(),
            dividers: vec![0, 20],
        })
        .await;
    for (block, expected) in blocks.iter().zip(["3", "6", "3"]) {
        let metadata = store.metadata(block.id).await.unwrap();
        assert_eq!(metadata.get(meta::WEIGHT).map(String::as_str), Some(expected));
    }

    // Backgrounds round-trip through the media library.
    let image = media.insert("https://cdn.test/tile.png", "Tile");
    controller
        .dispatch(UiEvent::SelectImage {
            target_id: second,
            image_id: Some(image),
        })
        .await;
    assert_eq!(controller.background_label(second), Some("Tile"));
    assert!(controller.failures().is_empty());
}
