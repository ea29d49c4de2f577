//! Editor endpoints: bootstrap, section/block CRUD, ordering, widths,
//! backgrounds, and notices.

use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppResult;
use crate::notices;
use crate::protocol::{
    Ack, AddSectionRequest, AddSectionResponse, ApplyTemplateRequest, ApplyTemplateResponse,
    BackgroundRequest, BackgroundResponse, BlockOrderRequest, BlockWidthsRequest,
    DismissNoticeRequest, EditorBootstrap, RemoveSectionRequest, SectionOrderRequest,
};
use crate::state::AppState;

use super::helpers::{actions, mint_tokens, require_edit, require_token};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/editor/{page_id}", get(editor_page))
        .route("/editor/{page_id}/bootstrap", get(bootstrap))
        .route("/editor/section/add", post(add_section))
        .route("/editor/section/remove", post(remove_section))
        .route("/editor/section/template", post(apply_template))
        .route("/editor/section/order", post(section_order))
        .route("/editor/block/order", post(block_order))
        .route("/editor/block/widths", post(block_widths))
        .route("/editor/background", post(background))
        .route("/editor/notice/dismiss", post(dismiss_notice))
}

/// Full editor page markup for a page's composition.
///
/// GET /editor/{page_id}
async fn editor_page(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
) -> AppResult<Html<String>> {
    require_edit(&state, page_id).await?;

    let snapshot = state.composer().page_snapshot(page_id).await?;
    let html = state
        .theme()
        .render_editor_page(&snapshot, &state.registry().list())?;
    Ok(Html(html))
}

/// Typed bootstrap payload for the editor controller.
///
/// GET /editor/{page_id}/bootstrap
async fn bootstrap(
    State(state): State<AppState>,
    session: Session,
    Path(page_id): Path<Uuid>,
) -> AppResult<Json<EditorBootstrap>> {
    require_edit(&state, page_id).await?;

    let snapshot = state.composer().page_snapshot(page_id).await?;
    let tokens = mint_tokens(&session).await?;
    let dismissed = notices::dismissed(&session).await;

    Ok(Json(EditorBootstrap {
        page_id,
        section_ids: snapshot.sections.iter().map(|s| s.section.id()).collect(),
        templates: state.registry().list(),
        tokens,
        notices: notices::pending(state.registry(), &dismissed),
    }))
}

/// POST /editor/section/add
async fn add_section(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddSectionRequest>,
) -> AppResult<Json<AddSectionResponse>> {
    require_token(&session, actions::ADD_SECTION, &request.token).await?;

    let section = state.composer().add_section(request.page_id).await?;
    let snapshot = state.composer().section_snapshot(section.id()).await?;
    let html = state
        .theme()
        .render_admin_section(&snapshot, &state.registry().list())?;

    Ok(Json(AddSectionResponse {
        section_id: section.id(),
        html,
    }))
}

/// POST /editor/section/remove
async fn remove_section(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveSectionRequest>,
) -> AppResult<Json<Ack>> {
    require_token(&session, actions::REMOVE_SECTION, &request.token).await?;

    state.composer().remove_section(request.section_id).await?;
    Ok(Json(Ack::ok()))
}

/// POST /editor/section/template
async fn apply_template(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<ApplyTemplateRequest>,
) -> AppResult<Json<ApplyTemplateResponse>> {
    require_token(&session, actions::APPLY_TEMPLATE, &request.token).await?;
    let page_id = state.composer().page_of(request.section_id).await?;
    require_edit(&state, page_id).await?;

    let report = state
        .composer()
        .apply_template(request.section_id, &request.template_id)
        .await?;
    let snapshot = state.composer().section_snapshot(request.section_id).await?;
    let html = state.theme().render_admin_blocks(&snapshot)?;

    Ok(Json(ApplyTemplateResponse { report, html }))
}

/// POST /editor/section/order
async fn section_order(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SectionOrderRequest>,
) -> AppResult<Json<Ack>> {
    require_token(&session, actions::SECTION_ORDER, &request.token).await?;
    require_edit(&state, request.page_id).await?;

    state
        .composer()
        .set_section_order(request.page_id, &request.section_ids)
        .await?;
    Ok(Json(Ack::ok()))
}

/// POST /editor/block/order
async fn block_order(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<BlockOrderRequest>,
) -> AppResult<Json<Ack>> {
    require_token(&session, actions::BLOCK_ORDER, &request.token).await?;
    let page_id = state.composer().page_of(request.section_id).await?;
    require_edit(&state, page_id).await?;

    state
        .composer()
        .set_block_order(request.section_id, &request.block_ids)
        .await?;
    Ok(Json(Ack::ok()))
}

/// POST /editor/block/widths
async fn block_widths(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<BlockWidthsRequest>,
) -> AppResult<Json<Ack>> {
    require_token(&session, actions::BLOCK_WIDTHS, &request.token).await?;
    let page_id = state.composer().page_of(request.section_id).await?;
    require_edit(&state, page_id).await?;

    state
        .composer()
        .set_block_widths(request.section_id, &request.widths)
        .await?;
    Ok(Json(Ack::ok()))
}

/// POST /editor/background
async fn background(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<BackgroundRequest>,
) -> AppResult<Json<BackgroundResponse>> {
    require_token(&session, actions::BACKGROUND, &request.token).await?;
    let page_id = state.composer().page_of(request.target_id).await?;
    require_edit(&state, page_id).await?;

    let image = state
        .composer()
        .set_background(request.target_id, request.image_id)
        .await?;

    Ok(Json(BackgroundResponse {
        image_id: image.as_ref().map(|i| i.id),
        url: image.as_ref().map(|i| i.url.clone()),
        title: image.map(|i| i.title),
    }))
}

/// POST /editor/notice/dismiss
async fn dismiss_notice(
    session: Session,
    Json(request): Json<DismissNoticeRequest>,
) -> AppResult<Json<Ack>> {
    require_token(&session, actions::DISMISS_NOTICE, &request.token).await?;

    notices::dismiss(&session, request.notice).await?;
    Ok(Json(Ack::ok()))
}
