//! Front-end rendering of composed pages.

use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use uuid::Uuid;

use crate::error::AppResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/page/{page_id}", get(view_page))
}

/// Render a composed page, all sections in order.
///
/// A missing page is fatal (404); there is never a partial render.
///
/// GET /page/{page_id}
async fn view_page(
    State(state): State<AppState>,
    Path(page_id): Path<Uuid>,
) -> AppResult<Html<String>> {
    let snapshot = state.composer().page_snapshot(page_id).await?;
    let html = state.theme().render_page(&snapshot)?;
    Ok(Html(html))
}
