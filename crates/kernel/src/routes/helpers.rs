//! Shared route helpers.

use tower_sessions::Session;
use uuid::Uuid;

use crate::csrf::{generate_action_token, verify_action_token};
use crate::error::{AppError, AppResult};
use crate::protocol::ActionTokens;
use crate::state::AppState;

/// Anti-forgery action scopes, one per mutating endpoint.
pub mod actions {
    pub const ADD_SECTION: &str = "add_section";
    pub const REMOVE_SECTION: &str = "remove_section";
    pub const APPLY_TEMPLATE: &str = "apply_template";
    pub const SECTION_ORDER: &str = "section_order";
    pub const BLOCK_ORDER: &str = "block_order";
    pub const BLOCK_WIDTHS: &str = "block_widths";
    pub const BACKGROUND: &str = "background";
    pub const DISMISS_NOTICE: &str = "dismiss_notice";
}

/// Verify a submitted per-action token, rejecting with 403 on mismatch.
pub async fn require_token(session: &Session, action: &str, submitted: &str) -> AppResult<()> {
    let valid = verify_action_token(session, action, submitted)
        .await
        .map_err(AppError::Internal)?;
    if valid {
        Ok(())
    } else {
        tracing::warn!(action, "invalid action token");
        Err(AppError::PermissionDenied)
    }
}

/// Check the edit capability for a page.
pub async fn require_edit(state: &AppState, page_id: Uuid) -> AppResult<()> {
    state.composer().ensure_can_edit(page_id).await?;
    Ok(())
}

/// Mint the full per-action token set for the editor bootstrap.
pub async fn mint_tokens(session: &Session) -> AppResult<ActionTokens> {
    Ok(ActionTokens {
        add_section: generate_action_token(session, actions::ADD_SECTION).await?,
        remove_section: generate_action_token(session, actions::REMOVE_SECTION).await?,
        apply_template: generate_action_token(session, actions::APPLY_TEMPLATE).await?,
        section_order: generate_action_token(session, actions::SECTION_ORDER).await?,
        block_order: generate_action_token(session, actions::BLOCK_ORDER).await?,
        block_widths: generate_action_token(session, actions::BLOCK_WIDTHS).await?,
        background: generate_action_token(session, actions::BACKGROUND).await?,
        dismiss_notice: generate_action_token(session, actions::DISMISS_NOTICE).await?,
    })
}
