//! Dismissible editor notices.
//!
//! Notices are typed tags; dismissals persist in the session so a dismissed
//! notice stays gone for the rest of the editing session.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::layout::TemplateRegistry;

/// Session key for dismissed notice tags.
const DISMISSED_SESSION_KEY: &str = "dismissed_notices";

/// Notice types the editor can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeTag {
    /// The template registry scan found no template files.
    MissingTemplates,
    /// First-run pointer shown until dismissed.
    GettingStarted,
}

/// Notice tags dismissed in this session.
pub async fn dismissed(session: &Session) -> Vec<NoticeTag> {
    session
        .get(DISMISSED_SESSION_KEY)
        .await
        .unwrap_or(None)
        .unwrap_or_default()
}

/// Record a dismissal in the session.
pub async fn dismiss(session: &Session, tag: NoticeTag) -> Result<()> {
    let mut tags = dismissed(session).await;
    if !tags.contains(&tag) {
        tags.push(tag);
    }
    session
        .insert(DISMISSED_SESSION_KEY, tags)
        .await
        .map_err(|e| anyhow::anyhow!("failed to store dismissed notices: {e}"))?;
    Ok(())
}

/// Notices to show: everything applicable minus what was dismissed.
pub fn pending(registry: &TemplateRegistry, dismissed: &[NoticeTag]) -> Vec<NoticeTag> {
    let mut notices = Vec::new();
    if registry.is_empty() {
        notices.push(NoticeTag::MissingTemplates);
    }
    notices.push(NoticeTag::GettingStarted);
    notices.retain(|tag| !dismissed.contains(tag));
    notices
}
