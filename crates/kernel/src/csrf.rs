//! Per-action anti-forgery tokens.
//!
//! Each editor action gets its own token scope so an endpoint only accepts
//! tokens minted for it. Unlike one-shot form tokens, action tokens stay
//! valid until expiry: the controller reuses the same token for every drop
//! commit inside one reorder session.

use anyhow::{Result, bail};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tower_sessions::Session;

/// Session key prefix for per-action token stacks.
const TOKEN_SESSION_PREFIX: &str = "action_tokens";

/// Maximum tokens kept per action scope.
const MAX_TOKENS: usize = 10;

/// Token validity period in seconds (1 hour).
const TOKEN_VALIDITY_SECS: i64 = 3600;

fn session_key(action: &str) -> String {
    format!("{TOKEN_SESSION_PREFIX}:{action}")
}

/// Generate a token for an action and store it in the session.
pub async fn generate_action_token(session: &Session, action: &str) -> Result<String> {
    let mut random_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random_bytes);

    let timestamp = chrono::Utc::now().timestamp();

    let mut hasher = Sha256::new();
    hasher.update(random_bytes);
    hasher.update(action.as_bytes());
    hasher.update(timestamp.to_le_bytes());
    let token = hex::encode(hasher.finalize());

    let key = session_key(action);
    let mut tokens: Vec<String> = session.get(&key).await.unwrap_or(None).unwrap_or_default();

    tokens.push(format!("{token}:{timestamp}"));
    if tokens.len() > MAX_TOKENS {
        let skip = tokens.len() - MAX_TOKENS;
        tokens = tokens.into_iter().skip(skip).collect();
    }

    session
        .insert(&key, tokens)
        .await
        .map_err(|e| anyhow::anyhow!("failed to store action token: {e}"))?;

    Ok(token)
}

/// Verify a submitted token against its action scope.
///
/// Tokens are reusable until expiry; expired entries are pruned on the way
/// through. A token minted for one action never validates another.
pub async fn verify_action_token(session: &Session, action: &str, submitted: &str) -> Result<bool> {
    if submitted.is_empty() {
        bail!("empty action token");
    }

    let key = session_key(action);
    let mut tokens: Vec<String> = session.get(&key).await.unwrap_or(None).unwrap_or_default();
    if tokens.is_empty() {
        return Ok(false);
    }

    let now = chrono::Utc::now().timestamp();
    let before = tokens.len();
    tokens.retain(|entry| {
        let Some((_, timestamp)) = entry.split_once(':') else {
            return false;
        };
        timestamp
            .parse::<i64>()
            .is_ok_and(|ts| now - ts <= TOKEN_VALIDITY_SECS)
    });

    if tokens.len() != before {
        session
            .insert(&key, tokens.clone())
            .await
            .map_err(|e| anyhow::anyhow!("failed to prune action tokens: {e}"))?;
    }

    Ok(tokens
        .iter()
        .any(|entry| entry.split_once(':').map(|(t, _)| t) == Some(submitted)))
}
