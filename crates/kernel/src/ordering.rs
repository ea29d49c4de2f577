//! Sibling ordering: validated, transactional rewrite of order keys.

use std::collections::HashSet;

use thiserror::Error;
use uuid::Uuid;

use crate::store::{CHILD_QUERY_LIMIT, ContentStore};

/// Errors from order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("parent {0} not found")]
    ParentNotFound(Uuid),

    #[error("id {0} is not a child of the parent")]
    UnknownChild(Uuid),

    #[error("id {0} appears more than once in the order list")]
    DuplicateChild(Uuid),

    #[error("order list omits existing children ({submitted} of {expected} supplied)")]
    IncompleteSet { expected: usize, submitted: usize },

    #[error("storage error")]
    Store(#[from] anyhow::Error),
}

/// Rewrite the order keys of a parent's children to match `ordered`.
///
/// The submitted list must be an exact permutation of the current children:
/// unknown ids, duplicates, and omissions are all rejected before anything is
/// written. Each child is assigned a 0-based key equal to its list position;
/// no other attributes change.
pub async fn set_order(
    store: &dyn ContentStore,
    parent_id: Uuid,
    ordered: &[Uuid],
) -> Result<(), OrderError> {
    if store.get(parent_id).await?.is_none() {
        return Err(OrderError::ParentNotFound(parent_id));
    }

    let children = store.children(parent_id, CHILD_QUERY_LIMIT).await?;
    let current: HashSet<Uuid> = children.iter().map(|r| r.id).collect();

    let mut seen = HashSet::with_capacity(ordered.len());
    for id in ordered {
        if !current.contains(id) {
            return Err(OrderError::UnknownChild(*id));
        }
        if !seen.insert(*id) {
            return Err(OrderError::DuplicateChild(*id));
        }
    }
    if seen.len() < current.len() {
        return Err(OrderError::IncompleteSet {
            expected: current.len(),
            submitted: seen.len(),
        });
    }

    let keys: Vec<(Uuid, i32)> = ordered
        .iter()
        .enumerate()
        .map(|(position, id)| (*id, position as i32))
        .collect();
    store.set_order_keys(&keys).await?;

    tracing::debug!(%parent_id, children = keys.len(), "order keys rewritten");
    Ok(())
}

/// Order key for a child appended after the parent's current maximum.
pub async fn next_order_key(store: &dyn ContentStore, parent_id: Uuid) -> anyhow::Result<i32> {
    let children = store.children(parent_id, CHILD_QUERY_LIMIT).await?;
    Ok(children
        .iter()
        .map(|r| r.order_key + 1)
        .max()
        .unwrap_or(0))
}
