//! Column-width arithmetic for the 12-unit grid.
//!
//! Divider drags are clamped and solved into full row partitions; committed
//! weight maps are validated server-side before persisting.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

/// Total grid units per row.
pub const GRID_TOTAL: i32 = 12;

/// Minimum span for any column sharing a row.
pub const MIN_SPAN: i32 = 3;

/// Errors from committed width validation.
#[derive(Debug, Error)]
pub enum WidthError {
    #[error("section {0} not found")]
    SectionNotFound(Uuid),

    #[error("block {0} is not part of the section")]
    UnknownBlock(Uuid),

    #[error("weight map omits block {0}")]
    MissingBlock(Uuid),

    #[error("weight {weight} for block {block} is out of range")]
    BadWeight { block: Uuid, weight: i32 },

    #[error("weights sum to {sum}, expected {GRID_TOTAL}")]
    BadSum { sum: i32 },

    #[error("storage error")]
    Store(#[from] anyhow::Error),
}

fn clamp(value: i32, min: i32, max: i32) -> i32 {
    value.clamp(min, max)
}

/// Solve a 2-column row from one divider position.
///
/// The divider is clamped into `[3, 9]`; the second column takes the rest.
pub fn solve_two(divider: i32) -> [i32; 2] {
    let first = clamp(divider, MIN_SPAN, GRID_TOTAL - MIN_SPAN);
    [first, GRID_TOTAL - first]
}

/// Solve a 3-column row from two divider positions.
///
/// The first divider is clamped into `[3, 6]`; the second into
/// `[first + 3, 9]` so every column keeps its minimum span.
pub fn solve_three(d0: i32, d1: i32) -> [i32; 3] {
    let w0 = clamp(d0, MIN_SPAN, GRID_TOTAL - 2 * MIN_SPAN);
    let second = clamp(d1, w0 + MIN_SPAN, GRID_TOTAL - MIN_SPAN);
    let w1 = second - w0;
    [w0, w1, GRID_TOTAL - w0 - w1]
}

/// Solve a row's widths from its divider positions.
///
/// One divider solves a 2-column row, two dividers a 3-column row. Rows of
/// any other shape have no dividers to drag.
pub fn solve_row(dividers: &[i32]) -> Option<Vec<i32>> {
    match dividers {
        [d] => Some(solve_two(*d).to_vec()),
        [d0, d1] => Some(solve_three(*d0, *d1).to_vec()),
        _ => None,
    }
}

/// Validate a committed weight map against a section's block set.
///
/// The map must cover the blocks exactly, every weight must be at least
/// [`MIN_SPAN`] when the row is shared (a lone block takes the full grid),
/// and the weights must sum to [`GRID_TOTAL`].
pub fn validate_widths(blocks: &[Uuid], weights: &HashMap<Uuid, i32>) -> Result<(), WidthError> {
    for id in weights.keys() {
        if !blocks.contains(id) {
            return Err(WidthError::UnknownBlock(*id));
        }
    }

    let min = if blocks.len() > 1 { MIN_SPAN } else { GRID_TOTAL };
    let mut sum = 0;
    for id in blocks {
        let Some(weight) = weights.get(id) else {
            return Err(WidthError::MissingBlock(*id));
        };
        if *weight < min || *weight > GRID_TOTAL {
            return Err(WidthError::BadWeight {
                block: *id,
                weight: *weight,
            });
        }
        sum += weight;
    }

    if sum != GRID_TOTAL {
        return Err(WidthError::BadSum { sum });
    }
    Ok(())
}

/// Derive the weights a row actually renders with.
///
/// A persisted row forming a valid partition is used as-is. Anything else
/// (freshly reconciled zero-weight blocks, stale maps after reconciliation
/// grew the row) falls back to an even split, remainder to the leading
/// columns.
pub fn effective_weights(persisted: &[i32]) -> Vec<i32> {
    if persisted.is_empty() {
        return Vec::new();
    }

    let min = if persisted.len() > 1 { MIN_SPAN } else { GRID_TOTAL };
    let valid = persisted.iter().sum::<i32>() == GRID_TOTAL
        && persisted.iter().all(|w| *w >= min);
    if valid {
        return persisted.to_vec();
    }

    let n = persisted.len() as i32;
    let base = GRID_TOTAL / n;
    let remainder = (GRID_TOTAL % n) as usize;
    (0..persisted.len())
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}
