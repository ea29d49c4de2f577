//! Content storage backends.
//!
//! The [`ContentStore`] trait is the seam to the host CMS's record storage.
//! [`MemoryStore`] is always available (tests, demo server); a Postgres
//! backend is provided behind the `postgres` cargo feature.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{ContentRecord, CreateRecord, UpdateRecord};

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;

/// Maximum children fetched per parent in a single query.
pub const CHILD_QUERY_LIMIT: usize = 50;

/// Record storage with per-record key/value metadata.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Create a new record.
    async fn create(&self, input: CreateRecord) -> Result<ContentRecord>;

    /// Load a record by id.
    async fn get(&self, id: Uuid) -> Result<Option<ContentRecord>>;

    /// Update a record. Returns the updated record, or `None` if missing.
    async fn update(&self, id: Uuid, input: UpdateRecord) -> Result<Option<ContentRecord>>;

    /// Delete a record and its metadata. Returns whether it existed.
    ///
    /// Does not cascade; the hierarchy manager owns cascade semantics.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Children of a parent ordered by ascending order key, capped at `limit`.
    async fn children(&self, parent_id: Uuid, limit: usize) -> Result<Vec<ContentRecord>>;

    /// Rewrite order keys for a set of records in one transaction.
    async fn set_order_keys(&self, keys: &[(Uuid, i32)]) -> Result<()>;

    /// All metadata for a record.
    async fn metadata(&self, id: Uuid) -> Result<HashMap<String, String>>;

    /// Set a single metadata value.
    async fn set_metadata(&self, id: Uuid, key: &str, value: &str) -> Result<()>;

    /// Remove a single metadata value.
    async fn remove_metadata(&self, id: Uuid, key: &str) -> Result<()>;
}
