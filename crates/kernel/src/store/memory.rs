//! In-memory content store.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::models::{ContentRecord, CreateRecord, UpdateRecord};

use super::ContentStore;

/// In-process store backed by `parking_lot` maps.
///
/// Uses `parking_lot::RwLock` rather than `std::sync::RwLock`: no poisoning,
/// and the short critical sections never hold a guard across an await point.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<Uuid, ContentRecord>>,
    metadata: RwLock<HashMap<Uuid, HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing hierarchy checks. Intended for
    /// host-owned pages and test fixtures.
    pub fn seed(&self, record: ContentRecord) {
        self.records.write().insert(record.id, record);
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create(&self, input: CreateRecord) -> Result<ContentRecord> {
        let record = ContentRecord::from_input(input);
        self.records.write().insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ContentRecord>> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn update(&self, id: Uuid, input: UpdateRecord) -> Result<Option<ContentRecord>> {
        let mut records = self.records.write();
        let Some(record) = records.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = input.title {
            record.title = title;
        }
        if let Some(body) = input.body {
            record.body = body;
        }
        if let Some(format) = input.format {
            record.format = format;
        }
        record.changed = chrono::Utc::now().timestamp();

        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let existed = self.records.write().remove(&id).is_some();
        if existed {
            self.metadata.write().remove(&id);
        }
        Ok(existed)
    }

    async fn children(&self, parent_id: Uuid, limit: usize) -> Result<Vec<ContentRecord>> {
        let records = self.records.read();
        let mut children: Vec<ContentRecord> = records
            .values()
            .filter(|r| r.parent_id == Some(parent_id))
            .cloned()
            .collect();
        // Order key first; creation time breaks ties deterministically.
        children.sort_by_key(|r| (r.order_key, r.created, r.id));
        children.truncate(limit);
        Ok(children)
    }

    async fn set_order_keys(&self, keys: &[(Uuid, i32)]) -> Result<()> {
        let mut records = self.records.write();
        // Validate the whole batch before touching anything.
        for (id, _) in keys {
            if !records.contains_key(id) {
                anyhow::bail!("cannot set order key on missing record {id}");
            }
        }
        let now = chrono::Utc::now().timestamp();
        for (id, key) in keys {
            if let Some(record) = records.get_mut(id) {
                record.order_key = *key;
                record.changed = now;
            }
        }
        Ok(())
    }

    async fn metadata(&self, id: Uuid) -> Result<HashMap<String, String>> {
        Ok(self.metadata.read().get(&id).cloned().unwrap_or_default())
    }

    async fn set_metadata(&self, id: Uuid, key: &str, value: &str) -> Result<()> {
        self.metadata
            .write()
            .entry(id)
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_metadata(&self, id: Uuid, key: &str) -> Result<()> {
        if let Some(map) = self.metadata.write().get_mut(&id) {
            map.remove(key);
        }
        Ok(())
    }
}
