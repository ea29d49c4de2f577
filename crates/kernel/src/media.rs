//! Media library collaborator.
//!
//! The host CMS owns the media library; the kernel only resolves image
//! references into URLs and titles for background rendering and the picker
//! button label.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resolved media image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaImage {
    pub id: Uuid,
    pub url: String,
    pub title: String,
}

/// Read access to the host's media library.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Resolve an image id. `None` when the image no longer exists.
    async fn resolve(&self, id: Uuid) -> Result<Option<MediaImage>>;
}

/// In-process media library for tests and the demo server.
#[derive(Default)]
pub struct MemoryMediaLibrary {
    images: RwLock<HashMap<Uuid, MediaImage>>,
}

impl MemoryMediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image, returning its id.
    pub fn insert(&self, url: impl Into<String>, title: impl Into<String>) -> Uuid {
        let image = MediaImage {
            id: Uuid::now_v7(),
            url: url.into(),
            title: title.into(),
        };
        let id = image.id;
        self.images.write().insert(id, image);
        id
    }
}

#[async_trait]
impl MediaLibrary for MemoryMediaLibrary {
    async fn resolve(&self, id: Uuid) -> Result<Option<MediaImage>> {
        Ok(self.images.read().get(&id).cloned())
    }
}
