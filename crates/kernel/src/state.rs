//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::access::{AccessPolicy, AllowAll};
use crate::composer::ComposerService;
use crate::config::Config;
use crate::layout::TemplateRegistry;
use crate::media::{MediaLibrary, MemoryMediaLibrary};
use crate::store::{ContentStore, MemoryStore};
use crate::theme::ThemeEngine;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    composer: ComposerService,
    theme: Arc<ThemeEngine>,
    registry: Arc<TemplateRegistry>,
    store: Arc<dyn ContentStore>,
}

impl AppState {
    /// Initialize state from configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let store: Arc<dyn ContentStore> = match &config.database_url {
            #[cfg(feature = "postgres")]
            Some(url) => Arc::new(crate::store::PgStore::connect(url).await?),
            #[cfg(not(feature = "postgres"))]
            Some(_) => {
                warn!("DATABASE_URL set but the postgres feature is disabled, using memory store");
                Arc::new(MemoryStore::new())
            }
            None => Arc::new(MemoryStore::new()),
        };

        let registry = Arc::new(
            TemplateRegistry::scan(&config.sections_dir())
                .context("failed to scan section templates")?,
        );
        if registry.is_empty() {
            warn!(dir = %config.sections_dir().display(), "no section templates found");
        }

        let theme = Arc::new(
            ThemeEngine::new(&config.templates_dir).context("failed to initialize theme engine")?,
        );

        let media: Arc<dyn MediaLibrary> = Arc::new(MemoryMediaLibrary::new());
        let policy: Arc<dyn AccessPolicy> = Arc::new(AllowAll);

        info!(templates = registry.list().len(), "application state initialized");

        Ok(Self::from_parts(store, registry, theme, media, policy))
    }

    /// Assemble state from explicit parts. Used by tests and embedders.
    pub fn from_parts(
        store: Arc<dyn ContentStore>,
        registry: Arc<TemplateRegistry>,
        theme: Arc<ThemeEngine>,
        media: Arc<dyn MediaLibrary>,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        let composer = ComposerService::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            media,
            policy,
        );
        Self {
            inner: Arc::new(AppStateInner {
                composer,
                theme,
                registry,
                store,
            }),
        }
    }

    pub fn composer(&self) -> &ComposerService {
        &self.inner.composer
    }

    pub fn theme(&self) -> &ThemeEngine {
        &self.inner.theme
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.inner.registry
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.inner.store.as_ref()
    }
}
