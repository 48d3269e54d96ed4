//! Shared handler state.

use std::sync::Arc;

use itam_core::{RecordStore, StaticStats, StoreError};

use crate::config::{FileStoreKind, GatewayConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::notify::{self, DisabledNotifier, Notifier};
use crate::storage::{FileStore, LocalFileStore, MemoryFileStore};

/// Everything a handler needs: the record store, the blob store, the alert
/// notifier and the configured dashboard figures.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RecordStore>,
    pub files: Arc<dyn FileStore>,
    pub notifier: Arc<dyn Notifier>,
    pub static_stats: StaticStats,
    pub body_limit: usize,
}

impl AppState {
    /// State over the given stores with default statistics and body limit,
    /// and notifications off.
    #[must_use]
    pub fn new(store: Arc<RecordStore>, files: Arc<dyn FileStore>) -> Self {
        Self {
            store,
            files,
            notifier: Arc::new(DisabledNotifier),
            static_stats: StaticStats::default(),
            body_limit: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Empty record store with in-memory blobs.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(RecordStore::new()), Arc::new(MemoryFileStore::new()))
    }

    /// Build the state described by `config`.
    ///
    /// # Errors
    /// Returns [`StoreError`] if seeding the sample assets fails.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, StoreError> {
        let store = if config.seed_sample_data {
            RecordStore::with_sample_data()?
        } else {
            RecordStore::new()
        };
        let files: Arc<dyn FileStore> = match config.file_store {
            FileStoreKind::Local => Arc::new(LocalFileStore::new(config.upload_dir.clone())),
            FileStoreKind::Memory => Arc::new(MemoryFileStore::new()),
        };
        Ok(Self::new(Arc::new(store), files)
            .with_notifier(notify::from_config(&config.notify))
            .with_static_stats(config.static_stats)
            .with_body_limit(config.max_upload_bytes))
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn with_static_stats(mut self, static_stats: StaticStats) -> Self {
        self.static_stats = static_stats;
        self
    }

    #[must_use]
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}
