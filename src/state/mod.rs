/// Paged list view state.
pub mod pagination;
/// Match scheduling rules.
pub mod schedule;

use std::sync::Arc;

use dashmap::DashSet;
use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::{collection_store::CollectionStore, models::EntityKind},
    error::ServiceError,
};

/// State handle shared by every handler.
pub type SharedState = Arc<AppState>;

/// Central application state: the backing store, list settings and in-flight deletes.
pub struct AppState {
    store: RwLock<Option<Arc<dyn CollectionStore>>>,
    config: AppConfig,
    degraded: watch::Sender<bool>,
    removals: DashSet<(EntityKind, String)>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            store: RwLock::new(None),
            config,
            degraded: degraded_tx,
            removals: DashSet::new(),
        })
    }

    /// State with `store` already installed and healthy.
    pub async fn with_store(config: AppConfig, store: Arc<dyn CollectionStore>) -> SharedState {
        let state = Self::new(config);
        state.install_store(store).await;
        state
    }

    /// List settings.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn CollectionStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Current store, or [`ServiceError::Degraded`] when none is installed yet.
    pub async fn require_store(&self) -> Result<Arc<dyn CollectionStore>, ServiceError> {
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn CollectionStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Claim the right to delete `kind`/`id`. The claim is released when the guard drops.
    pub fn begin_removal(&self, kind: EntityKind, id: &str) -> Result<RemovalGuard<'_>, ServiceError> {
        let key = (kind, id.to_string());
        if !self.removals.insert(key.clone()) {
            return Err(ServiceError::Conflict(format!(
                "{kind} `{id}` is already being removed"
            )));
        }
        Ok(RemovalGuard {
            removals: &self.removals,
            key,
        })
    }

    /// Whether a delete of `kind`/`id` is currently in flight.
    pub fn is_removing(&self, kind: EntityKind, id: &str) -> bool {
        self.removals.contains(&(kind, id.to_string()))
    }
}

/// In-flight delete claim returned by [`AppState::begin_removal`].
pub struct RemovalGuard<'a> {
    removals: &'a DashSet<(EntityKind, String)>,
    key: (EntityKind, String),
}

impl Drop for RemovalGuard<'_> {
    fn drop(&mut self) {
        self.removals.remove(&self.key);
    }
}
