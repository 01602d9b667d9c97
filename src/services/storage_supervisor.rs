use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{collection_store::CollectionStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Attach the store produced by `connect`, retrying with exponential backoff, then
/// poll its health and toggle degraded mode as it comes and goes.
///
/// The store is kept installed while unhealthy: every request still makes its single
/// attempt and reports its own failure.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn CollectionStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    let store = loop {
        match connect().await {
            Ok(store) => break store,
            Err(err) => {
                warn!(error = %err, retry_in = ?delay, "store connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    };

    state.install_store(store.clone()).await;
    info!(backend = store.backend_name(), "store attached; leaving degraded mode");
    watch_health(&state, store.as_ref()).await;
}

async fn watch_health(state: &SharedState, store: &dyn CollectionStore) {
    let mut delay = INITIAL_DELAY;

    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("store healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
                delay = INITIAL_DELAY;
                sleep(HEALTH_POLL_INTERVAL).await;
            }
            Err(err) => {
                if !state.is_degraded() {
                    warn!(error = %err, "store health check failed; entering degraded mode");
                    state.update_degraded(true);
                } else {
                    warn!(error = %err, retry_in = ?delay, "store still unavailable");
                }
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}
