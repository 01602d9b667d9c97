//! chess-admin binary entrypoint: JSON gateway in front of the tournament backend.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chess_admin::{
    config::AppConfig,
    dao::{
        collection_store::{CollectionStore, memory::MemoryStore},
        storage::StorageError,
    },
    routes,
    services::storage_supervisor,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::new(AppConfig::load());
    spawn_store_supervisor(app_state.clone());

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Attach the upstream REST backend when configured, the in-memory store otherwise.
#[cfg(feature = "rest-store")]
fn spawn_store_supervisor(state: SharedState) {
    use chess_admin::dao::collection_store::rest::{RestConfig, RestStore};

    match RestConfig::from_env() {
        Ok(config) => {
            info!(base_url = %config.base_url, "using upstream REST backend");
            tokio::spawn(storage_supervisor::run(state, move || {
                let config = config.clone();
                async move {
                    let store = RestStore::connect(config).await?;
                    Ok::<_, StorageError>(Arc::new(store) as Arc<dyn CollectionStore>)
                }
            }));
        }
        Err(err) => {
            warn!(error = %err, "upstream backend not configured; serving from memory");
            spawn_memory_store(state);
        }
    }
}

#[cfg(not(feature = "rest-store"))]
fn spawn_store_supervisor(state: SharedState) {
    warn!("built without the REST store; serving from memory");
    spawn_memory_store(state);
}

fn spawn_memory_store(state: SharedState) {
    tokio::spawn(storage_supervisor::run(state, || async {
        Ok::<_, StorageError>(Arc::new(MemoryStore::new()) as Arc<dyn CollectionStore>)
    }));
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
