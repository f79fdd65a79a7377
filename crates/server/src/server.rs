use axum::{
    Router,
    routing::get,
};

use std::sync::Arc;

use crate::{fx, rendiconto};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };
    Router::new()
        .route("/rendiconto", get(rendiconto::summary))
        .route("/rendiconto/totals", get(rendiconto::totals))
        .route("/rendiconto/categories", get(rendiconto::by_category))
        .route(
            "/rendiconto/categories/{slug}",
            get(rendiconto::category_detail),
        )
        .route("/rendiconto/participants", get(rendiconto::participants))
        .route(
            "/rendiconto/participants/{slug}",
            get(rendiconto::participant_ledger),
        )
        .route("/rendiconto/missing-rates", get(rendiconto::missing_rates))
        .route("/fx/codes", get(fx::known_codes))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
