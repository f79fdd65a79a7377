//! Currency API endpoints

use axum::{Json, extract::State};

use api_types::fx::KnownCodes;

use crate::server::ServerState;

/// Codes with a known rate; used by clients to build filter controls.
pub async fn known_codes(State(state): State<ServerState>) -> Json<KnownCodes> {
    Json(KnownCodes {
        codes: state.engine.known_codes().await,
    })
}
