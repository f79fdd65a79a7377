use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{router, run, run_with_listener, spawn_with_listener};

mod fx;
mod rendiconto;
mod server;

pub mod types {
    pub mod rendiconto {
        pub use api_types::rendiconto::LedgerQuery;
        pub use engine::{
            CategoryBreakdown, CategoryExpenses, MissingRateRow, ParticipantLedger,
            ParticipantsReport, Summary, Totals,
        };
    }

    pub mod fx {
        pub use api_types::fx::KnownCodes;
    }
}

pub enum ServerError {
    Engine(EngineError),
    NotFound(String),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidFilter(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Schema(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Schema(schema_err) => {
            tracing::error!("schema error: {schema_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::NotFound(err) => (StatusCode::NOT_FOUND, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
