//! Rendiconto API endpoints
//!
//! Thin glue: query parameters become a [`LedgerFilter`], engine reports
//! serialize straight to JSON. Currency conversion problems never surface as
//! errors here; they arrive as `missing_currencies` inside the payloads.

use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::Query;
use chrono::NaiveDate;

use api_types::rendiconto::LedgerQuery;
use engine::{
    CategoryBreakdown, CategoryExpenses, LedgerFilter, MissingRateRow, ParticipantLedger,
    ParticipantsReport, Summary, Totals,
};

use crate::{ServerError, server::ServerState};

fn parse_iso_date(value: &str, label: &str) -> Result<String, ServerError> {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(_) => Ok(value.to_string()),
        Err(_) => Err(ServerError::Generic(format!(
            "invalid '{label}' date: expected YYYY-MM-DD"
        ))),
    }
}

fn ledger_filter(query: LedgerQuery) -> Result<LedgerFilter, ServerError> {
    let from = query
        .from
        .as_deref()
        .map(|value| parse_iso_date(value, "from"))
        .transpose()?;
    let to = query
        .to
        .as_deref()
        .map(|value| parse_iso_date(value, "to"))
        .transpose()?;

    Ok(LedgerFilter {
        from,
        to,
        currency: query.cur,
        categories: query.cat,
    })
}

/// Dashboard payload: totals, category breakdown, participants, index.
pub async fn summary(State(state): State<ServerState>) -> Result<Json<Summary>, ServerError> {
    Ok(Json(state.engine.summary().await?))
}

pub async fn totals(
    State(state): State<ServerState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Totals>, ServerError> {
    let filter = ledger_filter(query)?;
    Ok(Json(state.engine.totals(&filter).await?))
}

pub async fn by_category(
    State(state): State<ServerState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<CategoryBreakdown>, ServerError> {
    let filter = ledger_filter(query)?;
    Ok(Json(state.engine.by_category(&filter).await?))
}

pub async fn participants(
    State(state): State<ServerState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<ParticipantsReport>, ServerError> {
    let filter = ledger_filter(query)?;
    Ok(Json(state.engine.participants(&filter).await?))
}

pub async fn missing_rates(
    State(state): State<ServerState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<MissingRateRow>>, ServerError> {
    let filter = ledger_filter(query)?;
    Ok(Json(state.engine.missing_rate_rows(&filter).await?))
}

/// Expenses of one category; unknown slugs are a 404.
pub async fn category_detail(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryExpenses>, ServerError> {
    let listing = state.engine.list_by_category_slug(&slug).await;
    if listing.label.is_none() {
        return Err(ServerError::NotFound(format!(
            "category '{slug}' not found"
        )));
    }
    Ok(Json(listing))
}

/// Itemized statement for one participant.
///
/// Every slug resolves to *some* canonical name, so an unknown participant
/// simply returns an empty ledger rather than a 404.
pub async fn participant_ledger(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> Json<ParticipantLedger> {
    Json(state.engine.ledger_by_participant_slug(&slug).await)
}
