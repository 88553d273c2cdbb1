//! Ledger summary endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::ledger::LedgerSummary, AppState};

/// Administrator identity, book id counter and table sizes
#[utoipa::path(
    get,
    path = "/ledger",
    tag = "ledger",
    responses(
        (status = 200, description = "Ledger summary", body = LedgerSummary)
    )
)]
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<LedgerSummary>> {
    Ok(Json(state.services.summary()?))
}
