//! Defines the endpoint for summarising a session's transactions.
use axum::{Extension, Json, extract::State};
use serde::Serialize;

use crate::{
    Error, app_state::TransactionState, session::SessionId, transaction::TransactionStore,
};

/// The aggregate values for a session's transactions.
#[derive(Debug, PartialEq, Serialize)]
pub struct Summary {
    /// The sum of the signed amounts, i.e. credits minus debits.
    pub amount: f64,
}

/// The response body for the summary endpoint.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    /// The summary of the session's transactions.
    pub summary: Summary,
}

/// A route handler for the sum of the amounts of the caller's transactions.
///
/// A session without transactions has an amount of zero.
///
/// Must be placed behind [session_guard](crate::session::session_guard).
pub async fn get_summary_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Json<SummaryResponse>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let amount = state.transaction_store.sum_amount(&session_id)?;

    Ok(Json(SummaryResponse {
        summary: Summary { amount },
    }))
}
