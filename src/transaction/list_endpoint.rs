//! Defines the endpoint for listing a session's transactions.
use axum::{Extension, Json, extract::State};
use serde::Serialize;

use crate::{
    Error,
    app_state::TransactionState,
    session::SessionId,
    transaction::{Transaction, TransactionStore},
};

/// The response body for the list transactions endpoint.
#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    /// The session's transactions.
    pub transactions: Vec<Transaction>,
}

/// A route handler for listing every transaction of the caller's session.
///
/// Must be placed behind [session_guard](crate::session::session_guard).
pub async fn list_transactions_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Json<TransactionsResponse>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let transactions = state.transaction_store.list(&session_id)?;

    Ok(Json(TransactionsResponse { transactions }))
}
