//! Defines the endpoint for getting a single transaction.
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Error,
    app_state::TransactionState,
    session::SessionId,
    transaction::{Transaction, TransactionId, TransactionStore},
    validation::{IssueCode, ValidationErrors},
};

/// The response body for the get transaction endpoint.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// The requested transaction.
    pub transaction: Transaction,
}

/// A route handler for getting one of the caller's transactions by its ID.
///
/// Must be placed behind [session_guard](crate::session::session_guard).
///
/// # Errors
/// Returns:
/// - [Error::Validation] if `transaction_id` is not a UUID. The store is not
///   queried in this case.
/// - [Error::TransactionNotFound] if there is no transaction with that ID, or
///   if it belongs to a different session.
pub async fn get_transaction_endpoint<T>(
    State(state): State<TransactionState<T>>,
    Extension(session_id): Extension<SessionId>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionResponse>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let transaction_id = parse_transaction_id(&transaction_id)?;

    state
        .transaction_store
        .get(transaction_id, &session_id)?
        .map(|transaction| Json(TransactionResponse { transaction }))
        .ok_or(Error::TransactionNotFound)
}

/// Parse a UUID in the hyphenated 8-4-4-4-12 form only.
///
/// [Uuid::parse_str] also accepts the simple, braced and URN forms, which are
/// not valid transaction IDs.
fn parse_transaction_id(raw_id: &str) -> Result<TransactionId, Error> {
    let invalid_id = || Error::Validation {
        message: "Invalid id",
        errors: ValidationErrors::for_field("id", "Invalid uuid", IssueCode::InvalidString),
    };

    if !is_hyphenated_uuid(raw_id) {
        return Err(invalid_id());
    }

    Uuid::parse_str(raw_id).map_err(|_| invalid_id())
}

fn is_hyphenated_uuid(text: &str) -> bool {
    text.len() == 36
        && text.bytes().enumerate().all(|(index, byte)| match index {
            8 | 13 | 18 | 23 => byte == b'-',
            _ => byte.is_ascii_hexdigit(),
        })
}
