//! Maintenance routes that act on every session at once.
//!
//! These routes are only registered when an admin token is configured, and
//! every request must present that token as a bearer token.

use axum::{Json, extract::State};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde::Serialize;

use crate::{Error, app_state::AdminState, transaction::TransactionStore};

/// The response body for the reset endpoint.
#[derive(Debug, PartialEq, Serialize)]
pub struct ResetResponse {
    /// The number of transactions that were deleted.
    pub deleted: usize,
}

/// A route handler that deletes every transaction of every session.
///
/// # Errors
/// Returns an [Error::InvalidAdminToken] if the request does not carry the
/// configured admin token in its `Authorization` header.
pub async fn reset_transactions_endpoint<T>(
    State(state): State<AdminState<T>>,
    authorization: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<ResetResponse>, Error>
where
    T: TransactionStore + Clone + Send + Sync,
{
    let Some(TypedHeader(Authorization(bearer))) = authorization else {
        tracing::warn!("Rejected reset request without an admin token.");
        return Err(Error::InvalidAdminToken);
    };

    if !tokens_match(bearer.token(), &state.admin_token) {
        tracing::warn!("Rejected reset request with an invalid admin token.");
        return Err(Error::InvalidAdminToken);
    }

    let deleted = state.transaction_store.delete_all()?;
    tracing::info!("Deleted {deleted} transactions.");

    Ok(Json(ResetResponse { deleted }))
}

/// Compare tokens without returning early on the first differing byte.
fn tokens_match(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0, |difference, (a, b)| difference | (a ^ b))
            == 0
}

#[cfg(test)]
mod reset_transactions_endpoint_tests {
    use axum::{Router, routing::delete};
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        admin::{reset_transactions_endpoint, tokens_match},
        app_state::AdminState,
        session::SessionId,
        test_utils::MemoryTransactionStore,
        transaction::{Transaction, TransactionStore, TransactionType},
    };

    const TEST_TOKEN: &str = "a-very-secret-admin-token";

    fn get_test_server(store: MemoryTransactionStore) -> TestServer {
        let state = AdminState {
            transaction_store: store,
            admin_token: TEST_TOKEN.to_owned(),
        };
        let app = Router::new()
            .route(
                "/admin/transactions",
                delete(reset_transactions_endpoint::<MemoryTransactionStore>),
            )
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    fn store_with_transactions() -> MemoryTransactionStore {
        let store = MemoryTransactionStore::new();
        for session in ["a", "b"] {
            store
                .create(Transaction::build(
                    SessionId::new(session),
                    "x",
                    1.0,
                    TransactionType::Credit,
                ))
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn reset_with_token_deletes_everything() {
        let store = store_with_transactions();
        let server = get_test_server(store.clone());

        let response = server
            .delete("/admin/transactions")
            .authorization_bearer(TEST_TOKEN)
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "deleted": 2 }));
        assert!(store.list(&SessionId::new("a")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_without_token_is_unauthorized() {
        let store = store_with_transactions();
        let server = get_test_server(store.clone());

        let response = server.delete("/admin/transactions").await;

        response.assert_status_unauthorized();
        assert_eq!(store.list(&SessionId::new("a")).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reset_with_wrong_token_is_unauthorized() {
        let store = store_with_transactions();
        let server = get_test_server(store.clone());

        let response = server
            .delete("/admin/transactions")
            .authorization_bearer("not-the-token")
            .await;

        response.assert_status_unauthorized();
        assert_eq!(store.list(&SessionId::new("b")).unwrap().len(), 1);
    }

    #[test]
    fn tokens_match_requires_equal_length_and_bytes() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abc", "abd"));
        assert!(!tokens_match("abc", "abcd"));
        assert!(!tokens_match("", "abc"));
    }
}
