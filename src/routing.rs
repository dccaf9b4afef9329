//! Application router configuration with session-protected and unprotected route definitions.

use axum::{
    Json, Router, middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    admin::reset_transactions_endpoint,
    app_state::AdminState,
    endpoints,
    session::session_guard,
    transaction::{
        TransactionStore, create_transaction_endpoint, get_summary_endpoint,
        get_transaction_endpoint, list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// The maintenance routes are only added when `state` has an admin token.
pub fn build_router<T>(state: AppState<T>) -> Router
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_health))
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction_endpoint::<T>),
        );

    let protected_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint::<T>),
        )
        .route(
            endpoints::TRANSACTIONS_SUMMARY,
            get(get_summary_endpoint::<T>),
        )
        .route(endpoints::TRANSACTION, get(get_transaction_endpoint::<T>))
        .route_layer(middleware::from_fn(session_guard));

    let router = protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state.clone());

    match state.admin_token {
        Some(admin_token) => router.merge(
            Router::new()
                .route(
                    endpoints::ADMIN_TRANSACTIONS,
                    delete(reset_transactions_endpoint::<T>),
                )
                .with_state(AdminState {
                    transaction_store: state.transaction_store,
                    admin_token,
                }),
        ),
        None => router,
    }
}

/// The root path '/' is a health check.
async fn get_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
