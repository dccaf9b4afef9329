//! Session ledger is a small REST API for recording credit and debit
//! transactions.
//!
//! Clients are identified by an opaque `sessionId` cookie that the server
//! issues on the first transaction a client creates. Every read is scoped to
//! the caller's session, so two clients never see each other's data.
//!
//! This library provides the router, state and storage for the API. The
//! `server` binary wires them to configuration, logging and a TCP listener.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod admin;
mod app_state;
mod config;
mod db;
mod endpoints;
mod error;
mod logging;
mod routing;
mod session;
mod transaction;
mod validation;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppState, SQLiteAppState, create_app_state};
pub use config::{AppEnv, Config, ConfigError, MIN_ADMIN_TOKEN_LENGTH};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use session::{COOKIE_SESSION_ID, SessionId};
pub use transaction::{
    NewTransaction, SQLiteTransactionStore, Transaction, TransactionId, TransactionStore,
    TransactionType,
};
pub use validation::{Issue, IssueCode, ValidationErrors};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    tracing::info!("Shutting down server.");
    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
