//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    db::initialize,
    transaction::{SQLiteTransactionStore, TransactionStore},
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    /// The store for managing session [transactions](crate::transaction::Transaction).
    pub transaction_store: T,
    /// The bearer token that grants access to maintenance routes.
    ///
    /// Maintenance routes are disabled when this is `None`.
    pub admin_token: Option<String>,
}

impl<T> AppState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    /// Create a new [AppState].
    pub fn new(transaction_store: T, admin_token: Option<String>) -> Self {
        Self {
            transaction_store,
            admin_token,
        }
    }
}

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SQLiteAppState = AppState<SQLiteTransactionStore>;

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// This function will modify the database by creating or migrating the
/// transactions table.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_app_state(
    db_connection: Connection,
    admin_token: Option<String>,
) -> Result<SQLiteAppState, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok(AppState::new(
        SQLiteTransactionStore::new(connection),
        admin_token,
    ))
}

/// The state needed to get or create a transaction.
#[derive(Debug, Clone)]
pub struct TransactionState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    /// The store for managing session [transactions](crate::transaction::Transaction).
    pub transaction_store: T,
}

impl<T> FromRef<AppState<T>> for TransactionState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<T>) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// The state needed for the maintenance routes.
#[derive(Debug, Clone)]
pub struct AdminState<T>
where
    T: TransactionStore + Clone + Send + Sync,
{
    /// The store for managing session [transactions](crate::transaction::Transaction).
    pub transaction_store: T,
    /// The bearer token callers must present.
    pub admin_token: String,
}
