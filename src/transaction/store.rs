//! Defines the transaction store trait and its SQLite implementation.
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row, types::Type};
use uuid::Uuid;

use crate::{
    Error,
    session::SessionId,
    transaction::core::{NewTransaction, Transaction, TransactionId, TransactionType},
};

/// Handles the creation and retrieval of transactions.
///
/// Every read is scoped to a session: a transaction owned by another session
/// must never be returned, even if the caller knows its ID.
pub trait TransactionStore {
    /// Store a new transaction under a freshly generated ID.
    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction, Error>;

    /// Retrieve all of the transactions for `session_id`.
    ///
    /// Returns an empty vector if the session has no transactions.
    fn list(&self, session_id: &SessionId) -> Result<Vec<Transaction>, Error>;

    /// Retrieve the transaction with `id` if it belongs to `session_id`.
    fn get(&self, id: TransactionId, session_id: &SessionId)
    -> Result<Option<Transaction>, Error>;

    /// The sum of the amounts of the transactions for `session_id`, or zero
    /// if the session has no transactions.
    ///
    /// Returns an [Error::TotalOutOfRange] if the sum is not finite.
    fn sum_amount(&self, session_id: &SessionId) -> Result<f64, Error>;

    /// Delete every transaction, regardless of session.
    ///
    /// Returns the number of deleted transactions.
    fn delete_all(&self) -> Result<usize, Error>;
}

/// Stores transactions in a SQLite database.
///
/// The `transactions` table must exist, see [initialize](crate::db::initialize).
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Insert a new transaction with a random v4 UUID.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if there is a constraint violation or
    /// some other SQL error.
    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        let connection = self.lock()?;

        let transaction = connection
            .prepare(
                "INSERT INTO transactions (id, session_id, title, amount, type)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id, session_id, title, amount, type",
            )?
            .query_row(
                (
                    Uuid::new_v4().to_string(),
                    new_transaction.session_id.as_str(),
                    new_transaction.title,
                    new_transaction.amount,
                    new_transaction.kind.as_str(),
                ),
                map_transaction_row,
            )?;

        Ok(transaction)
    }

    fn list(&self, session_id: &SessionId) -> Result<Vec<Transaction>, Error> {
        let connection = self.lock()?;

        connection
            .prepare(
                "SELECT id, session_id, title, amount, type FROM transactions
                 WHERE session_id = :session_id
                 ORDER BY rowid",
            )?
            .query_map(&[(":session_id", session_id.as_str())], map_transaction_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
            .collect()
    }

    fn get(
        &self,
        id: TransactionId,
        session_id: &SessionId,
    ) -> Result<Option<Transaction>, Error> {
        let connection = self.lock()?;

        let result = connection
            .prepare(
                "SELECT id, session_id, title, amount, type FROM transactions
                 WHERE id = :id AND session_id = :session_id",
            )?
            .query_row(
                &[
                    (":id", id.to_string().as_str()),
                    (":session_id", session_id.as_str()),
                ],
                map_transaction_row,
            );

        match result {
            Ok(transaction) => Ok(Some(transaction)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn sum_amount(&self, session_id: &SessionId) -> Result<f64, Error> {
        let connection = self.lock()?;

        let total = connection.query_row(
            "SELECT COALESCE(SUM(amount), 0.0) FROM transactions
             WHERE session_id = :session_id",
            &[(":session_id", session_id.as_str())],
            |row| row.get(0),
        )?;

        checked_total(session_id, total)
    }

    fn delete_all(&self) -> Result<usize, Error> {
        let connection = self.lock()?;

        connection
            .execute("DELETE FROM transactions", ())
            .map_err(|error| error.into())
    }
}

/// Pass `total` through if it is finite.
///
/// JSON has no representation for infinity or NaN, so a non-finite total is an
/// error rather than a value that would be serialized as `null`.
pub(crate) fn checked_total(session_id: &SessionId, total: f64) -> Result<f64, Error> {
    if total.is_finite() {
        Ok(total)
    } else {
        Err(Error::TotalOutOfRange(session_id.to_string()))
    }
}

/// Create the transactions table in the database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                type TEXT CHECK (type IN ('credit', 'debit'))
                )",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// Expects the columns `id, session_id, title, amount, type` in that order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, error.into()))?;
    let session_id: String = row.get(1)?;
    let title = row.get(2)?;
    let amount = row.get(3)?;
    let kind: Option<String> = row.get(4)?;
    let kind = match kind {
        Some(kind) => kind.parse::<TransactionType>().map_err(|error: String| {
            rusqlite::Error::FromSqlConversionFailure(4, Type::Text, error.into())
        })?,
        None => TransactionType::from_signed_amount(amount),
    };

    Ok(Transaction {
        id,
        session_id: SessionId::new(session_id),
        title,
        amount,
        kind,
    })
}
