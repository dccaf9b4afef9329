//! Database schema setup and migrations.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, transaction::create_transaction_table};

/// Create the application's tables and apply any pending migrations.
///
/// Safe to call on every start up: existing tables and data are kept.
///
/// # Errors
/// Returns an [Error::SqlError] if the schema could not be created or migrated.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;
    add_session_id_to_transactions(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Add the `session_id` and `type` columns to a `transactions` table created
/// before transactions were scoped to sessions, and index `session_id`.
///
/// Rows that existed before the migration keep a `NULL` session and are not
/// visible to any session.
fn add_session_id_to_transactions(connection: &Connection) -> Result<(), rusqlite::Error> {
    if !has_column(connection, "transactions", "session_id")? {
        tracing::info!("Adding column session_id to table transactions.");
        connection.execute("ALTER TABLE transactions ADD COLUMN session_id TEXT", ())?;
    }

    if !has_column(connection, "transactions", "type")? {
        tracing::info!("Adding column type to table transactions.");
        connection.execute(
            "ALTER TABLE transactions ADD COLUMN type TEXT CHECK (type IN ('credit', 'debit'))",
            (),
        )?;
    }

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_session_id ON transactions(session_id)",
        (),
    )?;

    Ok(())
}

fn has_column(connection: &Connection, table: &str, column: &str) -> Result<bool, rusqlite::Error> {
    connection
        .prepare("SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2")?
        .query_row((table, column), |row| row.get::<_, i64>(0))
        .map(|count| count > 0)
}
