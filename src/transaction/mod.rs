//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the sign convention for credits and debits
//! - The `TransactionStore` trait and its SQLite implementation
//! - The route handlers for listing, getting, summarising and creating transactions

mod core;
mod create_endpoint;
mod get_endpoint;
mod list_endpoint;
mod store;
mod summary_endpoint;

pub use core::{NewTransaction, Transaction, TransactionId, TransactionType};
pub use create_endpoint::create_transaction_endpoint;
pub use get_endpoint::{TransactionResponse, get_transaction_endpoint};
pub use list_endpoint::{TransactionsResponse, list_transactions_endpoint};
pub use store::{SQLiteTransactionStore, TransactionStore, create_transaction_table};
#[cfg(test)]
pub(crate) use store::checked_total;
pub use summary_endpoint::{Summary, SummaryResponse, get_summary_endpoint};
