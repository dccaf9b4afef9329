//! Defines the core data models for transactions.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::SessionId;

/// Alias for the type used for transaction IDs.
pub type TransactionId = Uuid;

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in. Stored with a non-negative amount.
    Credit,
    /// Money going out. Stored with a non-positive amount.
    Debit,
}

impl TransactionType {
    /// The names accepted when parsing a transaction type.
    pub const NAMES: [&'static str; 2] = ["credit", "debit"];

    /// The transaction type as it is written to the database and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
        }
    }

    /// Guess the type of a signed `amount`.
    ///
    /// Only used for rows written before the type was stored. Zero is
    /// treated as a credit.
    pub fn from_signed_amount(amount: f64) -> Self {
        if amount < 0.0 {
            TransactionType::Debit
        } else {
            TransactionType::Credit
        }
    }

    /// Apply the sign convention for this type to an unsigned `amount`.
    ///
    /// Credits keep the amount as given and debits negate it.
    pub fn normalize_amount(&self, amount: f64) -> f64 {
        // Either sign of zero is stored as 0.0, -0.0 would be serialized as "-0.0".
        if amount == 0.0 {
            return 0.0;
        }

        match self {
            TransactionType::Credit => amount,
            TransactionType::Debit => -amount,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(TransactionType::Credit),
            "debit" => Ok(TransactionType::Debit),
            other => Err(format!("invalid transaction type \"{other}\"")),
        }
    }
}

/// A credit or debit entry in a session's ledger.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The session that created the transaction.
    pub session_id: SessionId,
    /// A free text label for the transaction.
    pub title: String,
    /// The signed amount: positive for credits, negative for debits.
    pub amount: f64,
    /// Whether the transaction is a credit or a debit.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

impl Transaction {
    /// Create a new transaction for `session_id`.
    ///
    /// `amount` is the unsigned amount as entered by the client; its sign
    /// is set from `kind` when the builder is created.
    pub fn build(
        session_id: SessionId,
        title: &str,
        amount: f64,
        kind: TransactionType,
    ) -> NewTransaction {
        NewTransaction {
            session_id,
            title: title.to_owned(),
            amount: kind.normalize_amount(amount),
            kind,
        }
    }
}

/// A transaction that has not been stored yet.
///
/// The ID is assigned by the store on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The session that owns the transaction.
    pub session_id: SessionId,
    /// A free text label for the transaction.
    pub title: String,
    /// The sign-normalized amount.
    pub amount: f64,
    /// Whether the transaction is a credit or a debit.
    pub kind: TransactionType,
}
