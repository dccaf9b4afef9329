use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use uuid::Uuid;

use crate::{
    Error,
    session::SessionId,
    transaction::{
        NewTransaction, Transaction, TransactionId, TransactionStore, checked_total,
    },
};

/// A [TransactionStore] that keeps transactions in a vector and counts how
/// many times it was called.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryTransactionStore {
    transactions: Arc<Mutex<Vec<Transaction>>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of store operations performed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl TransactionStore for MemoryTransactionStore {
    fn create(&self, new_transaction: NewTransaction) -> Result<Transaction, Error> {
        self.record_call();

        let transaction = Transaction {
            id: Uuid::new_v4(),
            session_id: new_transaction.session_id,
            title: new_transaction.title,
            amount: new_transaction.amount,
            kind: new_transaction.kind,
        };
        self.transactions
            .lock()
            .unwrap()
            .push(transaction.clone());

        Ok(transaction)
    }

    fn list(&self, session_id: &SessionId) -> Result<Vec<Transaction>, Error> {
        self.record_call();

        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|transaction| &transaction.session_id == session_id)
            .cloned()
            .collect())
    }

    fn get(
        &self,
        id: TransactionId,
        session_id: &SessionId,
    ) -> Result<Option<Transaction>, Error> {
        self.record_call();

        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .find(|transaction| transaction.id == id && &transaction.session_id == session_id)
            .cloned())
    }

    fn sum_amount(&self, session_id: &SessionId) -> Result<f64, Error> {
        let total = self
            .list(session_id)?
            .iter()
            .map(|transaction| transaction.amount)
            .sum();

        checked_total(session_id, total)
    }

    fn delete_all(&self) -> Result<usize, Error> {
        self.record_call();

        let mut transactions = self.transactions.lock().unwrap();
        let count = transactions.len();
        transactions.clear();

        Ok(count)
    }
}
