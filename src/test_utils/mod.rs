#![allow(missing_docs)]

pub(crate) mod store;

pub(crate) use store::MemoryTransactionStore;
