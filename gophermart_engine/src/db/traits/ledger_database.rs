use crate::db::traits::{BalanceManagement, OrderManagement};

/// This trait defines the highest level of behaviour for backends supporting the Gophermart engine.
///
/// A ledger database can be cloned cheaply (clones share the same connection pool) and handed to each of the APIs
/// and to the reconciliation worker.
pub trait LedgerDatabase: Clone + OrderManagement + BalanceManagement {}
