//! #  Database management and control.
//!
//! This module provides the interfaces that define the interface contracts of the engine's database *backends*.
//!
//! ## Orders
//! Orders are submitted by users and then reconciled against the external accrual service. The backend owns every
//! consistency guarantee the reconciliation protocol relies on: the conditional status transition that claims an
//! order, and the atomic "mark processed and credit the user" write.
//!
//! ## Ledger
//! Balances are never stored. They are derived from an append-only list of transactions: credits from processed
//! orders and debits from withdrawals.
//!
//! ## Traits
//! * [`LedgerDatabase`] defines the highest level of behaviour for backends supporting the Gophermart engine.
//! * [`OrderManagement`] defines the behaviour for storing, querying and transitioning orders.
//! * [`BalanceManagement`] defines the behaviour for balances and withdrawals.
mod balance_management;
mod data_objects;
mod ledger_database;
mod order_management;

pub use balance_management::BalanceManagement;
pub use data_objects::{InsertOrderResult, InsertWithdrawalResult};
pub use ledger_database::LedgerDatabase;
pub use order_management::OrderManagement;
