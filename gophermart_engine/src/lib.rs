//! Gophermart Engine
//!
//! The Gophermart Engine is the core of a loyalty-points backend. Users submit purchase order numbers, an external
//! accrual service decides how many points each order earns, and users can check their balance and withdraw points.
//!
//! The library is divided into the following sections:
//! 1. Database management and control ([`mod@db`]). SQLite is the supported backend. You should never need to
//!    access the database directly. Instead, use the public API provided by the engine. The exception is the data
//!    types used in the database. These are defined in the [`db_types`] module and are public.
//! 2. The accrual service client ([`mod@accrual`]). A rate-limited HTTP client for the external accrual service that
//!    adapts to the throttling signals sent back by that service.
//! 3. The reconciliation pipeline ([`mod@reconciliation`]). A background worker that periodically claims pending
//!    orders, asks the accrual service about them and settles the result in the ledger.
//! 4. The engine public API ([`mod@api`]). Order submission, order history, balances and withdrawals. Backends need
//!    to implement the traits in [`mod@db`] in order to be used by these APIs.
mod db;

pub mod accrual;
pub mod api;
pub mod db_types;
pub mod helpers;
mod op;
pub mod reconciliation;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use db::traits::{
    BalanceManagement,
    InsertOrderResult,
    InsertWithdrawalResult,
    LedgerDatabase,
    OrderManagement,
};
pub use api::{
    balance_api::BalanceApi,
    errors::{OrderFlowError, WithdrawalError},
    order_flow_api::{AcceptOrderResult, OrderFlowApi},
};
