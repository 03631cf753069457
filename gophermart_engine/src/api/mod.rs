//! The engine's public API.
//!
//! * [`order_flow_api::OrderFlowApi`] accepts order numbers from users and lists their orders.
//! * [`balance_api::BalanceApi`] reports balances and handles withdrawals.
pub mod balance_api;
pub mod errors;
pub mod order_flow_api;
