//! # Gophermart server
//! This crate hosts the HTTP front end of the Gophermart loyalty backend. It is responsible for:
//! * Accepting order numbers from users and listing their orders.
//! * Reporting balances and handling withdrawals.
//! * Running the accrual worker, which reconciles submitted orders against the external accrual service.
//!
//! ## Configuration
//! The server is configured via command line flags and environment variables. See [config](config/index.html) for
//! more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/user/orders`: `POST` submits an order, `GET` lists the user's orders.
//! * `/api/user/balance`: The user's current balance and total withdrawn.
//! * `/api/user/balance/withdraw`: Withdraws points against an order number.
//! * `/api/user/withdrawals`: The user's withdrawals.
pub mod accrual_worker;
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
