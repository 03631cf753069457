//! Client side of the external accrual service.
//!
//! The accrual service decides how many points an order earns. It is queried one order at a time with
//! `GET {base}/api/orders/{number}` and throttles callers with `429 Too Many Requests`, telling them the allowed number
//! of requests per minute in the response body. [`HttpAccrualClient`] shares a [`RateLimiter`] that adapts to that
//! signal.
mod client;
pub mod limiter;
mod objects;

pub use client::{AccrualClient, AccrualClientError, HttpAccrualClient};
pub use limiter::{Quota, RateLimiter};
pub use objects::{AccrualResponse, AccrualStatus};
