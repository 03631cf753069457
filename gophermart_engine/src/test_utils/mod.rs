//! Helpers for tests that need a database or an accrual service.
pub mod prepare_env;
pub mod scripted_accrual;
