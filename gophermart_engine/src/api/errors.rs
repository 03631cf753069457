use thiserror::Error;

use crate::{
    db_types::{Money, OrderId},
    helpers::OrderNumberError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid order number: {0}")]
    InvalidOrderNumber(#[from] OrderNumberError),
    #[error("Order {0} was submitted by another user")]
    OrderOwnedByAnotherUser(OrderId),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// The four ways a withdrawal can fail. They are kept apart because clients are told about them differently.
#[derive(Debug, Clone, Error)]
pub enum WithdrawalError {
    #[error("The withdrawal amount must be positive, but was {0}")]
    InvalidSum(Money),
    #[error("Invalid order number: {0}")]
    InvalidOrder(#[from] OrderNumberError),
    #[error("Not enough points. Requested {requested}, but only {available} are available")]
    NotEnoughBalance { requested: Money, available: Money },
    #[error("Internal error: {0}")]
    InternalError(String),
}
