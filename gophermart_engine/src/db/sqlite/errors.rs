use thiserror::Error;

use crate::db_types::{OrderId, OrderStatusType};

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Database connection error: {0}")]
    DriverError(#[from] sqlx::Error),
    #[error("Could not run database migrations: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {order_id} cannot be updated. Expected status {expected}, but it is {actual}")]
    UnexpectedOrderStatus { order_id: OrderId, expected: OrderStatusType, actual: OrderStatusType },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}
