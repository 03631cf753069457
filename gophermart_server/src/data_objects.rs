use chrono::{DateTime, Utc};
use gophermart_engine::db_types::{Money, Order, OrderStatusType, UserBalance, Withdrawal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub number: String,
    pub status: OrderStatusType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Money>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self { number: order.order_id.0, status: order.status, accrual: order.accrual, uploaded_at: order.uploaded_at }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub current: Money,
    pub withdrawn: Money,
}

impl From<UserBalance> for BalanceResponse {
    fn from(balance: UserBalance) -> Self {
        Self { current: balance.current, withdrawn: balance.withdrawn }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalRequest {
    pub order: String,
    pub sum: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalResponse {
    pub order: String,
    pub sum: Money,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalResponse {
    fn from(w: Withdrawal) -> Self {
        Self { order: w.order_id.0, sum: w.sum, processed_at: w.processed_at }
    }
}
