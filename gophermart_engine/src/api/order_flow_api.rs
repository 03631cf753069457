//! Order submission and order history.
use std::fmt::Debug;

use log::*;

use crate::{
    api::errors::OrderFlowError,
    db::traits::{InsertOrderResult, OrderManagement},
    db_types::{NewOrder, Order, OrderId},
    helpers::validate_order_number,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOrderResult {
    /// The order is new and is now waiting for reconciliation.
    Accepted(Order),
    /// The same user submitted this order before. Nothing changed.
    AlreadyAccepted(Order),
}

/// `OrderFlowApi` is the entry point for orders submitted by users.
///
/// Accepted orders are stored with status `New`. From there on, the reconciliation worker takes over.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({:?})", self.db)
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Submits an order on behalf of `user_id`.
    ///
    /// The order number must be numeric and pass the Luhn check. Order numbers are unique across all users, so
    /// submitting an order that another user already submitted is an error. Submitting your own order again is not.
    pub async fn accept_order(&self, user_id: i64, order_id: OrderId) -> Result<AcceptOrderResult, OrderFlowError> {
        validate_order_number(&order_id)?;
        let order = NewOrder::new(order_id, user_id);
        let result = self.db.insert_order(order).await.map_err(|e| OrderFlowError::DatabaseError(e.to_string()))?;
        match result {
            InsertOrderResult::Inserted(order) => {
                info!("💻️ Order {} accepted for user {user_id}", order.order_id);
                Ok(AcceptOrderResult::Accepted(order))
            },
            InsertOrderResult::AlreadyExists(order) if order.user_id == user_id => {
                debug!("💻️ User {user_id} submitted order {} again", order.order_id);
                Ok(AcceptOrderResult::AlreadyAccepted(order))
            },
            InsertOrderResult::AlreadyExists(order) => {
                let owner = order.user_id;
                warn!("💻️ User {user_id} submitted order {}, which belongs to user {owner}", order.order_id);
                Err(OrderFlowError::OrderOwnedByAnotherUser(order.order_id))
            },
        }
    }

    /// All orders of the user, most recent first.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderFlowError> {
        self.db.fetch_orders_for_user(user_id).await.map_err(|e| OrderFlowError::DatabaseError(e.to_string()))
    }

    pub async fn order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError> {
        self.db.fetch_order_by_order_id(order_id).await.map_err(|e| OrderFlowError::DatabaseError(e.to_string()))
    }
}
