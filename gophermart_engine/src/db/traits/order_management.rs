use crate::{
    db::traits::InsertOrderResult,
    db_types::{Money, NewOrder, Order, OrderId, OrderStatusType},
};

/// The `OrderManagement` trait defines the behaviour for storing, querying and transitioning orders in the database
/// backend.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    type Error: std::error::Error;

    /// Stores a brand-new order with status `New`.
    ///
    /// Order numbers are globally unique. If the order number is already on record (for any user), nothing is
    /// written and the existing order is returned as [`InsertOrderResult::AlreadyExists`].
    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, Self::Error>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, Self::Error>;

    /// Fetches all orders submitted by the given user, most recent first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, Self::Error>;

    /// Fetches up to `limit` order numbers with the given status, oldest first.
    async fn fetch_order_ids_with_status(
        &self,
        status: OrderStatusType,
        limit: usize,
    ) -> Result<Vec<OrderId>, Self::Error>;

    /// Atomically moves an order from status `from` to status `to`.
    ///
    /// The update only happens if the order currently has status `from`. Returns `true` if the order was updated and
    /// `false` if it did not exist or had a different status. This is what makes claiming an order exclusive.
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<bool, Self::Error>;

    /// In a single atomic transaction,
    /// * moves the order from `Processing` to `Processed`,
    /// * records the accrual amount on the order,
    /// * appends a credit for `accrual` to the ledger of the user that owns the order (zero amounts are not
    ///   recorded).
    ///
    /// If the order is not in `Processing`, nothing is written and an error is returned.
    async fn add_accrual(&self, order_id: &OrderId, accrual: Money) -> Result<Order, Self::Error>;
}
