use std::sync::atomic::{AtomicBool, Ordering};

use gophermart_engine::{
    db_types::{Money, NewOrder, Order, OrderId, OrderStatusType},
    InsertOrderResult,
    OrderManagement,
    SqliteDatabase,
    SqliteDatabaseError,
};
use mockall::mock;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Storage failure: {0}")]
pub struct StorageFailure(pub String);

mock! {
    pub OrderManagement {}
    impl OrderManagement for OrderManagement {
        type Error = StorageFailure;
        async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, StorageFailure>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, StorageFailure>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, StorageFailure>;
        async fn fetch_order_ids_with_status(
            &self,
            status: OrderStatusType,
            limit: usize,
        ) -> Result<Vec<OrderId>, StorageFailure>;
        async fn update_order_status(
            &self,
            order_id: &OrderId,
            from: OrderStatusType,
            to: OrderStatusType,
        ) -> Result<bool, StorageFailure>;
        async fn add_accrual(&self, order_id: &OrderId, accrual: Money) -> Result<Order, StorageFailure>;
    }
}

/// Which operations panic on their first call.
#[derive(Default)]
pub struct PanicPlan {
    pub select: bool,
    pub claim: bool,
    pub revert: bool,
}

/// A SQLite database that panics once in each planned operation. Claims panic after the status has been written.
pub struct PanickyDb {
    inner: SqliteDatabase,
    select: AtomicBool,
    claim: AtomicBool,
    revert: AtomicBool,
}

impl PanickyDb {
    pub fn new(inner: SqliteDatabase, plan: PanicPlan) -> Self {
        Self {
            inner,
            select: AtomicBool::new(plan.select),
            claim: AtomicBool::new(plan.claim),
            revert: AtomicBool::new(plan.revert),
        }
    }
}

impl OrderManagement for PanickyDb {
    type Error = SqliteDatabaseError;

    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, Self::Error> {
        self.inner.insert_order(order).await
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, Self::Error> {
        self.inner.fetch_order_by_order_id(order_id).await
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, Self::Error> {
        self.inner.fetch_orders_for_user(user_id).await
    }

    async fn fetch_order_ids_with_status(
        &self,
        status: OrderStatusType,
        limit: usize,
    ) -> Result<Vec<OrderId>, Self::Error> {
        if self.select.swap(false, Ordering::SeqCst) {
            panic!("selecting orders failed");
        }
        self.inner.fetch_order_ids_with_status(status, limit).await
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<bool, Self::Error> {
        let reverting = from == OrderStatusType::Processing && to == OrderStatusType::New;
        if reverting && self.revert.swap(false, Ordering::SeqCst) {
            panic!("reverting {order_id} failed");
        }
        let updated = self.inner.update_order_status(order_id, from, to).await;
        if to == OrderStatusType::Processing && self.claim.swap(false, Ordering::SeqCst) {
            panic!("claiming {order_id} failed");
        }
        updated
    }

    async fn add_accrual(&self, order_id: &OrderId, accrual: Money) -> Result<Order, Self::Error> {
        self.inner.add_accrual(order_id, accrual).await
    }
}
