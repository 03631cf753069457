use std::fmt::Debug;

use chrono::Utc;
use log::*;
use sqlx::{migrate, SqlitePool};

use super::{new_pool, orders, transactions, SqliteDatabaseError};
use crate::{
    db::traits::{BalanceManagement, InsertOrderResult, InsertWithdrawalResult, LedgerDatabase, OrderManagement},
    db_types::{Money, NewOrder, NewWithdrawal, Order, OrderId, OrderStatusType, UserBalance, Withdrawal},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl LedgerDatabase for SqliteDatabase {}

impl OrderManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, Self::Error> {
        let mut tx = self.pool.begin().await?;
        let result = orders::idempotent_insert(order, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_order_id(order_id, &mut conn).await
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_user(user_id, &mut conn).await
    }

    async fn fetch_order_ids_with_status(
        &self,
        status: OrderStatusType,
        limit: usize,
    ) -> Result<Vec<OrderId>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_ids_with_status(status, limit, &mut conn).await
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<bool, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order_status(order_id, from, to, &mut conn).await
    }

    /// The status change comes first, so the transaction takes the write lock before anything is read. If the order
    /// is not `Processing`, the transaction is dropped (and rolled back) without writing anything.
    async fn add_accrual(&self, order_id: &OrderId, accrual: Money) -> Result<Order, Self::Error> {
        if accrual.is_negative() {
            return Err(SqliteDatabaseError::InvalidAmount(format!("Accrual for {order_id} is negative: {accrual}")));
        }
        let mut tx = self.pool.begin().await?;
        let order = match orders::mark_processed(order_id, accrual, &mut tx).await? {
            Some(order) => order,
            None => {
                let current = orders::fetch_order_by_order_id(order_id, &mut tx).await?;
                return Err(match current {
                    Some(o) => SqliteDatabaseError::UnexpectedOrderStatus {
                        order_id: order_id.clone(),
                        expected: OrderStatusType::Processing,
                        actual: o.status,
                    },
                    None => SqliteDatabaseError::OrderNotFound(order_id.clone()),
                });
            },
        };
        if accrual.is_positive() {
            transactions::insert_transaction(order.user_id, order_id, accrual, Utc::now(), &mut tx).await?;
        }
        tx.commit().await?;
        debug!("🗃️ Order {order_id} processed. {accrual} points credited to user {}", order.user_id);
        Ok(order)
    }
}

impl BalanceManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn fetch_user_balance(&self, user_id: i64) -> Result<UserBalance, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_user_balance(user_id, &mut conn).await
    }

    /// The debit is written first and the balance is checked afterwards, inside the same transaction. Writing first
    /// means concurrent withdrawals queue up on the database write lock, and each one sees the debits committed before
    /// it. If the balance ends up negative, the transaction is rolled back.
    async fn withdraw(&self, user_id: i64, withdrawal: NewWithdrawal) -> Result<InsertWithdrawalResult, Self::Error> {
        if !withdrawal.sum.is_positive() {
            return Err(SqliteDatabaseError::InvalidAmount(format!("Withdrawals must be positive: {}", withdrawal.sum)));
        }
        let processed_at = Utc::now();
        let mut tx = self.pool.begin().await?;
        transactions::insert_transaction(user_id, &withdrawal.order_id, -withdrawal.sum, processed_at, &mut tx).await?;
        let balance = transactions::fetch_user_balance(user_id, &mut tx).await?;
        if balance.current.is_negative() {
            tx.rollback().await?;
            let available = balance.current + withdrawal.sum;
            debug!("🗃️ User {user_id} cannot withdraw {}. Balance is {available}", withdrawal.sum);
            return Ok(InsertWithdrawalResult::InsufficientBalance(available));
        }
        tx.commit().await?;
        debug!("🗃️ User {user_id} withdrew {} for {}", withdrawal.sum, withdrawal.order_id);
        let NewWithdrawal { order_id, sum } = withdrawal;
        Ok(InsertWithdrawalResult::Inserted(Withdrawal { order_id, sum, processed_at }))
    }

    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_withdrawals_for_user(user_id, &mut conn).await
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { pool })
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Waits for checked-out connections to be returned and closes the pool. Clones share the pool, so they are
    /// closed too.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("🗃️ Database connection pool closed");
    }
}
