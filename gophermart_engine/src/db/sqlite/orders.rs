use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db::{sqlite::SqliteDatabaseError, traits::InsertOrderResult},
    db_types::{Money, NewOrder, Order, OrderId, OrderStatusType},
};

/// Inserts the order if its order number is not on record yet. Otherwise the existing order is returned.
///
/// The insert is the first statement, so when this is called inside a transaction, that transaction holds the write
/// lock from the start.
pub async fn idempotent_insert(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<InsertOrderResult, SqliteDatabaseError> {
    let inserted = sqlx::query_as::<_, Order>(
        r#"
            INSERT INTO orders (order_id, user_id, status, uploaded_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_id) DO NOTHING
            RETURNING order_id, user_id, status, accrual, uploaded_at;
        "#,
    )
    .bind(&order.order_id)
    .bind(order.user_id)
    .bind(OrderStatusType::New)
    .bind(order.uploaded_at)
    .fetch_optional(&mut *conn)
    .await?;
    match inserted {
        Some(order) => {
            trace!("🗃️ Order {} inserted for user {}", order.order_id, order.user_id);
            Ok(InsertOrderResult::Inserted(order))
        },
        None => {
            let existing = fetch_order_by_order_id(&order.order_id, conn)
                .await?
                .ok_or_else(|| SqliteDatabaseError::OrderNotFound(order.order_id.clone()))?;
            trace!("🗃️ Order {} already exists (user {})", existing.order_id, existing.user_id);
            Ok(InsertOrderResult::AlreadyExists(existing))
        },
    }
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as(
        "SELECT order_id, user_id, status, accrual, uploaded_at FROM orders WHERE order_id = $1",
    )
    .bind(order_id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Fetches all orders for the user. The most recently uploaded order comes first.
pub async fn fetch_orders_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let orders = sqlx::query_as(
        r#"
            SELECT order_id, user_id, status, accrual, uploaded_at FROM orders
            WHERE user_id = $1
            ORDER BY uploaded_at DESC, rowid DESC;
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Fetches the order numbers of up to `limit` orders in the given status, oldest first.
pub async fn fetch_order_ids_with_status(
    status: OrderStatusType,
    limit: usize,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderId>, SqliteDatabaseError> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let ids = sqlx::query_scalar(
        r#"
            SELECT order_id FROM orders
            WHERE status = $1
            ORDER BY uploaded_at ASC, rowid ASC
            LIMIT $2;
        "#,
    )
    .bind(status)
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(ids)
}

/// Compare-and-set on the order status. Returns `true` if exactly this call moved the order from `from` to `to`.
pub async fn update_order_status(
    order_id: &OrderId,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let result = sqlx::query("UPDATE orders SET status = $1 WHERE order_id = $2 AND status = $3")
        .bind(to)
        .bind(order_id)
        .bind(from)
        .execute(conn)
        .await?;
    let updated = result.rows_affected() == 1;
    debug!("🗃️ Status update for {order_id} [{from} -> {to}]: {}", if updated { "applied" } else { "skipped" });
    Ok(updated)
}

/// Marks a `Processing` order as `Processed` and records the accrual against it. If the order is in any other status,
/// `None` is returned and nothing is written.
pub async fn mark_processed(
    order_id: &OrderId,
    accrual: Money,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as(
        r#"
            UPDATE orders SET status = $1, accrual = $2
            WHERE order_id = $3 AND status = $4
            RETURNING order_id, user_id, status, accrual, uploaded_at;
        "#,
    )
    .bind(OrderStatusType::Processed)
    .bind(accrual)
    .bind(order_id)
    .bind(OrderStatusType::Processing)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
