use chrono::{DateTime, Utc};
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{Money, OrderId, UserBalance, Withdrawal},
};

/// Appends an entry to the ledger. Credits are positive, debits are negative. Zero amounts are rejected.
pub async fn insert_transaction(
    user_id: i64,
    order_id: &OrderId,
    amount: Money,
    created_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    if amount.is_zero() {
        return Err(SqliteDatabaseError::InvalidAmount("Ledger entries cannot be zero".to_string()));
    }
    let id = sqlx::query_scalar(
        r#"
            INSERT INTO transactions (user_id, order_id, amount, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id;
        "#,
    )
    .bind(user_id)
    .bind(order_id)
    .bind(amount)
    .bind(created_at)
    .fetch_one(conn)
    .await?;
    trace!("🗃️ Ledger entry #{id}: {amount} for user {user_id} ({order_id})");
    Ok(id)
}

/// Sums the ledger for the user.
pub async fn fetch_user_balance(user_id: i64, conn: &mut SqliteConnection) -> Result<UserBalance, SqliteDatabaseError> {
    let balance = sqlx::query_as(
        r#"
            SELECT
                COALESCE(SUM(amount), 0) AS current,
                COALESCE(-SUM(CASE WHEN amount < 0 THEN amount ELSE 0 END), 0) AS withdrawn
            FROM transactions
            WHERE user_id = $1;
        "#,
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(balance)
}

/// All debits for the user, most recent first.
pub async fn fetch_withdrawals_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Withdrawal>, SqliteDatabaseError> {
    let withdrawals = sqlx::query_as(
        r#"
            SELECT order_id, -amount AS sum, created_at AS processed_at
            FROM transactions
            WHERE user_id = $1 AND amount < 0
            ORDER BY created_at DESC, id DESC;
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(withdrawals)
}
