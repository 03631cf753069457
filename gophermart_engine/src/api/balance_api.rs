//! Balances and withdrawals.
use std::fmt::Debug;

use log::*;

use crate::{
    api::errors::WithdrawalError,
    db::traits::{BalanceManagement, InsertWithdrawalResult},
    db_types::{Money, NewWithdrawal, OrderId, UserBalance, Withdrawal},
    helpers::validate_order_number,
};

pub struct BalanceApi<B> {
    db: B,
}

impl<B: Debug> Debug for BalanceApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BalanceApi ({:?})", self.db)
    }
}

impl<B> BalanceApi<B>
where B: BalanceManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn user_balance(&self, user_id: i64) -> Result<UserBalance, WithdrawalError> {
        self.db.fetch_user_balance(user_id).await.map_err(|e| WithdrawalError::InternalError(e.to_string()))
    }

    /// Withdraws `sum` points from the user's balance against the receipt number `order_id`.
    ///
    /// The sum is checked first, then the receipt number (which must be a valid order number, but does not have to
    /// belong to a submitted order). The balance check and the debit happen atomically.
    pub async fn withdraw(&self, user_id: i64, order_id: OrderId, sum: Money) -> Result<Withdrawal, WithdrawalError> {
        if !sum.is_positive() {
            return Err(WithdrawalError::InvalidSum(sum));
        }
        validate_order_number(&order_id)?;
        let withdrawal = NewWithdrawal::new(order_id, sum);
        match self.db.withdraw(user_id, withdrawal).await {
            Ok(InsertWithdrawalResult::Inserted(w)) => {
                info!("💻️ User {user_id} withdrew {} points for order {}", w.sum, w.order_id);
                Ok(w)
            },
            Ok(InsertWithdrawalResult::InsufficientBalance(available)) => {
                debug!("💻️ User {user_id} tried to withdraw {sum} points, but only has {available}");
                Err(WithdrawalError::NotEnoughBalance { requested: sum, available })
            },
            Err(e) => {
                error!("💻️ Withdrawal for user {user_id} failed: {e}");
                Err(WithdrawalError::InternalError(e.to_string()))
            },
        }
    }

    /// All withdrawals of the user, most recent first.
    pub async fn withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, WithdrawalError> {
        self.db.fetch_withdrawals_for_user(user_id).await.map_err(|e| WithdrawalError::InternalError(e.to_string()))
    }
}
