use crate::{
    db::traits::InsertWithdrawalResult,
    db_types::{NewWithdrawal, UserBalance, Withdrawal},
};

/// The `BalanceManagement` trait defines behaviour for querying balances and recording withdrawals.
///
/// Balances are aggregates over the transaction ledger and are recalculated on every call.
#[allow(async_fn_in_trait)]
pub trait BalanceManagement {
    type Error: std::error::Error;

    /// Returns the current balance and the total amount withdrawn for the given user. Users without any transactions
    /// have a zero balance.
    async fn fetch_user_balance(&self, user_id: i64) -> Result<UserBalance, Self::Error>;

    /// In a single atomic transaction,
    /// * recalculates the current balance of the user,
    /// * if the balance covers `withdrawal.sum`, appends a debit for the sum, tagged with the withdrawal's order
    ///   number.
    ///
    /// Concurrent withdrawals for the same user are serialised, so that two withdrawals can never both pass the balance
    /// check if together they would overdraw the account.
    async fn withdraw(&self, user_id: i64, withdrawal: NewWithdrawal) -> Result<InsertWithdrawalResult, Self::Error>;

    /// Fetches all withdrawals made by the given user, most recent first.
    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, Self::Error>;
}
