use crate::db_types::{Money, Order, Withdrawal};

#[derive(Debug, Clone)]
pub enum InsertOrderResult {
    Inserted(Order),
    /// The order number was already on record. The existing order is returned so that callers can tell who owns it.
    AlreadyExists(Order),
}

#[derive(Debug, Clone)]
pub enum InsertWithdrawalResult {
    Inserted(Withdrawal),
    /// The withdrawal was rejected because the balance at the time of the check was too low.
    InsufficientBalance(Money),
}
